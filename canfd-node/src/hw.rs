// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hardware the node logic talks to.
//!
//! Implemented by the board support code. The transmit side and the
//! receive side of a CAN-FD channel are separate objects, so that the
//! TX buffer and the RX FIFO are never accessed through the same handle.

use crate::frame::TxElement;
use core::fmt::Debug;

/// Transmit half of a CAN-FD channel.
pub trait CanFdTx {
    type Error: Debug;

    /// Load `element` into the TX buffer `buffer_index` and request transmission.
    /// Returns when the controller accepted or refused the request.
    fn transmit(&mut self, element: &TxElement, buffer_index: u8) -> Result<(), Self::Error>;
}

/// Status indicator output (user LED).
pub trait StatusLed {
    fn toggle(&self);
}

/// Edge triggered input pin with interrupt (user button).
pub trait ButtonPin {
    /// Acknowledge the pending pin interrupt.
    fn clear_interrupt(&self);
}

// vim: ts=4 sw=4 expandtab
