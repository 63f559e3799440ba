// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{
    context::MainCtx,
    frame::{CanId, TxElement},
    hw::CanFdTx,
    report,
    trigger::PendingTransmit,
};
use core::fmt::Write;

/// Result of one main loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopEvent {
    /// Nothing to do.
    Idle,
    /// A frame was transmitted.
    Sent,
    /// The controller refused the transmission. Reported, not retried.
    SendFailed,
}

/// The main loop of the node.
pub struct Node<'a> {
    tx: &'a TxElement,
    pending: &'a PendingTransmit,
    buffer_index: u8,
}

impl<'a> Node<'a> {
    pub const fn new(tx: &'a TxElement, pending: &'a PendingTransmit, buffer_index: u8) -> Self {
        Self {
            tx,
            pending,
            buffer_index,
        }
    }

    /// Our message identifier.
    pub fn id(&self) -> CanId {
        self.tx.header().id
    }

    pub fn banner(&self, _m: &MainCtx, console: &mut impl Write) {
        report::banner(console, self.id());
    }

    /// Poll the transmit request once.
    pub fn run(&self, m: &MainCtx, chan: &mut impl CanFdTx, console: &mut impl Write) -> LoopEvent {
        if !self.pending.is_pending(m) {
            return LoopEvent::Idle;
        }

        let event = match chan.transmit(self.tx, self.buffer_index) {
            Ok(()) => {
                report::frame_sent(console, self.id());
                LoopEvent::Sent
            }
            Err(_) => {
                report::frame_send_error(console, self.id());
                LoopEvent::SendFailed
            }
        };

        // Only after the attempt completed.
        // Presses during the attempt are merged into it.
        self.pending.clear(m);

        event
    }

    /// Poll forever. `idle` is called whenever there was nothing to do,
    /// for example [core::hint::spin_loop] or a wait for interrupt.
    pub fn run_forever(
        &self,
        m: &MainCtx,
        chan: &mut impl CanFdTx,
        console: &mut impl Write,
        mut idle: impl FnMut(),
    ) -> ! {
        loop {
            if self.run(m, chan, console) == LoopEvent::Idle {
                idle();
            }
        }
    }
}


// vim: ts=4 sw=4 expandtab
