// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event driven CAN-FD node.
//!
//! A button press requests the transmission of one frame.
//! The request is picked up by the main loop, which transmits
//! and reports the result.
//! Received data frames toggle the status LED and are reported
//! on the console.
//!
//! The board support code provides the hardware through the traits in [hw]
//! and calls the interrupt handlers [trigger::irq_handler_button] and
//! [rx::irq_handler_rx].

#![no_std]

pub mod config;
pub mod context;
pub mod fault;
pub mod frame;
pub mod hw;
pub mod node;
pub mod report;
pub mod rx;
pub mod trigger;

pub use crate::{
    context::{InitCtx, IrqCtx, MainCtx},
    frame::{CanId, DecodedFrame, IdKind, Rejected, RxElement, TxDescriptor, TxElement},
    node::{LoopEvent, Node},
    rx::RxOutcome,
    trigger::PendingTransmit,
};

// vim: ts=4 sw=4 expandtab
