// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interrupt emulation.
//!
//! Every interrupt source is served by its own thread.
//! Handlers must only be called through [isr].

use canfd_node::{IrqCtx, hw::ButtonPin};
use std::sync::atomic::{AtomicBool, Ordering};

/// Interrupt entry glue.
pub fn isr<R>(f: impl FnOnce(&IrqCtx) -> R) -> R {
    // SAFETY: We are the entry of an emulated interrupt handler.
    let c = unsafe { IrqCtx::new() };
    f(&c)
}

/// Emulated external interrupt line.
///
/// An edge latches the interrupt flag.
/// The handler runs again and again as long as the flag is set.
pub struct ExtIntPin {
    flag: AtomicBool,
}

impl ExtIntPin {
    pub const fn new() -> Self {
        Self {
            flag: AtomicBool::new(false),
        }
    }

    pub fn edge(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_flagged(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn service(&self, mut handler: impl FnMut(&IrqCtx, &Self)) {
        while self.is_flagged() {
            isr(|c| handler(c, self));
        }
    }
}

impl Default for ExtIntPin {
    fn default() -> Self {
        Self::new()
    }
}

impl ButtonPin for ExtIntPin {
    fn clear_interrupt(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_no_edge() {
        let pin = ExtIntPin::new();
        let mut calls = 0;
        pin.service(|_, _| calls += 1);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_refire_until_cleared() {
        let pin = ExtIntPin::new();
        pin.edge();
        let mut calls = 0;
        pin.service(|_, pin| {
            calls += 1;
            if calls == 3 {
                pin.clear_interrupt();
            }
        });
        assert_eq!(calls, 3);
        assert!(!pin.is_flagged());
    }

    #[test]
    fn test_edges_latch() {
        let pin = ExtIntPin::new();
        pin.edge();
        pin.edge();
        assert!(pin.is_flagged());
        let mut calls = 0;
        pin.service(|_, pin| {
            calls += 1;
            pin.clear_interrupt();
        });
        assert_eq!(calls, 1);
    }
}

// vim: ts=4 sw=4 expandtab
