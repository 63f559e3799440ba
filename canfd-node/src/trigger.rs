// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{
    context::{IrqCtx, MainCtx},
    hw::ButtonPin,
};
use core::sync::atomic::{AtomicBool, Ordering};

/// A transmission was requested by the user button.
///
/// Only set from interrupt context and only cleared from main context.
/// The context markers enforce this.
/// Only plain loads and stores are used, so this also works on
/// targets without atomic read-modify-write instructions.
pub struct PendingTransmit(AtomicBool);

impl PendingTransmit {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Request a transmission.
    /// Requests that arrive before the main loop picks them up collapse into one.
    #[inline]
    pub fn raise(&self, _c: &IrqCtx) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_pending(&self, _m: &MainCtx) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    #[inline]
    pub fn clear(&self, _m: &MainCtx) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Default for PendingTransmit {
    fn default() -> Self {
        Self::new()
    }
}

/// Falling edge on the user button.
pub fn irq_handler_button(c: &IrqCtx, pin: &impl ButtonPin, pending: &PendingTransmit) {
    // This must come first. A pin interrupt that is not acknowledged fires again
    // right after we return.
    pin.clear_interrupt();
    pending.raise(c);
}

#[cfg(test)]
mod test {
    use super::*;
    use core::cell::Cell;

    struct Pin {
        irq: Cell<bool>,
        cleared: Cell<u32>,
    }

    impl ButtonPin for Pin {
        fn clear_interrupt(&self) {
            self.irq.set(false);
            self.cleared.set(self.cleared.get() + 1);
        }
    }

    #[test]
    fn test_button() {
        // SAFETY: Tests have no real contexts.
        let (m, c) = unsafe { (MainCtx::new(), IrqCtx::new()) };
        let pin = Pin {
            irq: Cell::new(true),
            cleared: Cell::new(0),
        };
        let pending = PendingTransmit::new();
        assert!(!pending.is_pending(&m));

        irq_handler_button(&c, &pin, &pending);
        assert!(!pin.irq.get());
        assert_eq!(pin.cleared.get(), 1);
        assert!(pending.is_pending(&m));

        pending.clear(&m);
        assert!(!pending.is_pending(&m));
    }

    /// Pin that records whether the flag was already raised when it got acknowledged.
    struct OrderPin<'a> {
        pending: &'a PendingTransmit,
        pending_at_clear: Cell<Option<bool>>,
    }

    impl ButtonPin for OrderPin<'_> {
        fn clear_interrupt(&self) {
            // SAFETY: Tests have no real contexts.
            let m = unsafe { MainCtx::new() };
            self.pending_at_clear.set(Some(self.pending.is_pending(&m)));
        }
    }

    #[test]
    fn test_button_clears_pin_first() {
        // SAFETY: Tests have no real contexts.
        let (m, c) = unsafe { (MainCtx::new(), IrqCtx::new()) };
        let pending = PendingTransmit::new();
        let pin = OrderPin {
            pending: &pending,
            pending_at_clear: Cell::new(None),
        };

        irq_handler_button(&c, &pin, &pending);
        assert_eq!(pin.pending_at_clear.get(), Some(false));
        assert!(pending.is_pending(&m));
    }

    #[test]
    fn test_button_burst() {
        // SAFETY: Tests have no real contexts.
        let (m, c) = unsafe { (MainCtx::new(), IrqCtx::new()) };
        let pin = Pin {
            irq: Cell::new(false),
            cleared: Cell::new(0),
        };
        let pending = PendingTransmit::default();
        for _ in 0..10 {
            pin.irq.set(true);
            irq_handler_button(&c, &pin, &pending);
        }
        assert_eq!(pin.cleared.get(), 10);
        assert!(pending.is_pending(&m));
        pending.clear(&m);
        assert!(!pending.is_pending(&m));
    }
}

// vim: ts=4 sw=4 expandtab
