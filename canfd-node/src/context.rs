// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Execution context markers.
//!
//! The node runs one foreground loop and a couple of interrupt handlers.
//! A reference to one of these markers proves which of them the holder
//! is running in. Functions that may only be called from one context
//! take the matching marker as an argument.

use core::marker::PhantomData;

macro_rules! define_context {
    ($name:ident) => {
        pub struct $name(PhantomData<*const ()>);

        impl $name {
            /// Create a new context.
            ///
            /// # SAFETY
            ///
            /// This may only be called from the corresponding context.
            /// `MainCtx` may only be constructed from the foreground loop
            /// and `IrqCtx` may only be constructed from interrupt entry glue.
            #[inline(always)]
            pub unsafe fn new() -> Self {
                fence();
                Self(PhantomData)
            }
        }

        impl Drop for $name {
            #[inline(always)]
            fn drop(&mut self) {
                fence();
            }
        }
    };
}

define_context!(MainCtx);
define_context!(IrqCtx);

/// Main context initialization marker.
///
/// This marker does not have a pub constructor.
/// It is only created by [MainCtx::new_with_init], before any interrupt
/// source is enabled.
pub struct InitCtx(PhantomData<*const ()>);

impl MainCtx {
    /// Run the initialization closure and then create the main context.
    ///
    /// # SAFETY
    ///
    /// The safety contract of [MainCtx::new] must be upheld.
    /// Interrupt sources must not be enabled before this returns.
    #[inline(always)]
    pub unsafe fn new_with_init<F: FnOnce(&InitCtx)>(f: F) -> Self {
        f(&InitCtx(PhantomData));
        // SAFETY: Safety contract of MainCtx::new is upheld by our caller.
        unsafe { Self::new() }
    }
}

/// Optimization and reordering fence.
#[inline(always)]
pub fn fence() {
    core::sync::atomic::fence(core::sync::atomic::Ordering::SeqCst);
}

// vim: ts=4 sw=4 expandtab
