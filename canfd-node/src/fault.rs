// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fatal error escalation.
//!
//! Only for hardware bring-up. Errors on the data path are reported
//! on the console and never end up here.

use core::fmt::Debug;

/// Status word value that signals success, in the vendor driver convention.
pub const STATUS_SUCCESS: u32 = 0;

/// Stop the system.
///
/// Binaries are built with `panic = "abort"`, so this stops immediately
/// without unwinding.
#[cold]
#[inline(never)]
pub fn halt(what: &dyn Debug) -> ! {
    panic!("fatal: {what:?}");
}

/// Unwrap a setup result or halt.
#[inline(always)]
pub fn check<T, E: Debug>(status: Result<T, E>) -> T {
    match status {
        Ok(value) => value,
        Err(e) => halt(&e),
    }
}

/// Unwrap a setup option or halt.
#[inline(always)]
pub fn check_option<T>(value: Option<T>) -> T {
    match value {
        Some(value) => value,
        None => halt(&"missing value"),
    }
}

/// Halt on any status word other than [STATUS_SUCCESS].
#[inline(always)]
pub fn check_status(status: u32) {
    if status != STATUS_SUCCESS {
        halt(&status);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_check_ok() {
        assert_eq!(check::<_, ()>(Ok(42)), 42);
        assert_eq!(check_option(Some("x")), "x");
        check_status(STATUS_SUCCESS);
    }

    #[test]
    #[should_panic(expected = "fatal")]
    fn test_check_err() {
        check::<(), _>(Err("init failed"));
    }

    #[test]
    #[should_panic(expected = "fatal")]
    fn test_check_option_none() {
        check_option::<u8>(None);
    }

    #[test]
    #[should_panic(expected = "fatal")]
    fn test_check_status_err() {
        check_status(0x0051_0001);
    }
}

// vim: ts=4 sw=4 expandtab
