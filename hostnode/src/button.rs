// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! User button on the terminal. Every input line is one press.

use crate::irq::ExtIntPin;
use anyhow::{self as ah, Context as _};
use canfd_node::{PendingTransmit, trigger::irq_handler_button};
use std::io::BufRead;

pub fn run(input: impl BufRead, pin: &ExtIntPin, pending: &PendingTransmit) -> ah::Result<()> {
    for line in input.lines() {
        line.context("Read button input")?;
        pin.edge();
        pin.service(|c, pin| irq_handler_button(c, pin, pending));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use canfd_node::MainCtx;

    #[test]
    fn test_presses() {
        // SAFETY: Tests have no real contexts.
        let m = unsafe { MainCtx::new() };
        let pin = ExtIntPin::new();
        let pending = PendingTransmit::new();

        run(&b""[..], &pin, &pending).unwrap();
        assert!(!pending.is_pending(&m));

        run(&b"\n\nsend\n"[..], &pin, &pending).unwrap();
        assert!(pending.is_pending(&m));
        assert!(!pin.is_flagged());
    }
}

// vim: ts=4 sw=4 expandtab
