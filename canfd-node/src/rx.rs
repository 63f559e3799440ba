// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{
    config::MAX_DATA_LEN,
    context::IrqCtx,
    frame::{CanId, Rejected, RxElement, decode},
    hw::StatusLed,
    report,
};
use core::fmt::Write;

/// What the receive handler did with a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxOutcome {
    /// Silently dropped. Not an error.
    Dropped(Rejected),
    /// LED toggled and frame reported.
    Reported { fifo: u8, id: CanId, len: usize },
}

/// A frame was received into RX FIFO `fifo`.
///
/// Invalid receptions and remote frames are filtered out.
/// Data frames toggle the status LED once and are reported on the console.
pub fn irq_handler_rx(
    _c: &IrqCtx,
    valid: bool,
    fifo: u8,
    raw: &RxElement,
    led: &impl StatusLed,
    console: &mut impl Write,
) -> RxOutcome {
    match decode::<MAX_DATA_LEN>(raw, valid) {
        Err(reason) => RxOutcome::Dropped(reason),
        Ok(frame) => {
            led.toggle();
            report::frame_received(console, &frame);
            RxOutcome::Reported {
                fifo,
                id: frame.id(),
                len: frame.len(),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::frame::{Header, IdKind};
    use core::cell::Cell;
    use heapless::String;

    struct Led(Cell<u32>);

    impl StatusLed for Led {
        fn toggle(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn header(id: u32, remote: bool, dlc: u8) -> Header {
        Header {
            id: CanId::new(id),
            kind: IdKind::Standard,
            remote,
            fd: true,
            brs: true,
            dlc,
        }
    }

    #[test]
    fn test_rx_data_frame() {
        // SAFETY: Tests have no real contexts.
        let c = unsafe { IrqCtx::new() };
        let led = Led(Cell::new(0));
        let mut out: String<256> = String::new();

        let raw = RxElement::new(&header(42, false, 3), &[10, 20, 30], 0, 0);
        let outcome = irq_handler_rx(&c, true, 0, &raw, &led, &mut out);
        assert_eq!(
            outcome,
            RxOutcome::Reported {
                fifo: 0,
                id: CanId::new(42),
                len: 3
            }
        );
        assert_eq!(led.0.get(), 1);
        assert_eq!(
            out.as_str(),
            "3 bytes received with message identifier 42\r\nRx Data : 10 20 30\r\n"
        );
    }

    #[test]
    fn test_rx_invalid() {
        // SAFETY: Tests have no real contexts.
        let c = unsafe { IrqCtx::new() };
        let led = Led(Cell::new(0));
        let mut out: String<256> = String::new();

        let raw = RxElement::new(&header(42, false, 3), &[10, 20, 30], 0, 0);
        let outcome = irq_handler_rx(&c, false, 1, &raw, &led, &mut out);
        assert_eq!(outcome, RxOutcome::Dropped(Rejected::HardwareInvalid));
        assert_eq!(led.0.get(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_rx_remote() {
        // SAFETY: Tests have no real contexts.
        let c = unsafe { IrqCtx::new() };
        let led = Led(Cell::new(0));
        let mut out: String<256> = String::new();

        let raw = RxElement::new(&header(5, true, 8), &[], 0, 0);
        let outcome = irq_handler_rx(&c, true, 0, &raw, &led, &mut out);
        assert_eq!(outcome, RxOutcome::Dropped(Rejected::NotDataFrame));
        assert_eq!(led.0.get(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_rx_every_length() {
        // SAFETY: Tests have no real contexts.
        let c = unsafe { IrqCtx::new() };
        let led = Led(Cell::new(0));
        let payload: [u8; 8] = [9, 8, 7, 6, 5, 4, 3, 2];

        for len in 0..=MAX_DATA_LEN {
            let mut out: String<256> = String::new();
            let raw = RxElement::new(&header(0x100, false, len as u8), &payload[..len], 0, 1);
            let outcome = irq_handler_rx(&c, true, 1, &raw, &led, &mut out);
            assert_eq!(
                outcome,
                RxOutcome::Reported {
                    fifo: 1,
                    id: CanId::new(0x100),
                    len
                }
            );

            let data = out.lines().nth(1).unwrap().strip_prefix("Rx Data :").unwrap();
            let mut bytes = data.split_whitespace().map(|b| b.parse::<u8>().unwrap());
            assert!(bytes.by_ref().take(len).eq(payload[..len].iter().copied()));
            assert_eq!(bytes.next(), None);
        }
        assert_eq!(led.0.get(), MAX_DATA_LEN as u32 + 1);
    }

    #[test]
    fn test_rx_oversized() {
        // SAFETY: Tests have no real contexts.
        let c = unsafe { IrqCtx::new() };
        let led = Led(Cell::new(0));
        let mut out: String<256> = String::new();

        let payload = [0x55; 64];
        let raw = RxElement::new(&header(3, false, 15), &payload, 0, 0);
        let outcome = irq_handler_rx(&c, true, 0, &raw, &led, &mut out);
        assert_eq!(
            outcome,
            RxOutcome::Reported {
                fifo: 0,
                id: CanId::new(3),
                len: MAX_DATA_LEN
            }
        );
        assert_eq!(led.0.get(), 1);
    }
}

// vim: ts=4 sw=4 expandtab
