// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Console reports.
//!
//! The console is fire and forget. Write errors are ignored.

use crate::frame::{CanId, DecodedFrame};
use core::fmt::Write;

const RULE: &str = "===========================================================";

pub fn banner(w: &mut impl Write, node: CanId) {
    let _ = write!(w, "{RULE}\r\nWelcome to CAN-FD example\r\n{RULE}\r\n\r\n");
    let _ = write!(w, "{RULE}\r\nCAN-FD Node-{node} (message id)\r\n{RULE}\r\n\r\n");
}

pub fn frame_sent(w: &mut impl Write, id: CanId) {
    let _ = write!(w, "CAN-FD Frame sent with message ID-{id}\r\n");
}

pub fn frame_send_error(w: &mut impl Write, id: CanId) {
    let _ = write!(w, "Error sending CAN-FD Frame with message ID-{id}\r\n");
}

pub fn frame_received<const N: usize>(w: &mut impl Write, frame: &DecodedFrame<N>) {
    let _ = write!(
        w,
        "{} bytes received with message identifier {}\r\n",
        frame.len(),
        frame.id()
    );
    let _ = w.write_str("Rx Data :");
    for byte in frame.data() {
        let _ = write!(w, " {byte}");
    }
    let _ = w.write_str("\r\n");
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::frame::{Header, IdKind, RxElement, decode};
    use heapless::String;

    #[test]
    fn test_frame_received() {
        let header = Header {
            id: CanId::new(42),
            kind: IdKind::Standard,
            remote: false,
            fd: false,
            brs: false,
            dlc: 3,
        };
        let raw = RxElement::new(&header, &[10, 20, 30], 0, 0);
        let frame = decode::<8>(&raw, true).unwrap();

        let mut out: String<128> = String::new();
        frame_received(&mut out, &frame);
        assert_eq!(
            out.as_str(),
            "3 bytes received with message identifier 42\r\nRx Data : 10 20 30\r\n"
        );
    }

    #[test]
    fn test_tx_reports() {
        let mut out: String<128> = String::new();
        frame_sent(&mut out, CanId::new(1));
        frame_send_error(&mut out, CanId::new(1));
        assert_eq!(
            out.as_str(),
            "CAN-FD Frame sent with message ID-1\r\nError sending CAN-FD Frame with message ID-1\r\n"
        );
    }

    #[test]
    fn test_banner() {
        let mut out: String<512> = String::new();
        banner(&mut out, CanId::new(2));
        assert!(out.contains("CAN-FD Node-2 (message id)"));
    }

    #[test]
    fn test_full_console() {
        // A full console must not hurt.
        let mut out: String<8> = String::new();
        frame_sent(&mut out, CanId::new(1));
    }
}

// vim: ts=4 sw=4 expandtab
