// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Serial line CAN (Lawicel ASCII) protocol, with the CAN-FD extension.

use canfd_node::frame::{
    CanId, Header, IdKind, MAX_CLASSIC_LEN, RxElement, TxElement, dlc_to_len,
};
use std::fmt::Write as _;

pub const CR: u8 = b'\r';
pub const BEL: u8 = 0x07;

/// Longest line we accept. Extended FD frame with 64 bytes and timestamp.
const MAX_LINE: usize = 1 + 8 + 1 + 2 * 64 + 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    BadHex,
    BadLength,
    IdOutOfRange,
}

/// Something the adapter sent us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Command accepted.
    Ack,
    /// Frame transmission accepted.
    TxAck,
    /// Command or transmission refused.
    Nack,
    /// Received frame.
    Frame(Result<RxElement, ParseError>),
    /// Anything else, like version replies.
    Other,
}

fn hex_digit(c: u8) -> Result<u8, ParseError> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(ParseError::BadHex),
    }
}

fn hex(s: &[u8]) -> Result<u32, ParseError> {
    s.iter()
        .try_fold(0_u32, |acc, &c| Ok((acc << 4) | u32::from(hex_digit(c)?)))
}

/// Parse one frame line, without the terminating CR.
pub fn parse_frame(line: &[u8]) -> Result<RxElement, ParseError> {
    let (&cmd, rest) = line.split_first().ok_or(ParseError::BadLength)?;
    let (kind, remote, fd, brs) = match cmd {
        b't' => (IdKind::Standard, false, false, false),
        b'T' => (IdKind::Extended, false, false, false),
        b'r' => (IdKind::Standard, true, false, false),
        b'R' => (IdKind::Extended, true, false, false),
        b'd' => (IdKind::Standard, false, true, false),
        b'D' => (IdKind::Extended, false, true, false),
        b'b' => (IdKind::Standard, false, true, true),
        b'B' => (IdKind::Extended, false, true, true),
        _ => return Err(ParseError::BadLength),
    };
    let (id_len, id_max) = match kind {
        IdKind::Standard => (3, 0x7FF),
        IdKind::Extended => (8, 0x1FFF_FFFF),
    };
    if rest.len() < id_len + 1 {
        return Err(ParseError::BadLength);
    }
    let (id, rest) = rest.split_at(id_len);
    let id = hex(id)?;
    if id > id_max {
        return Err(ParseError::IdOutOfRange);
    }
    let (dlc, rest) = rest.split_at(1);
    let dlc = hex(dlc)? as u8;
    if !fd && dlc as usize > MAX_CLASSIC_LEN {
        return Err(ParseError::BadLength);
    }
    let header = Header {
        id: CanId::new(id),
        kind,
        remote,
        fd,
        brs,
        dlc,
    };

    let data_len = if remote { 0 } else { dlc_to_len(dlc, fd) };
    if rest.len() < data_len * 2 {
        return Err(ParseError::BadLength);
    }
    let (data, rest) = rest.split_at(data_len * 2);
    let payload = data
        .chunks(2)
        .map(|b| hex(b).map(|b| b as u8))
        .collect::<Result<Vec<u8>, _>>()?;

    // Optional timestamp.
    let timestamp = match rest.len() {
        0 => 0,
        4 => hex(rest)? as u16,
        _ => return Err(ParseError::BadLength),
    };

    Ok(RxElement::new(&header, &payload, timestamp, 0))
}

/// Encode a transmit element as frame command, including the terminating CR.
pub fn encode_frame(element: &TxElement) -> Vec<u8> {
    let header = element.header();
    let cmd = match (header.kind, header.remote, header.fd, header.brs) {
        (IdKind::Standard, true, _, _) => 'r',
        (IdKind::Extended, true, _, _) => 'R',
        (IdKind::Standard, false, false, _) => 't',
        (IdKind::Extended, false, false, _) => 'T',
        (IdKind::Standard, false, true, false) => 'd',
        (IdKind::Extended, false, true, false) => 'D',
        (IdKind::Standard, false, true, true) => 'b',
        (IdKind::Extended, false, true, true) => 'B',
    };
    let mut s = String::with_capacity(MAX_LINE + 1);
    s.push(cmd);
    let _ = match header.kind {
        IdKind::Standard => write!(s, "{:03X}", header.id.raw()),
        IdKind::Extended => write!(s, "{:08X}", header.id.raw()),
    };
    let _ = write!(s, "{:X}", header.dlc);
    if !header.remote {
        for byte in element.payload() {
            let _ = write!(s, "{byte:02X}");
        }
    }
    let mut cmd = s.into_bytes();
    cmd.push(CR);
    cmd
}

/// Nominal bit rate setup command.
pub fn bitrate_cmd(bitrate: u32) -> Option<&'static [u8]> {
    let cmd: &'static [u8] = match bitrate {
        10_000 => b"S0\r",
        20_000 => b"S1\r",
        50_000 => b"S2\r",
        100_000 => b"S3\r",
        125_000 => b"S4\r",
        250_000 => b"S5\r",
        500_000 => b"S6\r",
        800_000 => b"S7\r",
        1_000_000 => b"S8\r",
        _ => return None,
    };
    Some(cmd)
}

/// Data phase bit rate setup command.
pub fn data_bitrate_cmd(bitrate: u32) -> Option<&'static [u8]> {
    let cmd: &'static [u8] = match bitrate {
        1_000_000 => b"Y1\r",
        2_000_000 => b"Y2\r",
        4_000_000 => b"Y4\r",
        5_000_000 => b"Y5\r",
        _ => return None,
    };
    Some(cmd)
}

pub const CLOSE_CMD: &[u8] = b"C\r";
pub const OPEN_CMD: &[u8] = b"O\r";

/// Splits the adapter byte stream into events.
#[derive(Default)]
pub struct Decoder {
    line: Vec<u8>,
    overflow: bool,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, byte: u8) -> Option<Event> {
        match byte {
            BEL => {
                self.line.clear();
                self.overflow = false;
                Some(Event::Nack)
            }
            CR => {
                let event = if self.overflow {
                    Event::Frame(Err(ParseError::BadLength))
                } else {
                    Self::classify(&self.line)
                };
                self.line.clear();
                self.overflow = false;
                Some(event)
            }
            b'\n' => None,
            _ => {
                if self.line.len() < MAX_LINE {
                    self.line.push(byte);
                } else {
                    self.overflow = true;
                }
                None
            }
        }
    }

    fn classify(line: &[u8]) -> Event {
        match line.first() {
            None => Event::Ack,
            Some(b'z' | b'Z') if line.len() == 1 => Event::TxAck,
            Some(b't' | b'T' | b'r' | b'R' | b'd' | b'D' | b'b' | b'B') => {
                Event::Frame(parse_frame(line))
            }
            Some(_) => Event::Other,
        }
    }
}


// vim: ts=4 sw=4 expandtab
