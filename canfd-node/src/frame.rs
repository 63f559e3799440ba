// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CAN-FD frame codec.
//!
//! Receive and transmit elements use the Bosch M_CAN message RAM layout:
//! two header words followed by up to 64 data bytes in little endian words.

use derive_more::{Display, From};
use heapless::Vec;

const fn lsb_mask(bits: u32) -> u32 {
    (1 << bits) - 1
}

// Header word 0 (R0 / T0).
const EXT_ID_MASK: u32 = lsb_mask(29);
const STD_ID_MASK: u32 = lsb_mask(11);
const STD_ID_OFFSET: u32 = 18;
const RTR_FLAG: u32 = 1 << 29;
const XTD_FLAG: u32 = 1 << 30;

// Header word 1 (R1 / T1).
const TIMESTAMP_MASK: u32 = lsb_mask(16);
const DLC_MASK: u32 = lsb_mask(4);
const DLC_OFFSET: u32 = 16;
const BRS_FLAG: u32 = 1 << 20;
const FDF_FLAG: u32 = 1 << 21;
const FIDX_MASK: u32 = lsb_mask(7);
const FIDX_OFFSET: u32 = 24;

/// Number of data words in one element.
pub const DATA_WORDS: usize = 16;
/// Maximum payload of a CAN-FD frame.
pub const MAX_FD_LEN: usize = 64;
/// Maximum payload of a classic CAN frame.
pub const MAX_CLASSIC_LEN: usize = 8;

/// CAN message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CanId(u32);

impl CanId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Smallest identifier format that can carry this identifier.
    pub const fn kind(self) -> Option<IdKind> {
        if self.0 <= STD_ID_MASK {
            Some(IdKind::Standard)
        } else if self.0 <= EXT_ID_MASK {
            Some(IdKind::Extended)
        } else {
            None
        }
    }
}

/// Identifier format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IdKind {
    /// 11 bit identifier.
    Standard,
    /// 29 bit identifier.
    Extended,
}

/// Convert a data length code into the number of payload bytes.
pub const fn dlc_to_len(dlc: u8, fd: bool) -> usize {
    match dlc {
        0..=8 => dlc as usize,
        _ if !fd => MAX_CLASSIC_LEN,
        9 => 12,
        10 => 16,
        11 => 20,
        12 => 24,
        13 => 32,
        14 => 48,
        _ => 64,
    }
}

/// Smallest data length code that can carry `len` payload bytes.
pub const fn len_to_dlc(len: usize) -> Option<u8> {
    let dlc = match len {
        0..=8 => len as u8,
        9..=12 => 9,
        13..=16 => 10,
        17..=20 => 11,
        21..=24 => 12,
        25..=32 => 13,
        33..=48 => 14,
        49..=64 => 15,
        _ => return None,
    };
    Some(dlc)
}

/// Decoded element header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Header {
    pub id: CanId,
    pub kind: IdKind,
    /// Remote transmission request.
    pub remote: bool,
    /// CAN-FD format.
    pub fd: bool,
    /// Bit rate switch.
    pub brs: bool,
    /// Data length code, 0..=15.
    pub dlc: u8,
}

impl Header {
    /// Number of payload bytes announced by the header.
    pub const fn data_len(&self) -> usize {
        dlc_to_len(self.dlc, self.fd)
    }

    fn pack_word0(&self) -> u32 {
        let id = match self.kind {
            IdKind::Standard => (self.id.raw() & STD_ID_MASK) << STD_ID_OFFSET,
            IdKind::Extended => (self.id.raw() & EXT_ID_MASK) | XTD_FLAG,
        };
        id | if self.remote { RTR_FLAG } else { 0 }
    }

    fn pack_word1(&self) -> u32 {
        let mut w = (u32::from(self.dlc) & DLC_MASK) << DLC_OFFSET;
        if self.brs {
            w |= BRS_FLAG;
        }
        if self.fd {
            w |= FDF_FLAG;
        }
        w
    }

    fn unpack(w0: u32, w1: u32) -> Self {
        let (id, kind) = if w0 & XTD_FLAG != 0 {
            (w0 & EXT_ID_MASK, IdKind::Extended)
        } else {
            ((w0 >> STD_ID_OFFSET) & STD_ID_MASK, IdKind::Standard)
        };
        Self {
            id: CanId::new(id),
            kind,
            remote: w0 & RTR_FLAG != 0,
            fd: w1 & FDF_FLAG != 0,
            brs: w1 & BRS_FLAG != 0,
            dlc: ((w1 >> DLC_OFFSET) & DLC_MASK) as u8,
        }
    }
}

fn pack_data(payload: &[u8]) -> [u32; DATA_WORDS] {
    let mut data = [0; DATA_WORDS];
    for (word, chunk) in data.iter_mut().zip(payload.chunks(4)) {
        let mut bytes = [0; 4];
        bytes[..chunk.len()].copy_from_slice(chunk);
        *word = u32::from_le_bytes(bytes);
    }
    data
}

fn data_bytes(data: &[u32; DATA_WORDS]) -> impl Iterator<Item = u8> + '_ {
    data.iter().flat_map(|w| w.to_le_bytes())
}

/// Receive element, as filled in by the CAN-FD controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxElement {
    pub r0: u32,
    pub r1: u32,
    pub data: [u32; DATA_WORDS],
}

impl RxElement {
    pub const fn zeroed() -> Self {
        Self {
            r0: 0,
            r1: 0,
            data: [0; DATA_WORDS],
        }
    }

    /// Build an element the way the controller would store a received frame.
    /// Payload bytes beyond the capacity of one element are not stored.
    pub fn new(header: &Header, payload: &[u8], timestamp: u16, filter_index: u8) -> Self {
        let r1 = header.pack_word1()
            | u32::from(timestamp)
            | ((u32::from(filter_index) & FIDX_MASK) << FIDX_OFFSET);
        Self {
            r0: header.pack_word0(),
            r1,
            data: pack_data(&payload[..payload.len().min(MAX_FD_LEN)]),
        }
    }

    pub fn header(&self) -> Header {
        Header::unpack(self.r0, self.r1)
    }

    pub fn timestamp(&self) -> u16 {
        (self.r1 & TIMESTAMP_MASK) as u16
    }

    pub fn filter_index(&self) -> u8 {
        ((self.r1 >> FIDX_OFFSET) & FIDX_MASK) as u8
    }
}

/// Reason for not delivering a received frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rejected {
    /// The controller flagged the reception as invalid.
    HardwareInvalid,
    /// Remote transmission request. There is no payload.
    NotDataFrame,
}

/// A received data frame with at most `N` payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodedFrame<const N: usize> {
    header: Header,
    data: Vec<u8, N>,
}

impl<const N: usize> DecodedFrame<N> {
    pub fn id(&self) -> CanId {
        self.header.id
    }

    pub fn id_kind(&self) -> IdKind {
        self.header.kind
    }

    pub fn is_fd(&self) -> bool {
        self.header.fd
    }

    pub fn bit_rate_switch(&self) -> bool {
        self.header.brs
    }

    /// Payload length announced by the frame header.
    /// May be larger than [Self::len], if the payload was truncated to `N`.
    pub fn declared_len(&self) -> usize {
        self.header.data_len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Decode a received element.
///
/// `valid` is the controller's verdict about the reception.
/// The element is not looked at, if it is false.
pub fn decode<const N: usize>(raw: &RxElement, valid: bool) -> Result<DecodedFrame<N>, Rejected> {
    if !valid {
        return Err(Rejected::HardwareInvalid);
    }
    let header = raw.header();
    if header.remote {
        return Err(Rejected::NotDataFrame);
    }
    // The length field might be corrupted. Never copy more than we can hold.
    let len = header.data_len().min(N);
    let data = data_bytes(&raw.data).take(len).collect();
    Ok(DecodedFrame { header, data })
}

/// Error while building a transmit element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxElementError {
    /// The identifier does not fit into the requested format.
    IdOutOfRange,
    /// The payload does not fit into one frame.
    PayloadTooLong,
    /// Bit rate switching requires the CAN-FD format.
    BrsWithoutFd,
}

/// Static description of a frame to transmit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxDescriptor<'a> {
    pub id: CanId,
    pub kind: IdKind,
    pub payload: &'a [u8],
    pub fd: bool,
    pub brs: bool,
}

impl TxDescriptor<'_> {
    /// Build the transmit element.
    ///
    /// The payload is zero padded to the next length a data length code can express.
    pub fn build(&self) -> Result<TxElement, TxElementError> {
        let id_ok = match self.kind {
            IdKind::Standard => self.id.raw() <= STD_ID_MASK,
            IdKind::Extended => self.id.raw() <= EXT_ID_MASK,
        };
        if !id_ok {
            return Err(TxElementError::IdOutOfRange);
        }
        if self.brs && !self.fd {
            return Err(TxElementError::BrsWithoutFd);
        }
        let max_len = if self.fd { MAX_FD_LEN } else { MAX_CLASSIC_LEN };
        if self.payload.len() > max_len {
            return Err(TxElementError::PayloadTooLong);
        }
        let dlc = len_to_dlc(self.payload.len()).ok_or(TxElementError::PayloadTooLong)?;
        let header = Header {
            id: self.id,
            kind: self.kind,
            remote: false,
            fd: self.fd,
            brs: self.brs,
            dlc,
        };
        Ok(TxElement {
            t0: header.pack_word0(),
            t1: header.pack_word1(),
            data: pack_data(self.payload),
        })
    }
}

/// Transmit element, as handed to the CAN-FD controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxElement {
    pub t0: u32,
    pub t1: u32,
    pub data: [u32; DATA_WORDS],
}

impl TxElement {
    pub fn header(&self) -> Header {
        Header::unpack(self.t0, self.t1)
    }

    /// The payload bytes, as many as the header announces.
    pub fn payload(&self) -> impl Iterator<Item = u8> + '_ {
        data_bytes(&self.data).take(self.header().data_len())
    }
}


// vim: ts=4 sw=4 expandtab
