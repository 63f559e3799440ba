// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::frame::CanId;

/// Message identifier of the first node.
pub const NODE_1: CanId = CanId::new(1);
/// Message identifier of the second node.
pub const NODE_2: CanId = CanId::new(2);

/// Message identifier used by this build.
#[cfg(not(feature = "node2"))]
pub const NODE_ID: CanId = NODE_1;
/// Message identifier used by this build.
#[cfg(feature = "node2")]
pub const NODE_ID: CanId = NODE_2;

/// Hardware TX buffer that our frames are sent from.
pub const TX_BUFFER_INDEX: u8 = 0;

/// Maximum incoming data length.
/// Received payload beyond this is not copied.
pub const MAX_DATA_LEN: usize = 8;

/// Payload of every transmitted frame.
pub const TX_PAYLOAD: [u8; 8] = [0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88];

/// Transmit as CAN-FD frame.
pub const TX_FD: bool = true;
/// Switch to the data bit rate during the data phase.
pub const TX_BRS: bool = true;

#[cfg(test)]
mod test {
    use super::*;
    use crate::frame::{IdKind, TxDescriptor};

    #[test]
    fn test_tx_frame() {
        assert_eq!(NODE_1.kind(), Some(IdKind::Standard));
        assert_eq!(NODE_2.kind(), Some(IdKind::Standard));

        let tx = TxDescriptor {
            id: NODE_ID,
            kind: NODE_ID.kind().unwrap(),
            payload: &TX_PAYLOAD,
            fd: TX_FD,
            brs: TX_BRS,
        }
        .build()
        .unwrap();
        let header = tx.header();
        assert_eq!(header.id, NODE_ID);
        assert_eq!(header.kind, IdKind::Standard);
        assert!(tx.payload().eq(TX_PAYLOAD.iter().copied()));
    }
}

// vim: ts=4 sw=4 expandtab
