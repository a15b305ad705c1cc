//! Codec for the fixed 20-byte STUN header.

use crate::error::StunError;
use crate::{MAGIC_COOKIE, STUN_HEADER_SIZE, TRANSACTION_ID_SIZE};

/// Decoded header fields. The type field is kept raw here; splitting it
/// into class and method is the message layer's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    pub message_type: u16,
    pub length: u16,
    pub transaction_id: [u8; TRANSACTION_ID_SIZE],
}

impl MessageHeader {
    /// Serializes the header: type, attribute byte count, magic cookie and
    /// transaction id, all in network order.
    pub fn encode(&self) -> [u8; STUN_HEADER_SIZE] {
        let mut buf = [0u8; STUN_HEADER_SIZE];
        buf[0..2].copy_from_slice(&self.message_type.to_be_bytes());
        buf[2..4].copy_from_slice(&self.length.to_be_bytes());
        buf[4..8].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
        buf[8..20].copy_from_slice(&self.transaction_id);
        buf
    }

    /// Reads the header from the start of `data`. Only the size and the
    /// magic cookie are validated at this layer.
    pub fn decode(data: &[u8]) -> Result<Self, StunError> {
        if data.len() < STUN_HEADER_SIZE {
            return Err(StunError::IncompleteMessage);
        }

        let message_type = u16::from_be_bytes([data[0], data[1]]);
        let length = u16::from_be_bytes([data[2], data[3]]);

        let magic = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
        if magic != MAGIC_COOKIE {
            return Err(StunError::InvalidMagicCookie);
        }

        let mut transaction_id = [0u8; TRANSACTION_ID_SIZE];
        transaction_id.copy_from_slice(&data[8..20]);

        Ok(MessageHeader {
            message_type,
            length,
            transaction_id,
        })
    }
}
