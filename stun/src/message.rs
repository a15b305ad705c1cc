//! Construction and parsing of STUN Binding messages.

use crate::attributes::{Attribute, AttributeReader, AttributeType};
use crate::error::StunError;
use crate::header::MessageHeader;
use crate::{STUN_HEADER_SIZE, TRANSACTION_ID_SIZE};
use std::collections::HashMap;
use std::net::SocketAddr;

// The 16-bit message type packs class and method together. The two class
// bits sit at 0x0100 and 0x0010; every other bit belongs to the method.
const CLASS_MASK: u16 = 0x0110;

/// Message classes defined by RFC 5389.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Request,
    Indication,
    SuccessResponse,
    ErrorResponse,
}

impl Class {
    /// Extracts the class bits from a raw message type.
    pub fn from_message_type(value: u16) -> Self {
        match value & CLASS_MASK {
            0x0000 => Class::Request,
            0x0010 => Class::Indication,
            0x0100 => Class::SuccessResponse,
            _ => Class::ErrorResponse,
        }
    }

    /// Class bits as placed in the message type field.
    pub fn to_u16(self) -> u16 {
        match self {
            Class::Request => 0x0000,
            Class::Indication => 0x0010,
            Class::SuccessResponse => 0x0100,
            Class::ErrorResponse => 0x0110,
        }
    }
}

/// Message methods. Only Binding is ever sent or expected by this client;
/// the rest exist so decoded type fields stay meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Binding,
    SharedSecret,
    Allocate,
    Refresh,
    Send,
    Data,
    CreatePermission,
    ChannelBind,
    Unknown(u16),
}

impl Method {
    /// Extracts the method bits from a raw message type.
    pub fn from_message_type(value: u16) -> Self {
        match value & !CLASS_MASK {
            0x0001 => Method::Binding,
            0x0002 => Method::SharedSecret,
            0x0003 => Method::Allocate,
            0x0004 => Method::Refresh,
            0x0006 => Method::Send,
            0x0007 => Method::Data,
            0x0008 => Method::CreatePermission,
            0x0009 => Method::ChannelBind,
            other => Method::Unknown(other),
        }
    }

    /// Method bits as placed in the message type field.
    pub fn to_u16(self) -> u16 {
        match self {
            Method::Binding => 0x0001,
            Method::SharedSecret => 0x0002,
            Method::Allocate => 0x0003,
            Method::Refresh => 0x0004,
            Method::Send => 0x0006,
            Method::Data => 0x0007,
            Method::CreatePermission => 0x0008,
            Method::ChannelBind => 0x0009,
            Method::Unknown(value) => value,
        }
    }
}

/// A STUN message: class, method, transaction id and whatever recognized
/// attributes were found. Built fresh per request and per datagram.
#[derive(Debug)]
pub struct StunMessage {
    pub method: Method,
    pub class: Class,
    pub transaction_id: [u8; TRANSACTION_ID_SIZE],
    pub attributes: HashMap<AttributeType, Attribute>,
}

impl StunMessage {
    /// Builds a Binding Request with a fresh random transaction id and no
    /// attributes.
    pub fn binding_request() -> Self {
        StunMessage {
            method: Method::Binding,
            class: Class::Request,
            transaction_id: rand::random(),
            attributes: HashMap::new(),
        }
    }

    /// Builds a Binding success response echoing `transaction_id` and
    /// carrying `addr` as XOR-MAPPED-ADDRESS. The client itself never
    /// sends one; tests use it to stand in for a server.
    pub fn binding_success(transaction_id: [u8; TRANSACTION_ID_SIZE], addr: SocketAddr) -> Self {
        let mut attributes = HashMap::new();
        attributes.insert(
            AttributeType::XorMappedAddress,
            Attribute::XorMappedAddress(addr),
        );
        StunMessage {
            method: Method::Binding,
            class: Class::SuccessResponse,
            transaction_id,
            attributes,
        }
    }

    /// Raw 16-bit message type of this message.
    pub fn message_type(&self) -> u16 {
        self.class.to_u16() | self.method.to_u16()
    }

    /// Serializes header plus attributes into a datagram.
    pub fn encode(&self) -> Vec<u8> {
        let mut body = Vec::new();
        for attribute in self.attributes.values() {
            body.extend_from_slice(&attribute.encode(&self.transaction_id));
        }

        let header = MessageHeader {
            message_type: self.message_type(),
            length: body.len() as u16,
            transaction_id: self.transaction_id,
        };

        let mut msg = Vec::with_capacity(STUN_HEADER_SIZE + body.len());
        msg.extend_from_slice(&header.encode());
        msg.extend_from_slice(&body);
        msg
    }

    /// Parses a datagram into a message. The attribute section must be at
    /// least as long as the header declares; recognized attributes are
    /// decoded, unknown ones are only walked over for alignment.
    pub fn decode(data: &[u8]) -> Result<Self, StunError> {
        let header = MessageHeader::decode(data)?;

        let body = &data[STUN_HEADER_SIZE..];
        if body.len() < header.length as usize {
            return Err(StunError::IncompleteMessage);
        }

        let mut attributes = HashMap::new();
        for entry in AttributeReader::new(body) {
            let (attr_type, value) = entry?;
            if let Some(known) = AttributeType::from_u16(attr_type) {
                let attribute = Attribute::decode(known, value, &header.transaction_id)?;
                attributes.insert(known, attribute);
            }
        }

        Ok(StunMessage {
            method: Method::from_message_type(header.message_type),
            class: Class::from_message_type(header.message_type),
            transaction_id: header.transaction_id,
            attributes,
        })
    }

    /// The discovered reflexive address, when the message carries one.
    pub fn xor_mapped_address(&self) -> Option<SocketAddr> {
        match self.attributes.get(&AttributeType::XorMappedAddress) {
            Some(Attribute::XorMappedAddress(addr)) => Some(*addr),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAGIC_COOKIE;

    #[test]
    fn test_binding_request_wire_layout() {
        let request = StunMessage::binding_request().encode();

        assert_eq!(request.len(), 20);

        // type: Binding Request (0x0001), length: 0
        assert_eq!(u16::from_be_bytes([request[0], request[1]]), 0x0001);
        assert_eq!(u16::from_be_bytes([request[2], request[3]]), 0x0000);

        let magic = u32::from_be_bytes([request[4], request[5], request[6], request[7]]);
        assert_eq!(magic, MAGIC_COOKIE);
    }

    #[test]
    fn test_transaction_id_is_unique() {
        let first = StunMessage::binding_request();
        let second = StunMessage::binding_request();
        assert_ne!(first.transaction_id, second.transaction_id);
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let request = StunMessage::binding_request();
        let decoded = StunMessage::decode(&request.encode()).expect("valid request");

        assert_eq!(decoded.method, request.method);
        assert_eq!(decoded.class, request.class);
        assert_eq!(decoded.transaction_id, request.transaction_id);
        assert!(decoded.attributes.is_empty());
    }

    #[test]
    fn test_class_and_method_masks() {
        // the four Binding type values
        assert_eq!(Class::from_message_type(0x0001), Class::Request);
        assert_eq!(Class::from_message_type(0x0011), Class::Indication);
        assert_eq!(Class::from_message_type(0x0101), Class::SuccessResponse);
        assert_eq!(Class::from_message_type(0x0111), Class::ErrorResponse);

        for value in [0x0001, 0x0011, 0x0101, 0x0111] {
            assert_eq!(Method::from_message_type(value), Method::Binding);
        }

        assert_eq!(Class::SuccessResponse.to_u16() | Method::Binding.to_u16(), 0x0101);
        assert_eq!(Method::from_message_type(0x000C), Method::Unknown(0x000C));
    }

    #[test]
    fn test_decode_truncated_attribute_section() {
        let mut msg = StunMessage::binding_request().encode();
        // claim 12 bytes of attributes that are not there
        msg[3] = 12;

        let result = StunMessage::decode(&msg);
        assert!(matches!(result, Err(StunError::IncompleteMessage)));
    }

    #[test]
    fn test_decode_synthetic_success_response() {
        // Binding success response for 203.0.113.5:54321, txid 0x01 * 12
        let mut msg = vec![
            0x01, 0x01, // type: Binding | SuccessResponse
            0x00, 0x0C, // length: 12
            0x21, 0x12, 0xA4, 0x42, // magic cookie
        ];
        msg.extend_from_slice(&[0x01; 12]);
        msg.extend_from_slice(&[
            0x00, 0x20, // XOR-MAPPED-ADDRESS
            0x00, 0x08, // length 8
            0x00, 0x01, // reserved, IPv4
            0xF5, 0x23, // 54321 ^ 0x2112
            0xEA, 0x12, 0xD5, 0x47, // 203.0.113.5 ^ magic
        ]);

        let decoded = StunMessage::decode(&msg).expect("valid response");
        assert_eq!(decoded.class, Class::SuccessResponse);
        assert_eq!(decoded.method, Method::Binding);
        assert_eq!(decoded.transaction_id, [0x01; 12]);
        assert_eq!(
            decoded.xor_mapped_address(),
            Some("203.0.113.5:54321".parse().unwrap())
        );
    }

    #[test]
    fn test_binding_success_round_trip() {
        let transaction_id = [0x42; 12];
        let addr: SocketAddr = "198.51.100.7:3478".parse().unwrap();

        let encoded = StunMessage::binding_success(transaction_id, addr).encode();
        let decoded = StunMessage::decode(&encoded).expect("valid response");

        assert_eq!(decoded.class, Class::SuccessResponse);
        assert_eq!(decoded.xor_mapped_address(), Some(addr));
    }

    #[test]
    fn test_decode_drops_unknown_attributes() {
        let transaction_id = [0x02; 12];
        let addr: SocketAddr = "203.0.113.5:54321".parse().unwrap();
        let mut msg = StunMessage::binding_success(transaction_id, addr).encode();

        // append an unknown attribute of length 3 plus 1 padding byte
        msg.extend_from_slice(&[0x80, 0x2B, 0x00, 0x03, 0x01, 0x02, 0x03, 0x00]);
        let length = (msg.len() - 20) as u16;
        msg[2..4].copy_from_slice(&length.to_be_bytes());

        let decoded = StunMessage::decode(&msg).expect("valid response");
        assert_eq!(decoded.attributes.len(), 1);
        assert_eq!(decoded.xor_mapped_address(), Some(addr));
    }
}
