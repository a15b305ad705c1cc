//! TLV attribute walking and the attributes this client understands.

use crate::error::StunError;
use crate::{MAGIC_COOKIE, TRANSACTION_ID_SIZE};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

const ATTR_HEADER_SIZE: usize = 4;

const FAMILY_IPV4: u8 = 0x01;
const FAMILY_IPV6: u8 = 0x02;

/// Attribute type codes this client recognizes. Adding support for a new
/// attribute means adding a variant here plus its arm in
/// [`Attribute::decode`]; the walker itself never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    XorMappedAddress,
}

impl AttributeType {
    /// Maps a wire type code to a recognized attribute, or `None` for
    /// codes this client skips.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0020 => Some(AttributeType::XorMappedAddress),
            _ => None,
        }
    }

    /// Wire type code of the attribute.
    pub fn to_u16(self) -> u16 {
        match self {
            AttributeType::XorMappedAddress => 0x0020,
        }
    }
}

/// A decoded attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    XorMappedAddress(SocketAddr),
}

impl Attribute {
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            Attribute::XorMappedAddress(_) => AttributeType::XorMappedAddress,
        }
    }

    /// Decodes the value bytes of a recognized attribute.
    pub(crate) fn decode(
        attr_type: AttributeType,
        value: &[u8],
        transaction_id: &[u8; TRANSACTION_ID_SIZE],
    ) -> Result<Self, StunError> {
        match attr_type {
            AttributeType::XorMappedAddress => {
                decode_xor_mapped_address(value, transaction_id).map(Attribute::XorMappedAddress)
            }
        }
    }

    /// Serializes the attribute as a full TLV, padding included.
    pub(crate) fn encode(&self, transaction_id: &[u8; TRANSACTION_ID_SIZE]) -> Vec<u8> {
        let value = match self {
            Attribute::XorMappedAddress(addr) => {
                encode_xor_mapped_address(*addr, transaction_id)
            }
        };

        let mut buf = Vec::with_capacity(ATTR_HEADER_SIZE + value.len() + 3);
        buf.extend_from_slice(&self.attribute_type().to_u16().to_be_bytes());
        buf.extend_from_slice(&(value.len() as u16).to_be_bytes());
        buf.extend_from_slice(&value);
        for _ in 0..padding(value.len()) {
            buf.push(0);
        }
        buf
    }
}

/// Padding bytes needed after a value of `length` bytes to reach the next
/// 4-byte boundary.
pub(crate) fn padding(length: usize) -> usize {
    (4 - length % 4) % 4
}

/// Lazy walk over the raw `(type, value)` pairs of an attribute section.
/// Each step advances past the declared value plus its alignment padding.
pub(crate) struct AttributeReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> AttributeReader<'a> {
    /// `data` is the attribute section only, header already stripped.
    pub(crate) fn new(data: &'a [u8]) -> Self {
        AttributeReader { data, offset: 0 }
    }
}

impl<'a> Iterator for AttributeReader<'a> {
    type Item = Result<(u16, &'a [u8]), StunError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.data.len() {
            return None;
        }

        let remaining = &self.data[self.offset..];
        if remaining.len() < ATTR_HEADER_SIZE {
            self.offset = self.data.len();
            return Some(Err(StunError::IncompleteMessage));
        }

        let attr_type = u16::from_be_bytes([remaining[0], remaining[1]]);
        let length = u16::from_be_bytes([remaining[2], remaining[3]]) as usize;

        if remaining.len() < ATTR_HEADER_SIZE + length {
            self.offset = self.data.len();
            return Some(Err(StunError::IncompleteMessage));
        }

        let value = &remaining[ATTR_HEADER_SIZE..ATTR_HEADER_SIZE + length];
        self.offset += ATTR_HEADER_SIZE + length + padding(length);

        Some(Ok((attr_type, value)))
    }
}

/// XOR mask applied to the address bytes of XOR-MAPPED-ADDRESS: the magic
/// cookie first, then the transaction id for whatever bytes remain (the
/// IPv6 case). The mask is its own inverse.
pub fn xor_address(bytes: &mut [u8], transaction_id: &[u8; TRANSACTION_ID_SIZE]) {
    let cookie = MAGIC_COOKIE.to_be_bytes();
    let mask = cookie.iter().chain(transaction_id.iter());
    for (byte, key) in bytes.iter_mut().zip(mask) {
        *byte ^= key;
    }
}

/// XOR mask applied to the port field: the high 16 bits of the cookie.
pub fn xor_port(port: u16) -> u16 {
    port ^ (MAGIC_COOKIE >> 16) as u16
}

/// Reads a XOR-MAPPED-ADDRESS value: reserved(1), family(1), port(2) and
/// the masked address bytes.
fn decode_xor_mapped_address(
    value: &[u8],
    transaction_id: &[u8; TRANSACTION_ID_SIZE],
) -> Result<SocketAddr, StunError> {
    if value.len() < 4 {
        return Err(StunError::IncompleteMessage);
    }

    let family = value[1];
    let port = xor_port(u16::from_be_bytes([value[2], value[3]]));
    let addr_bytes = &value[4..];

    let ip = match family {
        FAMILY_IPV4 => {
            if addr_bytes.len() < 4 {
                return Err(StunError::IncompleteMessage);
            }
            let mut octets = [0u8; 4];
            octets.copy_from_slice(&addr_bytes[..4]);
            xor_address(&mut octets, transaction_id);
            IpAddr::V4(Ipv4Addr::from(octets))
        }
        FAMILY_IPV6 => {
            if addr_bytes.len() < 16 {
                return Err(StunError::IncompleteMessage);
            }
            let mut octets = [0u8; 16];
            octets.copy_from_slice(&addr_bytes[..16]);
            xor_address(&mut octets, transaction_id);
            IpAddr::V6(Ipv6Addr::from(octets))
        }
        other => return Err(StunError::UnknownAddressFamily(other)),
    };

    Ok(SocketAddr::new(ip, port))
}

/// Inverse of [`decode_xor_mapped_address`], used when building success
/// responses.
fn encode_xor_mapped_address(
    addr: SocketAddr,
    transaction_id: &[u8; TRANSACTION_ID_SIZE],
) -> Vec<u8> {
    let (family, octets) = match addr.ip() {
        IpAddr::V4(ip) => (FAMILY_IPV4, ip.octets().to_vec()),
        IpAddr::V6(ip) => (FAMILY_IPV6, ip.octets().to_vec()),
    };

    let mut value = Vec::with_capacity(4 + octets.len());
    value.push(0x00);
    value.push(family);
    value.extend_from_slice(&xor_port(addr.port()).to_be_bytes());

    let mut masked = octets;
    xor_address(&mut masked, transaction_id);
    value.extend_from_slice(&masked);
    value
}
