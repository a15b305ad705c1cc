//! Minimal STUN (RFC 5389) client for NAT address discovery.
//!
//! Only the Binding transaction over UDP is implemented: build a request,
//! exchange one datagram with a server and read the reflexive transport
//! address out of the XOR-MAPPED-ADDRESS attribute of the response.

mod attributes;
mod client;
mod error;
mod header;
mod message;

pub use attributes::{Attribute, AttributeType};
pub use client::StunClient;
pub use error::StunError;
pub use header::MessageHeader;
pub use message::{Class, Method, StunMessage};

pub const MAGIC_COOKIE: u32 = 0x2112A442;
pub const STUN_HEADER_SIZE: usize = 20;
pub const TRANSACTION_ID_SIZE: usize = 12;
