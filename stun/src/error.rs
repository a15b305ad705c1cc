//! Error kinds surfaced by the STUN client.

use crate::message::{Class, Method};
use std::fmt;
use std::io;

/// Failures of a single Binding transaction. None of them is retried
/// internally; the caller decides whether to try again or give up.
#[derive(Debug)]
pub enum StunError {
    /// Buffer shorter than the header or than a declared attribute length.
    IncompleteMessage,
    /// The magic cookie field does not equal `0x2112A442`.
    InvalidMagicCookie,
    /// The response carries a transaction id other than the request's.
    TransactionMismatch,
    /// The response class is not a success response.
    UnexpectedClass(Class),
    /// The response method is not Binding.
    UnexpectedMethod(Method),
    /// The response has no XOR-MAPPED-ADDRESS attribute.
    MissingAddressAttribute,
    /// Address family byte other than IPv4 (1) or IPv6 (2).
    UnknownAddressFamily(u8),
    /// Transport failure, propagated unchanged.
    Io(io::Error),
}

impl fmt::Display for StunError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StunError::IncompleteMessage => write!(f, "STUN message too short"),
            StunError::InvalidMagicCookie => write!(f, "invalid magic cookie"),
            StunError::TransactionMismatch => {
                write!(f, "response transaction id does not match the request")
            }
            StunError::UnexpectedClass(class) => {
                write!(f, "expected a success response, got class {:?}", class)
            }
            StunError::UnexpectedMethod(method) => {
                write!(f, "expected a Binding response, got method {:?}", method)
            }
            StunError::MissingAddressAttribute => {
                write!(f, "response has no XOR-MAPPED-ADDRESS attribute")
            }
            StunError::UnknownAddressFamily(family) => {
                write!(f, "unknown address family {}", family)
            }
            StunError::Io(err) => write!(f, "transport error: {}", err),
        }
    }
}

impl std::error::Error for StunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StunError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for StunError {
    fn from(err: io::Error) -> Self {
        StunError::Io(err)
    }
}
