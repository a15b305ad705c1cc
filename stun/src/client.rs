//! STUN client for discovering the reflexive address with a single
//! Binding transaction.

use crate::error::StunError;
use crate::message::{Class, Method, StunMessage};
use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

/// Largest datagram the client accepts. Binding responses are far smaller.
const MAX_DATAGRAM_SIZE: usize = 4096;

const DEFAULT_SERVER: &str = "stun.l.google.com:19302";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// One-shot UDP exchange: a socket scoped to this call, one send, one
/// blocking receive. Without a timeout a silent server blocks forever;
/// the deadline, when given, is imposed on the socket before the receive.
fn exchange(
    request: &[u8],
    server: SocketAddr,
    timeout: Option<Duration>,
) -> Result<Vec<u8>, StunError> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.set_read_timeout(timeout)?;
    socket.send_to(request, server)?;

    let mut buf = [0u8; MAX_DATAGRAM_SIZE];
    let (len, _) = socket.recv_from(&mut buf)?;
    Ok(buf[..len].to_vec())
}

/// STUN client to send Binding Requests. Each query owns its own socket
/// and transaction id, so independent callers do not interfere.
pub struct StunClient {
    pub default_server: String,
    pub timeout: Option<Duration>,
}

impl StunClient {
    /// Build a client pointing to the default public server.
    pub fn new() -> Self {
        StunClient {
            default_server: DEFAULT_SERVER.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// Allows specifying a STUN server other than the default one.
    pub fn with_server(server: String) -> Self {
        StunClient {
            default_server: server,
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// Discover the public address using the default server.
    pub fn discover(&self) -> Result<SocketAddr, StunError> {
        self.discover_with(&self.default_server)
    }

    /// Runs one Binding transaction against `server` and returns the
    /// address the server saw the request come from.
    pub fn discover_with(&self, server: &str) -> Result<SocketAddr, StunError> {
        let request = StunMessage::binding_request();

        let resolved = server
            .to_socket_addrs()?
            .find(|addr| addr.is_ipv4())
            .ok_or_else(|| {
                io::Error::other("no IPv4 address found for STUN server")
            })?;

        let response = exchange(&request.encode(), resolved, self.timeout)?;
        let message = StunMessage::decode(&response)?;

        if message.transaction_id != request.transaction_id {
            return Err(StunError::TransactionMismatch);
        }
        if message.class != Class::SuccessResponse {
            return Err(StunError::UnexpectedClass(message.class));
        }
        if message.method != Method::Binding {
            return Err(StunError::UnexpectedMethod(message.method));
        }

        message
            .xor_mapped_address()
            .ok_or(StunError::MissingAddressAttribute)
    }

    /// Try servers in order until one answers with a usable address.
    pub fn discover_multiple(&self, servers: &[String]) -> Result<SocketAddr, StunError> {
        let mut last = StunError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            "no STUN server configured",
        ));
        for server in servers {
            match self.discover_with(server) {
                Ok(addr) => return Ok(addr),
                Err(err) => last = err,
            }
        }
        Err(last)
    }
}

impl Default for StunClient {
    /// Equivalent to calling [`StunClient::new`].
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::thread;

    /// Mock server answering exactly one Binding Request, rewriting the
    /// transaction id through `respond`.
    fn spawn_mock_server(
        respond: impl FnOnce([u8; 12], SocketAddr) -> Vec<u8> + Send + 'static,
    ) -> SocketAddr {
        let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).expect("bind mock server");
        let server_addr = socket.local_addr().expect("local addr");

        thread::spawn(move || {
            let mut buf = [0u8; MAX_DATAGRAM_SIZE];
            let (len, src) = socket.recv_from(&mut buf).expect("receive request");
            let request = StunMessage::decode(&buf[..len]).expect("well formed request");
            assert_eq!(request.class, Class::Request);
            assert_eq!(request.method, Method::Binding);

            let reply = respond(request.transaction_id, src);
            socket.send_to(&reply, src).expect("send response");
        });

        server_addr
    }

    fn test_client(server: SocketAddr) -> StunClient {
        let mut client = StunClient::with_server(server.to_string());
        client.timeout = Some(Duration::from_secs(2));
        client
    }

    #[test]
    fn test_discover_against_mock_server() {
        let server = spawn_mock_server(|transaction_id, src| {
            StunMessage::binding_success(transaction_id, src).encode()
        });

        let addr = test_client(server).discover().expect("discovery succeeds");
        assert_eq!(addr.ip(), Ipv4Addr::LOCALHOST);
        assert_ne!(addr.port(), 0);
    }

    #[test]
    fn test_discover_rejects_foreign_transaction_id() {
        let server = spawn_mock_server(|_, src| {
            StunMessage::binding_success([0xFF; 12], src).encode()
        });

        let result = test_client(server).discover();
        assert!(matches!(result, Err(StunError::TransactionMismatch)));
    }

    #[test]
    fn test_discover_rejects_error_response() {
        let server = spawn_mock_server(|transaction_id, src| {
            let mut reply = StunMessage::binding_success(transaction_id, src);
            reply.class = Class::ErrorResponse;
            reply.encode()
        });

        let result = test_client(server).discover();
        assert!(matches!(
            result,
            Err(StunError::UnexpectedClass(Class::ErrorResponse))
        ));
    }

    #[test]
    fn test_discover_requires_address_attribute() {
        let server = spawn_mock_server(|transaction_id, _| {
            let mut reply = StunMessage::binding_request();
            reply.class = Class::SuccessResponse;
            reply.transaction_id = transaction_id;
            reply.encode()
        });

        let result = test_client(server).discover();
        assert!(matches!(result, Err(StunError::MissingAddressAttribute)));
    }

    #[test]
    fn test_timeout_on_silent_server() {
        // a bound socket that never answers
        let silent = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).expect("bind silent server");
        let server = silent.local_addr().expect("local addr");

        let mut client = StunClient::with_server(server.to_string());
        client.timeout = Some(Duration::from_millis(200));

        let result = client.discover();
        assert!(matches!(result, Err(StunError::Io(_))));
    }
}
