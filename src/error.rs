use std::net::SocketAddr;

use thiserror::Error;

use crate::protocol::packet::DecodeError;

/// Errors surfaced by the dispatcher, session table and application API.
///
/// None of these ever escape the listener receive loop; they are logged and
/// the offending datagram is dropped.
#[derive(Error, Debug)]
pub enum RaknetError {
    /// Truncated or otherwise invalid wire bytes.
    #[error("malformed packet: {0}")]
    MalformedPacket(#[from] DecodeError),

    /// A session was about to be created for an address that already has one.
    #[error("a session already exists for {0}")]
    DuplicateSession(SocketAddr),

    /// The leading tag byte is not accepted in the current state.
    #[error("unknown message tag 0x{0:02x}")]
    UnknownMessageTag(u8),

    #[error("no session exists for {0}")]
    UnknownSession(SocketAddr),

    #[error("session for {0} has not completed the handshake")]
    NotConnected(SocketAddr),

    /// The message does not fit the negotiated MTU in one frame set.
    #[error("{size} byte datagram exceeds the session MTU of {mtu}")]
    PayloadTooLarge { size: usize, mtu: usize },

    /// A frame body longer than its 16-bit bit-length field can describe.
    #[error("frame body of {0} bytes exceeds the 8191 byte limit")]
    FrameTooLarge(usize),

    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
}
