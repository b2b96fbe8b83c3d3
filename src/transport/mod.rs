//! Datagram dispatch and the Tokio based UDP transport.
//!
//! - [`Dispatcher`] is the synchronous entry point for every inbound
//!   datagram: it owns the session table and drives the handshake.
//! - [`RaknetListener`] binds a UDP socket and feeds the dispatcher one
//!   datagram at a time.
//! - [`Transmit`] is the only way the core puts bytes on the wire, so the
//!   whole state machine runs against a recording sink in tests.

use bytes::Bytes;
use std::{io, net::SocketAddr};

use crate::protocol::reliability::Reliability;

mod dispatcher;
pub mod listener;

pub use dispatcher::{Application, Dispatcher};
pub use listener::RaknetListener;

/// Sends one datagram to one peer.
///
/// Every call is a single synchronous transmission; implementations must not
/// buffer or batch.
pub trait Transmit {
    fn send_datagram(&mut self, payload: &[u8], peer: SocketAddr) -> io::Result<()>;
}

impl Transmit for tokio::net::UdpSocket {
    fn send_datagram(&mut self, payload: &[u8], peer: SocketAddr) -> io::Result<()> {
        self.try_send_to(payload, peer).map(|_| ())
    }
}

impl Transmit for std::net::UdpSocket {
    fn send_datagram(&mut self, payload: &[u8], peer: SocketAddr) -> io::Result<()> {
        self.send_to(payload, peer).map(|_| ())
    }
}

/// Records datagrams instead of sending them.
impl Transmit for Vec<(SocketAddr, Bytes)> {
    fn send_datagram(&mut self, payload: &[u8], peer: SocketAddr) -> io::Result<()> {
        self.push((peer, Bytes::copy_from_slice(payload)));
        Ok(())
    }
}

/// High-level message object for sending data to a connected peer.
#[derive(Debug, Clone)]
pub struct Message {
    pub buffer: Bytes,
    pub reliability: Reliability,
}

impl Message {
    pub fn new(buffer: impl Into<Bytes>) -> Self {
        Self {
            buffer: buffer.into(),
            reliability: Reliability::ReliableOrdered,
        }
    }

    pub fn reliability(mut self, reliability: Reliability) -> Self {
        self.reliability = reliability;
        self
    }
}

impl From<Bytes> for Message {
    fn from(buffer: Bytes) -> Self {
        Self::new(buffer)
    }
}

impl From<Vec<u8>> for Message {
    fn from(vec: Vec<u8>) -> Self {
        Self::new(vec)
    }
}

impl From<&'static [u8]> for Message {
    fn from(slice: &'static [u8]) -> Self {
        Self::new(Bytes::from(slice))
    }
}
