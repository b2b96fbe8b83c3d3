use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::utils::define_raknet_packets;
use super::*;

define_raknet_packets! {
    ConnectedPing,
    UnconnectedPing,
    UnconnectedPingOpenConnections,
    ConnectedPong,
    OpenConnectionRequest1,
    OpenConnectionReply1,
    OpenConnectionRequest2,
    OpenConnectionReply2,
    ConnectionRequest,
    ConnectionRequestAccepted,
    AlreadyConnected,
    NewIncomingConnection,
    NoFreeIncomingConnections,
    DisconnectNotification,
    IncompatibleProtocolVersion,
    UnconnectedPong,
}

impl RaknetPacket {
    /// Encode the packet, ID byte included, into a fresh buffer.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.encode(&mut buf);
        buf.freeze()
    }
}
