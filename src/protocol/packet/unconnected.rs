//! Unconnected (offline) RakNet discovery and ping packets.

use bytes::{Buf, BufMut};

use crate::protocol::{
    packet::{DecodeError, Packet, RaknetEncodable},
    types::{Advertisement, Magic, RaknetTime},
};

/// Unconnected ping used by clients to discover RakNet servers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnconnectedPing {
    pub ping_time: RaknetTime,
    pub magic: Magic,
    pub client_guid: u64,
}

impl Packet for UnconnectedPing {
    const ID: u8 = 0x01;

    fn encode_body(&self, dst: &mut impl BufMut) {
        self.ping_time.encode_raknet(dst);
        self.magic.encode_raknet(dst);
        self.client_guid.encode_raknet(dst);
    }

    fn decode_body(src: &mut impl Buf) -> Result<Self, DecodeError> {
        Ok(Self {
            ping_time: RaknetTime::decode_raknet(src)?,
            magic: Magic::decode_raknet(src)?,
            client_guid: u64::decode_raknet(src)?,
        })
    }
}

/// Ping that only expects an answer while the server accepts connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnconnectedPingOpenConnections {
    pub ping_time: RaknetTime,
    pub magic: Magic,
    pub client_guid: u64,
}

impl Packet for UnconnectedPingOpenConnections {
    const ID: u8 = 0x02;

    fn encode_body(&self, dst: &mut impl BufMut) {
        self.ping_time.encode_raknet(dst);
        self.magic.encode_raknet(dst);
        self.client_guid.encode_raknet(dst);
    }

    fn decode_body(src: &mut impl Buf) -> Result<Self, DecodeError> {
        Ok(Self {
            ping_time: RaknetTime::decode_raknet(src)?,
            magic: Magic::decode_raknet(src)?,
            client_guid: u64::decode_raknet(src)?,
        })
    }
}

/// Unconnected pong sent by servers in response to either ping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnconnectedPong {
    pub ping_time: RaknetTime,
    pub server_guid: u64,
    pub magic: Magic,
    pub advertisement: Advertisement,
}

impl Packet for UnconnectedPong {
    const ID: u8 = 0x1c;

    fn encode_body(&self, dst: &mut impl BufMut) {
        self.ping_time.encode_raknet(dst);
        self.server_guid.encode_raknet(dst);
        self.magic.encode_raknet(dst);
        self.advertisement.encode_raknet(dst);
    }

    fn decode_body(src: &mut impl Buf) -> Result<Self, DecodeError> {
        Ok(Self {
            ping_time: RaknetTime::decode_raknet(src)?,
            server_guid: u64::decode_raknet(src)?,
            magic: Magic::decode_raknet(src)?,
            advertisement: Advertisement::decode_raknet(src)?,
        })
    }
}
