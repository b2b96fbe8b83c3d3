use std::net::SocketAddr;

use bytes::{Buf, BufMut};

use crate::protocol::{
    packet::{DecodeError, Packet, RaknetEncodable},
    types::{EoBPadding, Magic, RaknetTime},
};

/// First offline handshake request. The padding length measures the path MTU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenConnectionRequest1 {
    pub magic: Magic,
    pub protocol_version: u8,
    pub padding: EoBPadding,
}

impl OpenConnectionRequest1 {
    /// Size of the whole datagram this request arrived in, ID byte included.
    pub fn datagram_len(&self) -> usize {
        1 + 16 + 1 + self.padding.0
    }
}

impl Packet for OpenConnectionRequest1 {
    const ID: u8 = 0x05;

    fn encode_body(&self, dst: &mut impl BufMut) {
        self.magic.encode_raknet(dst);
        self.protocol_version.encode_raknet(dst);
        self.padding.encode_raknet(dst);
    }

    fn decode_body(src: &mut impl Buf) -> Result<Self, DecodeError> {
        Ok(Self {
            magic: Magic::decode_raknet(src)?,
            protocol_version: u8::decode_raknet(src)?,
            padding: EoBPadding::decode_raknet(src)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenConnectionReply1 {
    pub magic: Magic,
    pub server_guid: u64,
    pub cookie: Option<u32>,
    pub mtu: u16,
}

impl Packet for OpenConnectionReply1 {
    const ID: u8 = 0x06;

    fn encode_body(&self, dst: &mut impl BufMut) {
        self.magic.encode_raknet(dst);
        self.server_guid.encode_raknet(dst);
        self.cookie.is_some().encode_raknet(dst); // security bool
        if let Some(cookie) = self.cookie {
            cookie.encode_raknet(dst);
        }
        self.mtu.encode_raknet(dst);
    }

    fn decode_body(src: &mut impl Buf) -> Result<Self, DecodeError> {
        Ok(Self {
            magic: Magic::decode_raknet(src)?,
            server_guid: u64::decode_raknet(src)?,
            cookie: if u8::decode_raknet(src)? != 0 {
                Some(u32::decode_raknet(src)?)
            } else {
                None
            },
            mtu: u16::decode_raknet(src)?,
        })
    }
}

/// Second offline handshake request.
///
/// The server never sets a cookie in reply 1, so the request always has the
/// cookie-less layout: server address, MTU, client GUID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenConnectionRequest2 {
    pub magic: Magic,
    pub server_addr: SocketAddr,
    pub mtu: u16,
    pub client_guid: u64,
}

impl Packet for OpenConnectionRequest2 {
    const ID: u8 = 0x07;

    fn encode_body(&self, dst: &mut impl BufMut) {
        self.magic.encode_raknet(dst);
        self.server_addr.encode_raknet(dst);
        self.mtu.encode_raknet(dst);
        self.client_guid.encode_raknet(dst);
    }

    fn decode_body(src: &mut impl Buf) -> Result<Self, DecodeError> {
        Ok(Self {
            magic: Magic::decode_raknet(src)?,
            server_addr: SocketAddr::decode_raknet(src)?,
            mtu: u16::decode_raknet(src)?,
            client_guid: u64::decode_raknet(src)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenConnectionReply2 {
    pub magic: Magic,
    pub server_guid: u64,
    pub client_addr: SocketAddr,
    pub mtu: u16,
    pub security: bool,
}

impl Packet for OpenConnectionReply2 {
    const ID: u8 = 0x08;

    fn encode_body(&self, dst: &mut impl BufMut) {
        self.magic.encode_raknet(dst);
        self.server_guid.encode_raknet(dst);
        self.client_addr.encode_raknet(dst);
        self.mtu.encode_raknet(dst);
        self.security.encode_raknet(dst);
    }

    fn decode_body(src: &mut impl Buf) -> Result<Self, DecodeError> {
        Ok(Self {
            magic: Magic::decode_raknet(src)?,
            server_guid: u64::decode_raknet(src)?,
            client_addr: SocketAddr::decode_raknet(src)?,
            mtu: u16::decode_raknet(src)?,
            security: bool::decode_raknet(src)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompatibleProtocolVersion {
    pub protocol: u8,
    pub magic: Magic,
    pub server_guid: u64,
}

impl Packet for IncompatibleProtocolVersion {
    const ID: u8 = 0x19;

    fn encode_body(&self, dst: &mut impl BufMut) {
        self.protocol.encode_raknet(dst);
        self.magic.encode_raknet(dst);
        self.server_guid.encode_raknet(dst);
    }

    fn decode_body(src: &mut impl Buf) -> Result<Self, DecodeError> {
        Ok(Self {
            protocol: u8::decode_raknet(src)?,
            magic: Magic::decode_raknet(src)?,
            server_guid: u64::decode_raknet(src)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlreadyConnected {
    pub magic: Magic,
    pub server_guid: u64,
}

impl Packet for AlreadyConnected {
    const ID: u8 = 0x12;

    fn encode_body(&self, dst: &mut impl BufMut) {
        self.magic.encode_raknet(dst);
        self.server_guid.encode_raknet(dst);
    }

    fn decode_body(src: &mut impl Buf) -> Result<Self, DecodeError> {
        Ok(Self {
            magic: Magic::decode_raknet(src)?,
            server_guid: u64::decode_raknet(src)?,
        })
    }
}

/// Sent instead of reply 2 when the session table is full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoFreeIncomingConnections {
    pub magic: Magic,
    pub server_guid: u64,
}

impl Packet for NoFreeIncomingConnections {
    const ID: u8 = 0x14;

    fn encode_body(&self, dst: &mut impl BufMut) {
        self.magic.encode_raknet(dst);
        self.server_guid.encode_raknet(dst);
    }

    fn decode_body(src: &mut impl Buf) -> Result<Self, DecodeError> {
        Ok(Self {
            magic: Magic::decode_raknet(src)?,
            server_guid: u64::decode_raknet(src)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRequest {
    pub client_guid: u64,
    pub timestamp: RaknetTime,
    pub secure: bool,
}

impl Packet for ConnectionRequest {
    const ID: u8 = 0x09;

    fn encode_body(&self, dst: &mut impl BufMut) {
        self.client_guid.encode_raknet(dst);
        self.timestamp.encode_raknet(dst);
        self.secure.encode_raknet(dst);
    }

    fn decode_body(src: &mut impl Buf) -> Result<Self, DecodeError> {
        Ok(Self {
            client_guid: u64::decode_raknet(src)?,
            timestamp: RaknetTime::decode_raknet(src)?,
            secure: bool::decode_raknet(src)?,
        })
    }
}

/// Reads internal addresses until only the two trailing timestamps remain.
///
/// Vanilla RakNet sends 10 addresses, Bedrock sends 20.
fn decode_system_addresses(src: &mut impl Buf) -> Result<Vec<SocketAddr>, DecodeError> {
    let mut addresses = Vec::new();
    while src.remaining() > 16 {
        addresses.push(SocketAddr::decode_raknet(src)?);
    }
    Ok(addresses)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRequestAccepted {
    pub client_addr: SocketAddr,
    pub system_index: u16,
    pub system_addresses: Vec<SocketAddr>,
    pub request_timestamp: RaknetTime,
    pub accepted_timestamp: RaknetTime,
}

impl Packet for ConnectionRequestAccepted {
    const ID: u8 = 0x10;

    fn encode_body(&self, dst: &mut impl BufMut) {
        self.client_addr.encode_raknet(dst);
        self.system_index.encode_raknet(dst);

        for address in &self.system_addresses {
            address.encode_raknet(dst);
        }

        self.request_timestamp.encode_raknet(dst);
        self.accepted_timestamp.encode_raknet(dst);
    }

    fn decode_body(src: &mut impl Buf) -> Result<Self, DecodeError> {
        let client_addr = SocketAddr::decode_raknet(src)?;
        let system_index = u16::decode_raknet(src)?;
        let system_addresses = decode_system_addresses(src)?;
        let request_timestamp = RaknetTime::decode_raknet(src)?;
        let accepted_timestamp = RaknetTime::decode_raknet(src)?;

        Ok(Self {
            client_addr,
            system_index,
            system_addresses,
            request_timestamp,
            accepted_timestamp,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIncomingConnection {
    pub server_addr: SocketAddr,
    pub system_addresses: Vec<SocketAddr>,
    pub request_timestamp: RaknetTime,
    pub accepted_timestamp: RaknetTime,
}

impl Packet for NewIncomingConnection {
    const ID: u8 = 0x13;

    fn encode_body(&self, dst: &mut impl BufMut) {
        self.server_addr.encode_raknet(dst);
        for address in &self.system_addresses {
            address.encode_raknet(dst);
        }
        self.request_timestamp.encode_raknet(dst);
        self.accepted_timestamp.encode_raknet(dst);
    }

    fn decode_body(src: &mut impl Buf) -> Result<Self, DecodeError> {
        let server_addr = SocketAddr::decode_raknet(src)?;
        let system_addresses = decode_system_addresses(src)?;
        let request_timestamp = RaknetTime::decode_raknet(src)?;
        let accepted_timestamp = RaknetTime::decode_raknet(src)?;
        Ok(Self {
            server_addr,
            system_addresses,
            request_timestamp,
            accepted_timestamp,
        })
    }
}
