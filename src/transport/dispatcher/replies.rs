//! Builders for the handshake replies.
//!
//! Pure functions from the request (and server settings) to the reply packet;
//! the dispatcher decides when to send them.

use std::net::SocketAddr;

use crate::{
    ServerConfig,
    protocol::{
        constants::{IP_UDP_HEADER_SIZE, LOCAL_IP_ADDRESSES},
        packet::{
            AlreadyConnected, ConnectedPing, ConnectedPong, ConnectionRequest,
            ConnectionRequestAccepted, IncompatibleProtocolVersion, NoFreeIncomingConnections,
            OpenConnectionReply1, OpenConnectionReply2, OpenConnectionRequest1, RaknetPacket,
            UnconnectedPong,
        },
        types::{Advertisement, RaknetTime},
    },
};

pub(crate) fn unconnected_pong(config: &ServerConfig, ping_time: RaknetTime) -> RaknetPacket {
    UnconnectedPong {
        ping_time,
        server_guid: config.server_guid,
        magic: config.magic,
        advertisement: Advertisement(Some(config.advertisement.clone())),
    }
    .into()
}

/// Reply 1, or the version mismatch notice when the peer speaks another
/// protocol version.
pub(crate) fn open_connection_reply_1(
    config: &ServerConfig,
    request: &OpenConnectionRequest1,
) -> RaknetPacket {
    if request.protocol_version != config.protocol_version {
        return IncompatibleProtocolVersion {
            protocol: config.protocol_version,
            magic: config.magic,
            server_guid: config.server_guid,
        }
        .into();
    }

    OpenConnectionReply1 {
        magic: config.magic,
        server_guid: config.server_guid,
        cookie: None,
        mtu: config.clamp_mtu(request.datagram_len() + IP_UDP_HEADER_SIZE),
    }
    .into()
}

pub(crate) fn open_connection_reply_2(
    config: &ServerConfig,
    peer: SocketAddr,
    mtu: u16,
) -> RaknetPacket {
    OpenConnectionReply2 {
        magic: config.magic,
        server_guid: config.server_guid,
        client_addr: peer,
        mtu,
        security: false,
    }
    .into()
}

pub(crate) fn already_connected(config: &ServerConfig) -> RaknetPacket {
    AlreadyConnected {
        magic: config.magic,
        server_guid: config.server_guid,
    }
    .into()
}

pub(crate) fn no_free_incoming_connections(config: &ServerConfig) -> RaknetPacket {
    NoFreeIncomingConnections {
        magic: config.magic,
        server_guid: config.server_guid,
    }
    .into()
}

pub(crate) fn connection_request_accepted(
    peer: SocketAddr,
    request: &ConnectionRequest,
    now: RaknetTime,
) -> RaknetPacket {
    ConnectionRequestAccepted {
        client_addr: peer,
        system_index: 0,
        system_addresses: LOCAL_IP_ADDRESSES.to_vec(),
        request_timestamp: request.timestamp,
        accepted_timestamp: now,
    }
    .into()
}

pub(crate) fn connected_pong(ping: &ConnectedPing, now: RaknetTime) -> RaknetPacket {
    ConnectedPong {
        ping_time: ping.ping_time,
        pong_time: now,
    }
    .into()
}
