//! Datagrams without a frame set envelope: discovery pings and the two
//! open connection requests.

use std::net::SocketAddr;

use crate::{
    RaknetError, ServerConfig,
    protocol::{
        packet::{DecodeError, OpenConnectionRequest2, RaknetPacket},
        state::SessionState,
        types::Magic,
    },
    session::SessionTable,
    transport::Transmit,
};

use super::{replies, send_packet};

pub(super) fn handle_offline<T>(
    bytes: &[u8],
    peer: SocketAddr,
    config: &ServerConfig,
    sessions: &mut SessionTable,
    out: &mut T,
) -> Result<(), RaknetError>
where
    T: Transmit + ?Sized,
{
    let mut src = bytes;
    match RaknetPacket::decode(&mut src)? {
        RaknetPacket::UnconnectedPing(ping) => {
            check_magic(config, &ping.magic)?;
            send_packet(out, peer, &replies::unconnected_pong(config, ping.ping_time))
        }
        RaknetPacket::UnconnectedPingOpenConnections(ping) => {
            check_magic(config, &ping.magic)?;
            if sessions.len() >= config.max_sessions {
                tracing::trace!(peer = %peer, "open connections ping ignored, server full");
                return Ok(());
            }
            send_packet(out, peer, &replies::unconnected_pong(config, ping.ping_time))
        }
        RaknetPacket::OpenConnectionRequest1(request) => {
            check_magic(config, &request.magic)?;
            tracing::debug!(
                peer = %peer,
                protocol = request.protocol_version,
                len = request.datagram_len(),
                "open connection request 1"
            );
            send_packet(out, peer, &replies::open_connection_reply_1(config, &request))
        }
        RaknetPacket::OpenConnectionRequest2(request) => {
            check_magic(config, &request.magic)?;
            open_connection_request_2(&request, peer, config, sessions, out)
        }
        other => Err(RaknetError::UnknownMessageTag(other.id())),
    }
}

/// The only path that creates a session.
fn open_connection_request_2<T>(
    request: &OpenConnectionRequest2,
    peer: SocketAddr,
    config: &ServerConfig,
    sessions: &mut SessionTable,
    out: &mut T,
) -> Result<(), RaknetError>
where
    T: Transmit + ?Sized,
{
    if let Some(session) = sessions.get(&peer) {
        tracing::debug!(peer = %peer, state = ?session.state(), "repeated open connection request 2");
        let reply = match session.state() {
            SessionState::Handshaking => {
                replies::open_connection_reply_2(config, peer, session.mtu_size())
            }
            _ => replies::already_connected(config),
        };
        return send_packet(out, peer, &reply);
    }

    if sessions.len() >= config.max_sessions {
        tracing::debug!(peer = %peer, sessions = sessions.len(), "refusing session, server full");
        return send_packet(out, peer, &replies::no_free_incoming_connections(config));
    }

    let mtu = config.clamp_mtu(request.mtu as usize);
    let session = sessions.create(peer)?;
    session.set_mtu_size(mtu);
    session.set_client_guid(request.client_guid);
    tracing::debug!(peer = %peer, mtu, guid = request.client_guid, "open connection request 2");

    send_packet(out, peer, &replies::open_connection_reply_2(config, peer, mtu))
}

fn check_magic(config: &ServerConfig, magic: &Magic) -> Result<(), DecodeError> {
    if *magic == config.magic {
        Ok(())
    } else {
        Err(DecodeError::InvalidMagic)
    }
}
