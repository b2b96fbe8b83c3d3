//! Frame sets from peers that have a session: acknowledgement and the
//! per-state frame handling.

use crate::{
    RaknetError,
    protocol::{
        ack::AckNackPayload,
        datagram::FrameSet,
        frame::Frame,
        packet::{DecodeError, RaknetPacket},
        reliability::Reliability,
        state::SessionState,
        types::RaknetTime,
    },
    session::Session,
    transport::Transmit,
};

use super::{Application, replies};

/// What the dispatcher has to do to the session table afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Transition {
    Stay,
    Connected,
    Closed,
}

pub(super) fn handle_frame_set<T, A>(
    session: &mut Session,
    bytes: &[u8],
    now: RaknetTime,
    out: &mut T,
    app: &mut A,
) -> Result<Transition, RaknetError>
where
    T: Transmit + ?Sized,
    A: Application + ?Sized,
{
    let mut src = bytes;
    let set = FrameSet::decode(&mut src)?;
    let peer = session.address();

    // Every decoded frame set is acked, whatever it carries.
    let ack = AckNackPayload::ack(vec![set.sequence]).to_bytes();
    if let Err(e) = out.send_datagram(&ack, peer) {
        tracing::debug!(peer = %peer, seq = %set.sequence, error = %e, "ack send failed");
    }

    tracing::trace!(
        peer = %peer,
        seq = %set.sequence,
        state = ?session.state(),
        tag = ?set.frame.tag(),
        "frame set received"
    );

    match session.state() {
        SessionState::Handshaking => handshaking(session, set.frame, now, out),
        SessionState::Connected => connected(session, set.frame, now, out, app),
        SessionState::Unconnected | SessionState::Closed => Ok(Transition::Stay),
    }
}

fn decode_control(frame: &Frame) -> Result<RaknetPacket, RaknetError> {
    let mut body = frame.body.clone();
    match RaknetPacket::decode(&mut body) {
        Ok(packet) => Ok(packet),
        Err(DecodeError::UnknownId(id)) => Err(RaknetError::UnknownMessageTag(id)),
        Err(e) => Err(e.into()),
    }
}

fn handshaking<T>(
    session: &mut Session,
    frame: Frame,
    now: RaknetTime,
    out: &mut T,
) -> Result<Transition, RaknetError>
where
    T: Transmit + ?Sized,
{
    match decode_control(&frame)? {
        RaknetPacket::ConnectionRequest(request) => {
            let reply = replies::connection_request_accepted(session.address(), &request, now);
            session.send_frame(Frame::new(Reliability::Reliable, reply.to_bytes()), out)?;
            tracing::debug!(peer = %session.address(), guid = request.client_guid, "connection request accepted");
            Ok(Transition::Stay)
        }
        RaknetPacket::NewIncomingConnection(_) => {
            session.set_state(SessionState::Connected);
            Ok(Transition::Connected)
        }
        other => Err(RaknetError::UnknownMessageTag(other.id())),
    }
}

fn connected<T, A>(
    session: &mut Session,
    frame: Frame,
    now: RaknetTime,
    out: &mut T,
    app: &mut A,
) -> Result<Transition, RaknetError>
where
    T: Transmit + ?Sized,
    A: Application + ?Sized,
{
    let packet = match decode_control(&frame) {
        // IDs the registry does not know belong to the application.
        Err(RaknetError::UnknownMessageTag(_)) => {
            app.on_connected_frame(&frame, session.address());
            return Ok(Transition::Stay);
        }
        other => other?,
    };

    match packet {
        RaknetPacket::ConnectedPing(ping) => {
            let pong = replies::connected_pong(&ping, now);
            session.send_frame(Frame::new(Reliability::Reliable, pong.to_bytes()), out)?;
            Ok(Transition::Stay)
        }
        RaknetPacket::DisconnectNotification(_) => Ok(Transition::Closed),
        RaknetPacket::UserData { .. } => {
            app.on_connected_frame(&frame, session.address());
            Ok(Transition::Stay)
        }
        other => Err(RaknetError::UnknownMessageTag(other.id())),
    }
}
