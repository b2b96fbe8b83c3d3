mod offline;
mod online;
mod replies;

use std::{net::SocketAddr, time::Instant};

use crate::{
    RaknetError, ServerConfig,
    protocol::{
        ack::{AckKind, AckNackPayload},
        constants::{IP_UDP_HEADER_SIZE, RAKNET_DATAGRAM_HEADER_SIZE},
        datagram::DatagramKind,
        frame::Frame,
        packet::{DecodeError, RaknetPacket, is_offline_packet_id},
        types::{RaknetTime, Sequence24},
    },
    session::{Session, SessionTable},
    transport::{Message, Transmit},
};

use online::Transition;

/// Receiver of application frames from connected peers.
///
/// Closures taking `(&Frame, SocketAddr)` implement this directly.
pub trait Application {
    /// A non-control frame arrived from a connected peer.
    fn on_connected_frame(&mut self, frame: &Frame, peer: SocketAddr);

    fn on_connected(&mut self, _peer: SocketAddr) {}

    /// Only called for peers that reached `Connected`.
    fn on_disconnected(&mut self, _peer: SocketAddr) {}
}

impl<F> Application for F
where
    F: FnMut(&Frame, SocketAddr),
{
    fn on_connected_frame(&mut self, frame: &Frame, peer: SocketAddr) {
        self(frame, peer)
    }
}

/// Single entry point for inbound datagrams.
///
/// Owns the session table. Each call to [`handle_datagram`] runs to
/// completion: it reads the leading tag, routes the datagram to the
/// unconnected handshake, the ack/nack handling or the per-state frame
/// handling, and transmits any replies through `out` before returning.
///
/// [`handle_datagram`]: Dispatcher::handle_datagram
#[derive(Debug)]
pub struct Dispatcher {
    config: ServerConfig,
    sessions: SessionTable,
    started: Instant,
}

impl Dispatcher {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            sessions: SessionTable::new(config.max_retained_frames),
            config,
            started: Instant::now(),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionTable {
        &self.sessions
    }

    pub fn session(&self, peer: &SocketAddr) -> Option<&Session> {
        self.sessions.get(peer)
    }

    /// Process one inbound datagram from `peer`.
    ///
    /// Dropped datagrams are logged here and the reason is returned; the
    /// error never concerns anyone but `peer`.
    pub fn handle_datagram<T, A>(
        &mut self,
        bytes: &[u8],
        peer: SocketAddr,
        out: &mut T,
        app: &mut A,
    ) -> Result<(), RaknetError>
    where
        T: Transmit + ?Sized,
        A: Application + ?Sized,
    {
        let result = self.dispatch(bytes, peer, out, app);
        match &result {
            Ok(()) => {}
            Err(RaknetError::UnknownMessageTag(tag)) => {
                tracing::trace!(peer = %peer, tag = format_args!("0x{:02x}", tag), "unexpected tag dropped");
            }
            Err(e) => {
                tracing::debug!(peer = %peer, len = bytes.len(), error = %e, "datagram dropped");
            }
        }
        result
    }

    fn dispatch<T, A>(
        &mut self,
        bytes: &[u8],
        peer: SocketAddr,
        out: &mut T,
        app: &mut A,
    ) -> Result<(), RaknetError>
    where
        T: Transmit + ?Sized,
        A: Application + ?Sized,
    {
        let Some(&tag) = bytes.first() else {
            return Err(DecodeError::UnexpectedEof.into());
        };
        let kind = DatagramKind::of(tag);

        if kind == DatagramKind::Offline {
            if !is_offline_packet_id(tag) {
                return Err(RaknetError::UnknownMessageTag(tag));
            }
            return offline::handle_offline(bytes, peer, &self.config, &mut self.sessions, out);
        }

        let now = self.uptime();
        let Some(session) = self.sessions.get_mut(&peer) else {
            return Err(RaknetError::UnknownMessageTag(tag));
        };
        session.touch(Instant::now());

        match kind {
            DatagramKind::Ack | DatagramKind::Nack => {
                let mut src = bytes;
                let payload = AckNackPayload::decode(&mut src)?;
                match payload.kind {
                    AckKind::Ack => session.on_ack(&payload.sequences),
                    AckKind::Nack => {
                        session.on_nack(&payload.sequences, out);
                    }
                }
                Ok(())
            }
            DatagramKind::FrameSet => {
                match online::handle_frame_set(session, bytes, now, out, app)? {
                    Transition::Stay => {}
                    Transition::Connected => {
                        tracing::info!(peer = %peer, "session connected");
                        app.on_connected(peer);
                    }
                    Transition::Closed => {
                        self.sessions.remove(&peer, out);
                        app.on_disconnected(peer);
                    }
                }
                Ok(())
            }
            DatagramKind::Offline | DatagramKind::Unknown => {
                Err(RaknetError::UnknownMessageTag(tag))
            }
        }
    }

    /// Send an application message to a connected peer.
    ///
    /// Messages that would not fit the negotiated MTU in a single frame set
    /// are refused, since frames are never split.
    pub fn send<T>(
        &mut self,
        peer: SocketAddr,
        message: impl Into<Message>,
        out: &mut T,
    ) -> Result<Sequence24, RaknetError>
    where
        T: Transmit + ?Sized,
    {
        let message = message.into();
        let session = self
            .sessions
            .get_mut(&peer)
            .ok_or(RaknetError::UnknownSession(peer))?;
        if !session.is_connected() {
            return Err(RaknetError::NotConnected(peer));
        }

        let frame = Frame::new(message.reliability, message.buffer);
        let size = IP_UDP_HEADER_SIZE + RAKNET_DATAGRAM_HEADER_SIZE + frame.encoded_len();
        let mtu = session.mtu_size() as usize;
        if size > mtu || !frame.fits_length_field() {
            return Err(RaknetError::PayloadTooLarge { size, mtu });
        }

        session.send_frame(frame, out)
    }

    /// Tear down the session for `peer`, notifying it first.
    ///
    /// Returns whether a session existed.
    pub fn disconnect<T, A>(&mut self, peer: SocketAddr, out: &mut T, app: &mut A) -> bool
    where
        T: Transmit + ?Sized,
        A: Application + ?Sized,
    {
        self.close(peer, out, app)
    }

    /// Remove every session `predicate` selects, e.g. by
    /// [`Session::last_activity`]. Nothing in the crate calls this; it is the
    /// place to hang an idle timeout policy.
    pub fn sweep<T, A, F>(&mut self, predicate: F, out: &mut T, app: &mut A) -> usize
    where
        T: Transmit + ?Sized,
        A: Application + ?Sized,
        F: FnMut(&Session) -> bool,
    {
        let doomed = self.sessions.select(predicate);
        for peer in &doomed {
            self.close(*peer, out, app);
        }
        doomed.len()
    }

    fn close<T, A>(&mut self, peer: SocketAddr, out: &mut T, app: &mut A) -> bool
    where
        T: Transmit + ?Sized,
        A: Application + ?Sized,
    {
        let was_connected = self.sessions.get(&peer).map(Session::is_connected);
        if self.sessions.remove(&peer, out).is_none() {
            return false;
        }
        if was_connected == Some(true) {
            app.on_disconnected(peer);
        }
        true
    }

    /// Milliseconds since the dispatcher was created, used in pongs.
    fn uptime(&self) -> RaknetTime {
        RaknetTime::from(self.started.elapsed())
    }
}

fn send_packet<T>(out: &mut T, peer: SocketAddr, packet: &RaknetPacket) -> Result<(), RaknetError>
where
    T: Transmit + ?Sized,
{
    tracing::trace!(peer = %peer, id = format_args!("0x{:02x}", packet.id()), "offline reply");
    out.send_datagram(&packet.to_bytes(), peer)?;
    Ok(())
}
