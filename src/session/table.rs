use std::{collections::HashMap, net::SocketAddr};

use crate::{
    RaknetError,
    protocol::{
        frame::Frame,
        packet::{DisconnectNotification, RaknetPacket},
        reliability::Reliability,
        state::SessionState,
    },
    transport::Transmit,
};

use super::Session;

/// Sessions keyed by peer address.
///
/// The table is owned by the dispatcher and handed explicitly to whatever
/// needs it; there is no global session map.
#[derive(Debug)]
pub struct SessionTable {
    sessions: HashMap<SocketAddr, Session>,
    max_retained_frames: usize,
}

impl SessionTable {
    pub fn new(max_retained_frames: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            max_retained_frames,
        }
    }

    /// Insert a fresh `Handshaking` session for `address`.
    ///
    /// Fails with [`RaknetError::DuplicateSession`] instead of replacing an
    /// existing session.
    pub fn create(&mut self, address: SocketAddr) -> Result<&mut Session, RaknetError> {
        use std::collections::hash_map::Entry;

        match self.sessions.entry(address) {
            Entry::Occupied(_) => Err(RaknetError::DuplicateSession(address)),
            Entry::Vacant(slot) => {
                tracing::info!(peer = %address, "session created");
                Ok(slot.insert(Session::new(address, self.max_retained_frames)))
            }
        }
    }

    pub fn get(&self, address: &SocketAddr) -> Option<&Session> {
        self.sessions.get(address)
    }

    pub fn get_mut(&mut self, address: &SocketAddr) -> Option<&mut Session> {
        self.sessions.get_mut(address)
    }

    pub fn contains(&self, address: &SocketAddr) -> bool {
        self.sessions.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    /// Tear down the session for `address`, if any.
    ///
    /// A final unreliable frame set carrying a disconnect notification is
    /// sent to the peer first; a failed send does not stop the removal.
    /// Removing an absent address is a no-op returning `None`.
    pub fn remove<T>(&mut self, address: &SocketAddr, out: &mut T) -> Option<Session>
    where
        T: Transmit + ?Sized,
    {
        let mut session = self.sessions.remove(address)?;

        let notice = RaknetPacket::from(DisconnectNotification).to_bytes();
        if let Err(e) = session.send_frame(Frame::new(Reliability::Unreliable, notice), out) {
            tracing::debug!(peer = %address, error = %e, "disconnect notice not sent");
        }
        session.set_state(SessionState::Closed);

        tracing::info!(peer = %address, "session closed");
        Some(session)
    }

    /// Addresses of every session matching `predicate`.
    pub fn select<F>(&self, mut predicate: F) -> Vec<SocketAddr>
    where
        F: FnMut(&Session) -> bool,
    {
        self.sessions
            .values()
            .filter(|session| predicate(session))
            .map(Session::address)
            .collect()
    }
}
