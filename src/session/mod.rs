//! Per-peer session state.
//!
//! A [`Session`] carries the handshake state, the negotiated MTU and the
//! reliability bookkeeping for one remote address. Outgoing frames go through
//! [`Session::send_frame`]; incoming acks and nacks through
//! [`Session::on_ack`] and [`Session::on_nack`]. Sessions live in a
//! [`SessionTable`].

use std::{
    collections::{HashMap, VecDeque},
    net::SocketAddr,
    time::Instant,
};

use bytes::Bytes;

use crate::protocol::{state::SessionState, types::Sequence24};

mod inbound;
mod outbound;
mod table;

pub use table::SessionTable;

#[derive(Debug)]
pub struct Session {
    address: SocketAddr,
    mtu_size: u16,
    state: SessionState,
    client_guid: u64,

    next_sequence_number: Sequence24,
    next_reliable_index: Sequence24,
    next_order_index: Sequence24,
    next_sequenced_index: Sequence24,

    /// Encoded reliable frame sets kept to answer nacks.
    sent_frames: HashMap<Sequence24, Bytes>,
    /// Keys of `sent_frames` in send order, oldest first.
    sent_order: VecDeque<Sequence24>,
    max_retained_frames: usize,

    created_at: Instant,
    last_activity: Instant,
}

impl Session {
    pub fn new(address: SocketAddr, max_retained_frames: usize) -> Self {
        let now = Instant::now();
        Self {
            address,
            mtu_size: 0,
            state: SessionState::Handshaking,
            client_guid: 0,
            next_sequence_number: Sequence24::new(0),
            next_reliable_index: Sequence24::new(0),
            next_order_index: Sequence24::new(0),
            next_sequenced_index: Sequence24::new(0),
            sent_frames: HashMap::new(),
            sent_order: VecDeque::new(),
            max_retained_frames,
            created_at: now,
            last_activity: now,
        }
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Negotiated MTU, 0 until the open connection exchange sets it.
    pub fn mtu_size(&self) -> u16 {
        self.mtu_size
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn client_guid(&self) -> u64 {
        self.client_guid
    }

    /// Sequence number the next frame set will be sent under.
    pub fn next_sequence_number(&self) -> Sequence24 {
        self.next_sequence_number
    }

    /// Sequence numbers still retained for retransmission, oldest first.
    pub fn retained_sequences(&self) -> impl Iterator<Item = Sequence24> + '_ {
        self.sent_order.iter().copied()
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Time the last datagram from this peer was processed.
    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    pub(crate) fn set_mtu_size(&mut self, mtu: u16) {
        self.mtu_size = mtu;
    }

    pub(crate) fn set_client_guid(&mut self, guid: u64) {
        self.client_guid = guid;
    }

    pub(crate) fn set_state(&mut self, state: SessionState) {
        tracing::trace!(peer = %self.address, from = ?self.state, to = ?state, "session state");
        self.state = state;
    }

    pub(crate) fn touch(&mut self, now: Instant) {
        self.last_activity = now;
    }
}
