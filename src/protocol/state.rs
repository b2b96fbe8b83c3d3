/// Lifecycle of a peer session.
///
/// `Unconnected` is never stored: an address without a table row is
/// unconnected. `Closed` is set on a session just before it leaves the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    Unconnected,
    Handshaking,
    Connected,
    Closed,
}

impl SessionState {
    pub fn is_connected(self) -> bool {
        matches!(self, SessionState::Connected)
    }
}
