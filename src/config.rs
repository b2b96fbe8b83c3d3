use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};

use bytes::Bytes;

use crate::protocol::{
    constants::{
        DEFAULT_ADVERTISEMENT, DEFAULT_MAX_SESSIONS, DEFAULT_RETAINED_FRAMES,
        DEFAULT_UNCONNECTED_MAGIC, MAXIMUM_MTU_SIZE, MINIMUM_MTU_SIZE, RAKNET_PROTOCOL_VERSION,
    },
    types::Magic,
};

/// Server-side settings shared by the dispatcher and the handshake replies.
///
/// Built with [`ServerConfig::default`] and adjusted with the consuming
/// setters:
///
/// ```
/// use raknet_core::ServerConfig;
///
/// let config = ServerConfig::default()
///     .max_mtu(1200)
///     .advertisement("MCPE;My Server;527;1.19.1;0;10");
/// assert_eq!(config.max_mtu, 1200);
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Identifier sent in every offline reply.
    pub server_guid: u64,
    pub protocol_version: u8,
    /// Upper bound for the MTU negotiated with a peer.
    pub max_mtu: u16,
    /// Sessions beyond this count are refused during the handshake.
    pub max_sessions: usize,
    /// Reliable frame sets kept per session to answer nacks.
    pub max_retained_frames: usize,
    /// Payload of unconnected pongs.
    pub advertisement: Bytes,
    pub magic: Magic,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_guid: random_guid(),
            protocol_version: RAKNET_PROTOCOL_VERSION,
            max_mtu: MAXIMUM_MTU_SIZE,
            max_sessions: DEFAULT_MAX_SESSIONS,
            max_retained_frames: DEFAULT_RETAINED_FRAMES,
            advertisement: Bytes::from_static(DEFAULT_ADVERTISEMENT),
            magic: DEFAULT_UNCONNECTED_MAGIC,
        }
    }
}

impl ServerConfig {
    pub fn server_guid(mut self, guid: u64) -> Self {
        self.server_guid = guid;
        self
    }

    pub fn protocol_version(mut self, version: u8) -> Self {
        self.protocol_version = version;
        self
    }

    /// Clamped into `[MINIMUM_MTU_SIZE, MAXIMUM_MTU_SIZE]`.
    pub fn max_mtu(mut self, mtu: u16) -> Self {
        self.max_mtu = mtu.clamp(MINIMUM_MTU_SIZE, MAXIMUM_MTU_SIZE);
        self
    }

    pub fn max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }

    pub fn max_retained_frames(mut self, max: usize) -> Self {
        self.max_retained_frames = max;
        self
    }

    pub fn advertisement(mut self, advertisement: impl Into<Bytes>) -> Self {
        self.advertisement = advertisement.into();
        self
    }

    pub fn magic(mut self, magic: Magic) -> Self {
        self.magic = magic;
        self
    }

    /// Clamps a peer-proposed MTU into `[MINIMUM_MTU_SIZE, max_mtu]`.
    ///
    /// `max_mtu` itself is held to the protocol bounds here too, since the
    /// field can be set directly.
    pub fn clamp_mtu(&self, requested: usize) -> u16 {
        let ceiling = self.max_mtu.clamp(MINIMUM_MTU_SIZE, MAXIMUM_MTU_SIZE);
        requested.clamp(MINIMUM_MTU_SIZE as usize, ceiling as usize) as u16
    }
}

fn random_guid() -> u64 {
    let mut hasher = RandomState::new().build_hasher();
    hasher.write_u64(std::process::id() as u64);
    hasher.finish()
}
