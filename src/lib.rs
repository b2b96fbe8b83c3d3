//! Reliable frame transport and connection handshake for RakNet.
//!
//! The crate turns raw UDP datagrams into acknowledged frame sets and drives
//! the offline handshake that upgrades an anonymous peer into a tracked
//! session:
//!
//! - [`protocol`] holds the wire codecs (frame sets, acks, control packets).
//! - [`session`] holds per-peer state, the reliability sender and the
//!   session table.
//! - [`transport`] holds the [`Dispatcher`](transport::Dispatcher) that
//!   demultiplexes inbound datagrams and the Tokio based
//!   [`RaknetListener`](transport::RaknetListener).

pub mod config;
mod error;
pub mod protocol;
pub mod session;
pub mod transport;

pub use config::ServerConfig;
pub use error::RaknetError;
