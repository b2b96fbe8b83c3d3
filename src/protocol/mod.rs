//! RakNet protocol primitives, control packets, and related state.
//!
//! This module houses constants, packet definitions and the datagram codecs
//! used by the session and transport layers. Everything in here is pure:
//! bytes in, values out.

pub mod ack;
pub mod constants;
pub mod datagram;
pub mod frame;
pub mod packet;
pub mod reliability;
pub mod state;
pub mod types;
