use bitflags::bitflags;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use crate::protocol::types::Magic;

pub const RAKNET_PROTOCOL_VERSION: u8 = 11; // Mojang's version.
pub const MINIMUM_MTU_SIZE: u16 = 576;
pub const MAXIMUM_MTU_SIZE: u16 = 1400;

/// IPv4 header plus UDP header, added to the request length when sizing MTU.
pub const IP_UDP_HEADER_SIZE: usize = 20 + UDP_HEADER_SIZE;

pub const UDP_HEADER_SIZE: usize = 8;

/// Flags byte plus the 24-bit sequence number.
pub const RAKNET_DATAGRAM_HEADER_SIZE: usize = 4;

/// Upper bound of sequence numbers a single ack/nack datagram may expand to.
pub const MAX_ACK_SEQUENCES: usize = 8192;

/// Default number of reliable frame sets kept per session for retransmission.
pub const DEFAULT_RETAINED_FRAMES: usize = 512;

pub const DEFAULT_MAX_SESSIONS: usize = 1024;

/// Number of internal addresses carried by connection request accepted and
/// new incoming connection packets.
pub const SYSTEM_ADDRESS_COUNT: usize = 10;

bitflags! {
    /// Flags carried in the first byte of every connected datagram.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct DatagramFlags: u8 {
        const VALID          = 0b1000_0000;
        const ACK            = 0b0100_0000;
        const NACK           = 0b0010_0000;
        const NEEDS_B_AND_AS = 0b0000_0100;
    }
}

/// Flags written on every outgoing frame set.
pub const FRAME_SET_FLAGS: DatagramFlags = DatagramFlags::VALID.union(DatagramFlags::NEEDS_B_AND_AS);

/// Magic used to identify RakNet packets
pub const DEFAULT_UNCONNECTED_MAGIC: Magic = [
    0x00, 0xFF, 0xFF, 0x00, 0xFE, 0xFE, 0xFE, 0xFE, 0xFD, 0xFD, 0xFD, 0xFD, 0x12, 0x34, 0x56, 0x78,
];

pub const DEFAULT_ADVERTISEMENT: &[u8] =
    b"MCPE;Dedicated Server;527;1.19.1;0;10;13253860892328930865;Bedrock level;Survival;1;19132";

pub const ANY_V4: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0);

pub const LOCAL_IP_ADDRESSES: [SocketAddr; SYSTEM_ADDRESS_COUNT] =
    [SocketAddr::V4(ANY_V4); SYSTEM_ADDRESS_COUNT];
