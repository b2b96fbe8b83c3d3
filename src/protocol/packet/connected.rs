//! Control packets exchanged inside frames once a session exists.

use bytes::{Buf, BufMut};

use crate::protocol::{
    packet::{DecodeError, Packet, RaknetEncodable},
    types::RaknetTime,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedPing {
    pub ping_time: RaknetTime,
}

impl Packet for ConnectedPing {
    const ID: u8 = 0x00;

    fn encode_body(&self, dst: &mut impl BufMut) {
        self.ping_time.encode_raknet(dst);
    }

    fn decode_body(src: &mut impl Buf) -> Result<Self, DecodeError> {
        Ok(Self {
            ping_time: RaknetTime::decode_raknet(src)?,
        })
    }
}

/// Answer to [`ConnectedPing`], echoing the ping time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedPong {
    pub ping_time: RaknetTime,
    pub pong_time: RaknetTime,
}

impl Packet for ConnectedPong {
    const ID: u8 = 0x03;

    fn encode_body(&self, dst: &mut impl BufMut) {
        self.ping_time.encode_raknet(dst);
        self.pong_time.encode_raknet(dst);
    }

    fn decode_body(src: &mut impl Buf) -> Result<Self, DecodeError> {
        Ok(Self {
            ping_time: RaknetTime::decode_raknet(src)?,
            pong_time: RaknetTime::decode_raknet(src)?,
        })
    }
}

/// Connection closed notice. Carries no body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisconnectNotification;

impl Packet for DisconnectNotification {
    const ID: u8 = 0x15;

    fn encode_body(&self, _dst: &mut impl BufMut) {}

    fn decode_body(_src: &mut impl Buf) -> Result<Self, DecodeError> {
        Ok(Self)
    }
}
