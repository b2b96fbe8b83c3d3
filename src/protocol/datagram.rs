use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::protocol::{
    constants::{DatagramFlags, FRAME_SET_FLAGS, RAKNET_DATAGRAM_HEADER_SIZE},
    frame::Frame,
    packet::{DecodeError, RaknetEncodable},
    types::{DatagramHeader, Sequence24},
};

/// Category of a datagram, read from its first byte alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatagramKind {
    /// No `VALID` bit: an unconnected message, the byte is its packet ID.
    Offline,
    FrameSet,
    Ack,
    Nack,
    /// `VALID` set but none of the above (0x90..=0x9F).
    Unknown,
}

impl DatagramKind {
    pub fn of(tag: u8) -> DatagramKind {
        let flags = DatagramFlags::from_bits_truncate(tag);
        if !flags.contains(DatagramFlags::VALID) {
            DatagramKind::Offline
        } else if flags.contains(DatagramFlags::ACK) {
            DatagramKind::Ack
        } else if flags.contains(DatagramFlags::NACK) {
            DatagramKind::Nack
        } else if tag <= 0x8F {
            DatagramKind::FrameSet
        } else {
            DatagramKind::Unknown
        }
    }
}

/// The outer envelope of connected data: a sequence number and one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSet {
    pub sequence: Sequence24,
    pub frame: Frame,
}

impl FrameSet {
    pub fn encode(&self, dst: &mut impl BufMut) {
        DatagramHeader {
            flags: FRAME_SET_FLAGS,
            sequence: self.sequence,
        }
        .encode(dst);
        self.frame.encode_raknet(dst);
    }

    /// Decodes the header and the first frame; trailing bytes are ignored.
    pub fn decode(src: &mut impl Buf) -> Result<Self, DecodeError> {
        let header = DatagramHeader::decode(src)?;
        let frame = Frame::decode_raknet(src)?;
        Ok(Self {
            sequence: header.sequence,
            frame,
        })
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buf =
            BytesMut::with_capacity(RAKNET_DATAGRAM_HEADER_SIZE + self.frame.encoded_len());
        self.encode(&mut buf);
        buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::reliability::Reliability;

    #[test]
    fn kind_from_tag() {
        assert_eq!(DatagramKind::of(0x05), DatagramKind::Offline);
        assert_eq!(DatagramKind::of(0x80), DatagramKind::FrameSet);
        assert_eq!(DatagramKind::of(0x84), DatagramKind::FrameSet);
        assert_eq!(DatagramKind::of(0x8F), DatagramKind::FrameSet);
        assert_eq!(DatagramKind::of(0xC0), DatagramKind::Ack);
        assert_eq!(DatagramKind::of(0xA0), DatagramKind::Nack);
        assert_eq!(DatagramKind::of(0x90), DatagramKind::Unknown);
    }

    #[test]
    fn frame_set_layout() {
        let set = FrameSet {
            sequence: Sequence24::new(0x010203),
            frame: Frame::new(Reliability::Unreliable, Bytes::from_static(&[0x15])),
        };
        let bytes = set.to_bytes();
        assert_eq!(&bytes[..4], &[0x84, 0x03, 0x02, 0x01]);

        let mut slice = bytes;
        assert_eq!(FrameSet::decode(&mut slice).unwrap(), set);
    }

    #[test]
    fn short_header_is_eof() {
        let mut slice: &[u8] = &[0x84, 0x00, 0x00];
        assert_eq!(FrameSet::decode(&mut slice), Err(DecodeError::UnexpectedEof));
    }

    #[test]
    fn ack_tag_is_not_a_frame_set() {
        let mut slice: &[u8] = &[0xC0, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(FrameSet::decode(&mut slice), Err(DecodeError::NotAFrameSet(0xC0)));
    }
}
