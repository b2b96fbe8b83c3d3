use crate::protocol::{
    packet::{DecodeError, RaknetEncodable},
    reliability::Reliability,
    types::Sequence24,
};
use bytes::{Buf, BufMut, Bytes};

const RELIABILITY_SHIFT: u8 = 5;
const SPLIT_FLAG: u8 = 0b0001_0000;

/// Largest body the 16-bit bit-length field can describe.
pub const MAX_FRAME_BODY_LEN: usize = (u16::MAX >> 3) as usize;

/// Ordering index and channel of an ordered or sequenced frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderingInfo {
    pub index: Sequence24,
    pub channel: u8,
}

/// The reliability-tagged unit of payload carried inside a frame set.
///
/// On the wire: flags byte (reliability in the top 3 bits), body length in
/// bits (u16 BE), the indexes the reliability calls for, then the body.
/// The body's first byte is the message tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub reliability: Reliability,
    pub reliable_index: Option<Sequence24>,
    pub sequence_index: Option<Sequence24>,
    pub ordering: Option<OrderingInfo>,
    pub body: Bytes,
}

impl Frame {
    /// A frame without indexes; the sender fills in the reliable index.
    pub fn new(reliability: Reliability, body: impl Into<Bytes>) -> Self {
        Self {
            reliability,
            reliable_index: None,
            sequence_index: None,
            ordering: None,
            body: body.into(),
        }
    }

    /// Message tag of the body, if the body is not empty.
    pub fn tag(&self) -> Option<u8> {
        self.body.first().copied()
    }

    pub fn fits_length_field(&self) -> bool {
        self.body.len() <= MAX_FRAME_BODY_LEN
    }

    /// Bytes this frame occupies on the wire, header included.
    pub fn encoded_len(&self) -> usize {
        let rel = self.reliability;
        let mut len = 1 + 2 + self.body.len();
        if rel.is_reliable() {
            len += 3;
        }
        if rel.is_sequenced() {
            len += 3;
        }
        if rel.is_ordered() || rel.is_sequenced() {
            len += 4;
        }
        len
    }
}

/// Bodies over [`MAX_FRAME_BODY_LEN`] cannot be described by the length
/// field; callers check [`Frame::fits_length_field`] first.
impl RaknetEncodable for Frame {
    fn encode_raknet(&self, dst: &mut impl BufMut) {
        let rel = self.reliability;
        dst.put_u8((rel as u8) << RELIABILITY_SHIFT);

        let bit_length = (self.body.len() as u16) << 3;
        bit_length.encode_raknet(dst);

        // Indexes the reliability requires but the frame lacks go out as zero.
        if rel.is_reliable() {
            self.reliable_index.unwrap_or_default().encode_raknet(dst);
        }

        if rel.is_sequenced() {
            self.sequence_index.unwrap_or_default().encode_raknet(dst);
        }

        if rel.is_ordered() || rel.is_sequenced() {
            let ordering = self.ordering.unwrap_or(OrderingInfo {
                index: Sequence24::default(),
                channel: 0,
            });
            ordering.index.encode_raknet(dst);
            ordering.channel.encode_raknet(dst);
        }

        dst.put_slice(&self.body);
    }

    fn decode_raknet(src: &mut impl Buf) -> Result<Self, DecodeError> {
        let flags = u8::decode_raknet(src)?;
        if flags & SPLIT_FLAG != 0 {
            return Err(DecodeError::SplitFrameUnsupported);
        }
        let rel = Reliability::from_bits(flags >> RELIABILITY_SHIFT);

        let bit_length = u16::decode_raknet(src)?;
        let body_len = ((bit_length as usize) + 7) >> 3;

        let reliable_index = if rel.is_reliable() {
            Some(Sequence24::decode_raknet(src)?)
        } else {
            None
        };

        let sequence_index = if rel.is_sequenced() {
            Some(Sequence24::decode_raknet(src)?)
        } else {
            None
        };

        let ordering = if rel.is_ordered() || rel.is_sequenced() {
            let index = Sequence24::decode_raknet(src)?;
            let channel = u8::decode_raknet(src)?;
            Some(OrderingInfo { index, channel })
        } else {
            None
        };

        if src.remaining() < body_len {
            return Err(DecodeError::UnexpectedEof);
        }
        let body = src.copy_to_bytes(body_len);

        Ok(Frame {
            reliability: rel,
            reliable_index,
            sequence_index,
            ordering,
            body,
        })
    }
}
