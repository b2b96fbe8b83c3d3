//! Acknowledgement and negative-acknowledgement datagrams.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::protocol::{
    constants::{DatagramFlags, MAX_ACK_SEQUENCES},
    packet::{DecodeError, RaknetEncodable},
    types::Sequence24,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckKind {
    Ack,
    Nack,
}

impl AckKind {
    fn flags(self) -> DatagramFlags {
        match self {
            AckKind::Ack => DatagramFlags::VALID | DatagramFlags::ACK,
            AckKind::Nack => DatagramFlags::VALID | DatagramFlags::NACK,
        }
    }
}

/// Inclusive run of sequence numbers, as written in one ack record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceRange {
    pub start: Sequence24,
    pub end: Sequence24,
}

/// An ack or nack naming a list of frame set sequence numbers.
///
/// The wire form is a u16 record count followed by records that are either a
/// single number or an inclusive range. Consecutive runs in `sequences` are
/// collapsed into ranges on encode and expanded again on decode, so the list
/// order survives the trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckNackPayload {
    pub kind: AckKind,
    pub sequences: Vec<Sequence24>,
}

impl AckNackPayload {
    pub fn ack(sequences: Vec<Sequence24>) -> Self {
        Self {
            kind: AckKind::Ack,
            sequences,
        }
    }

    pub fn nack(sequences: Vec<Sequence24>) -> Self {
        Self {
            kind: AckKind::Nack,
            sequences,
        }
    }

    pub fn ranges(&self) -> Vec<SequenceRange> {
        let mut ranges: Vec<SequenceRange> = Vec::new();
        for &seq in &self.sequences {
            match ranges.last_mut() {
                Some(range) if range.end.next() == seq => range.end = seq,
                _ => ranges.push(SequenceRange {
                    start: seq,
                    end: seq,
                }),
            }
        }
        ranges
    }

    pub fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u8(self.kind.flags().bits());

        let ranges = self.ranges();
        let count = ranges.len().min(u16::MAX as usize);
        (count as u16).encode_raknet(dst);

        for range in ranges.iter().take(count) {
            let single = range.start == range.end;
            single.encode_raknet(dst);
            range.start.encode_raknet(dst);
            if !single {
                range.end.encode_raknet(dst);
            }
        }
    }

    pub fn decode(src: &mut impl Buf) -> Result<Self, DecodeError> {
        let tag = u8::decode_raknet(src)?;
        let flags = DatagramFlags::from_bits_truncate(tag);
        let kind = if !flags.contains(DatagramFlags::VALID) {
            return Err(DecodeError::UnknownId(tag));
        } else if flags.contains(DatagramFlags::ACK) {
            AckKind::Ack
        } else if flags.contains(DatagramFlags::NACK) {
            AckKind::Nack
        } else {
            return Err(DecodeError::UnknownId(tag));
        };

        let count = u16::decode_raknet(src)?;
        let mut sequences = Vec::new();
        for _ in 0..count {
            let single = bool::decode_raknet(src)?;
            let start = Sequence24::decode_raknet(src)?;
            let end = if single {
                start
            } else {
                Sequence24::decode_raknet(src)?
            };

            let mut seq = start;
            loop {
                if sequences.len() >= MAX_ACK_SEQUENCES {
                    return Err(DecodeError::AckTooLarge(MAX_ACK_SEQUENCES));
                }
                sequences.push(seq);
                if seq == end {
                    break;
                }
                seq = seq.next();
            }
        }

        Ok(Self { kind, sequences })
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.encode(&mut buf);
        buf.freeze()
    }
}
