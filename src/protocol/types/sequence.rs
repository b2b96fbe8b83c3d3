use std::cmp::Ordering;

use crate::protocol::{
    packet::{DecodeError, RaknetEncodable},
    types::U24LE,
};

const MODULO: u32 = 1 << 24;
const MASK: u32 = MODULO - 1;
const HALF: u32 = MODULO / 2;

/// Wrapping 24-bit sequence number.
///
/// Ordering is serial-number arithmetic: `b > a` when `b` lies less than
/// half the number space ahead of `a`, so `0 > 0xFF_FFFF`.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub struct Sequence24(u32);

impl Sequence24 {
    pub fn new(v: u32) -> Sequence24 {
        Sequence24(v & MASK)
    }

    pub fn value(&self) -> u32 {
        self.0 & MASK
    }

    pub fn next(&self) -> Sequence24 {
        Sequence24::new(self.0 + 1)
    }

    pub fn prev(&self) -> Sequence24 {
        Sequence24(if self.0 == 0 { MASK } else { self.0 - 1 })
    }
}

impl Ord for Sequence24 {
    fn cmp(&self, other: &Self) -> Ordering {
        let ahead = other.value().wrapping_sub(self.value()) & MASK;
        if ahead == 0 {
            Ordering::Equal
        } else if ahead < HALF {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }
}

impl PartialOrd for Sequence24 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Sequence24 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl From<Sequence24> for U24LE {
    fn from(seq: Sequence24) -> Self {
        U24LE(seq.value())
    }
}

impl From<U24LE> for Sequence24 {
    fn from(raw: U24LE) -> Self {
        Sequence24::new(raw.0)
    }
}

impl RaknetEncodable for Sequence24 {
    fn encode_raknet(&self, dst: &mut impl bytes::BufMut) {
        U24LE::from(*self).encode_raknet(dst);
    }

    fn decode_raknet(src: &mut impl bytes::Buf) -> Result<Self, DecodeError> {
        Ok(Sequence24::from(U24LE::decode_raknet(src)?))
    }
}
