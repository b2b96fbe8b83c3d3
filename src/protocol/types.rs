use crate::protocol::packet::{DecodeError, RaknetEncodable};
use bytes::{Buf, BufMut, Bytes};
use std::{
    mem,
    net::{Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6},
    time::Duration,
};

mod datagram_header;
mod primitives;
mod sequence;

pub use datagram_header::DatagramHeader;
pub use sequence::Sequence24;

pub type Magic = [u8; 16];

/// Fixed-width integers, big-endian on the wire.
macro_rules! impl_raknet_be_int {
    ($($ty:ty => $put:ident, $get:ident;)*) => {
        $(
            impl RaknetEncodable for $ty {
                fn encode_raknet(&self, dst: &mut impl BufMut) {
                    dst.$put(*self);
                }

                fn decode_raknet(src: &mut impl Buf) -> Result<Self, DecodeError> {
                    ensure_remaining(src, mem::size_of::<$ty>())?;
                    Ok(src.$get())
                }
            }
        )*
    };
}

impl_raknet_be_int! {
    u16 => put_u16, get_u16;
    u32 => put_u32, get_u32;
    u64 => put_u64, get_u64;
}

/// 24-bit unsigned integer, little-endian on the wire. The top byte of the
/// inner value is ignored on encode.
pub struct U24LE(pub u32);

impl RaknetEncodable for U24LE {
    fn encode_raknet(&self, dst: &mut impl BufMut) {
        dst.put_slice(&self.0.to_le_bytes()[..3]);
    }

    fn decode_raknet(src: &mut impl Buf) -> Result<Self, DecodeError> {
        ensure_remaining(src, 3)?;
        let mut le = [0u8; 4];
        src.copy_to_slice(&mut le[..3]);
        Ok(U24LE(u32::from_le_bytes(le)))
    }
}

/// Server advertisement carried at the tail of an unconnected pong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advertisement(pub Option<Bytes>);

impl RaknetEncodable for Advertisement {
    fn encode_raknet(&self, dst: &mut impl BufMut) {
        if let Some(ad_bytes) = &self.0 {
            let len = ad_bytes.len().min(u16::MAX as usize) as u16;
            dst.put_u16(len);
            dst.put_slice(&ad_bytes[..len as usize]);
        }
    }

    fn decode_raknet(src: &mut impl Buf) -> Result<Self, DecodeError> {
        let ad = if src.has_remaining() {
            if src.remaining() < 2 {
                return Err(DecodeError::UnexpectedEof);
            }
            let len = src.get_u16() as usize;
            if src.remaining() < len {
                return Err(DecodeError::UnexpectedEof);
            }
            Some(src.copy_to_bytes(len))
        } else {
            // No data left, so the field was omitted
            None
        };
        Ok(Advertisement(ad))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaknetTime(pub u64); // ms on wire

impl RaknetEncodable for RaknetTime {
    fn encode_raknet(&self, dst: &mut impl BufMut) {
        self.0.encode_raknet(dst);
    }

    fn decode_raknet(src: &mut impl Buf) -> Result<Self, DecodeError> {
        Ok(Self(u64::decode_raknet(src)?))
    }
}

impl From<RaknetTime> for Duration {
    fn from(value: RaknetTime) -> Self {
        Duration::from_millis(value.0)
    }
}

impl From<Duration> for RaknetTime {
    fn from(value: Duration) -> Self {
        RaknetTime(value.as_millis().min(u64::MAX as u128) as u64)
    }
}

/// Zero bytes filling the rest of a datagram. Only the count matters; the
/// open connection request 1 uses it to measure the path MTU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EoBPadding(pub usize);

impl RaknetEncodable for EoBPadding {
    fn encode_raknet(&self, dst: &mut impl BufMut) {
        dst.put_bytes(0, self.0);
    }

    fn decode_raknet(src: &mut impl Buf) -> Result<Self, DecodeError> {
        let len = src.remaining();
        src.advance(len);
        Ok(EoBPadding(len))
    }
}

/// `sin6_family` of the serialized `sockaddr_in6`, as Windows defines it.
const AF_INET6: u16 = 23;

/// Address version byte followed by IP and port. IPv4 octets travel
/// bitwise-inverted; IPv6 is laid out as a `sockaddr_in6`.
impl RaknetEncodable for SocketAddr {
    fn encode_raknet(&self, dst: &mut impl BufMut) {
        match self {
            SocketAddr::V4(addr) => {
                dst.put_u8(4);
                dst.put_slice(&addr.ip().octets().map(|octet| !octet));
                dst.put_u16(addr.port());
            }
            SocketAddr::V6(addr) => {
                dst.put_u8(6);
                dst.put_u16_le(AF_INET6);
                dst.put_u16(addr.port());
                dst.put_u32(addr.flowinfo());
                dst.put_slice(&addr.ip().octets());
                dst.put_u32(addr.scope_id());
            }
        }
    }

    fn decode_raknet(src: &mut impl Buf) -> Result<Self, DecodeError> {
        match u8::decode_raknet(src)? {
            4 => {
                ensure_remaining(src, 4 + 2)?;
                let mut octets = [0u8; 4];
                src.copy_to_slice(&mut octets);
                let ip = Ipv4Addr::from(octets.map(|octet| !octet));
                Ok(SocketAddrV4::new(ip, src.get_u16()).into())
            }
            6 => {
                ensure_remaining(src, 2 + 2 + 4 + 16 + 4)?;
                src.advance(2); // family
                let port = src.get_u16();
                let flowinfo = src.get_u32();
                let mut octets = [0u8; 16];
                src.copy_to_slice(&mut octets);
                let scope_id = src.get_u32();
                Ok(SocketAddrV6::new(Ipv6Addr::from(octets), port, flowinfo, scope_id).into())
            }
            version => Err(DecodeError::InvalidAddrVersion(version)),
        }
    }
}

fn ensure_remaining(src: &impl Buf, len: usize) -> Result<(), DecodeError> {
    if src.remaining() < len {
        Err(DecodeError::UnexpectedEof)
    } else {
        Ok(())
    }
}
