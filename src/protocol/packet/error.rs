use thiserror::Error;

/// Errors that may occur while decoding RakNet protocol values or packets.
///
/// This type is kept small and generic so it can be shared by all
/// `RaknetEncodable` implementations, packet bodies and datagram codecs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer did not contain enough bytes to decode the requested value.
    #[error("Unexpected EoF, not enough bytes to read requested type.")]
    UnexpectedEof,

    /// A control packet ID was not recognised by the registry.
    #[error("Unknown Packet, ID: {0}")]
    UnknownId(u8),

    /// An offline packet did not carry the expected magic sequence.
    #[error("Offline packet carried an invalid magic.")]
    InvalidMagic,

    /// An address encoding used an unsupported version field.
    #[error(
        "An invalid IpAddress version was encountered:\n\
        Provided: {0}, expected: 4 or 6."
    )]
    InvalidAddrVersion(u8),

    /// The leading byte is outside the frame set range `0x80..=0x8F`.
    #[error("Byte 0x{0:02x} does not start a frame set.")]
    NotAFrameSet(u8),

    #[error("Split frames are not supported.")]
    SplitFrameUnsupported,

    /// An ack or nack datagram expanded to more sequence numbers than allowed.
    #[error("Ack record list expands to more than {0} sequence numbers.")]
    AckTooLarge(usize),
}
