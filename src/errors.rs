use core::fmt;

/// Why a buffer failed to parse as a well-formed OSC message or bundle.
///
/// Every core entry point (address extraction, [`crate::decoder::message_length`],
/// [`crate::decoder::argument`], [`crate::dispatch::dispatch`]) fails closed on
/// a malformed buffer in bounded time rather than reading past its end; the
/// richer variants here exist for non-realtime collaborators (e.g. a pretty
/// printer) that want to say *why*, not just *whether*.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer was empty, or shorter than the minimum possible message (8 bytes).
    TooShort,
    /// The address did not start with `/`.
    BadAddress,
    /// The address or type-tag string was not null-terminated within the buffer,
    /// or was not valid UTF-8.
    BadString,
    /// The type-tag string did not start with `,`.
    BadTypeTag,
    /// An argument's tag character is not one this crate recognizes.
    UnknownTag(u8),
    /// The declared argument count/widths run past the end of the buffer.
    Truncated,
    /// A bundle's header was not `#bundle`, the buffer was too short to hold
    /// a timetag, or an element's declared size overruns the buffer. Produced
    /// by [`crate::decoder::validate_bundle`].
    BadBundle,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::TooShort => f.write_str("buffer shorter than a minimal OSC message"),
            DecodeError::BadAddress => f.write_str("address does not start with '/'"),
            DecodeError::BadString => f.write_str("string is not null-terminated UTF-8"),
            DecodeError::BadTypeTag => f.write_str("type tag string does not start with ','"),
            DecodeError::UnknownTag(tag) => write!(f, "unrecognized type tag byte {tag:#04x}"),
            DecodeError::Truncated => f.write_str("argument data runs past end of buffer"),
            DecodeError::BadBundle => f.write_str("malformed bundle header or element size"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

/// Returned by [`crate::threadlink::Ring::write`] when the ring has no room
/// for the encoded message. The realtime writer never blocks to wait for
/// space; the message is simply not enqueued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkError {
    /// The ring does not have `size_of_entry` contiguous + wrap-sentinel bytes free.
    Dropped,
    /// The message, once encoded, would not fit even in an empty ring
    /// (larger than the ring's configured max-message capacity).
    TooLarge,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::Dropped => f.write_str("ring buffer full, message dropped"),
            LinkError::TooLarge => f.write_str("message exceeds configured maximum size"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LinkError {}

/// Why a [`crate::types::OscTime`] could not be converted from a
/// `std::time::SystemTime`. Only constructible under the `std` feature.
#[cfg(feature = "std")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OscTimeError {
    /// The `SystemTime` is before the Unix epoch and cannot be represented.
    BeforeEpoch,
    /// The duration since the epoch overflows the 32-bit seconds field.
    Overflow,
}

#[cfg(feature = "std")]
impl fmt::Display for OscTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OscTimeError::BeforeEpoch => {
                write!(f, "time is before the unix epoch and cannot be stored")
            }
            OscTimeError::Overflow => write!(f, "time overflows what OSC time can store"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for OscTimeError {}
