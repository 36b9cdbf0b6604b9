#[cfg(feature = "std")]
use core::fmt::{self, Display};

#[cfg(feature = "std")]
use std::{
    convert::{TryFrom, TryInto},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

#[cfg(feature = "std")]
use time::{format_description::well_known::Iso8601, OffsetDateTime};

/// Common MTU size for ethernet; a reasonable default scratch-buffer size for
/// a single OSC message.
pub const MTU: usize = 1536;

/// A time tag in an OSC message: two 32-bit integers, the first the number of
/// seconds since 1900-01-01 and the second the fractional part of a second.
/// See <http://opensoundcontrol.org/node/3/#timetags>.
///
/// # Conversions with [`std::time::SystemTime`]
///
/// Under the `std` feature, `OscTime` converts to/from `SystemTime`. The
/// conversions are lossy (tested to within 5 nanoseconds round-tripped) and
/// only support times at or after [`UNIX_EPOCH`](std::time::UNIX_EPOCH), so
/// the arithmetic stays correct on 32-bit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OscTime {
    pub seconds: u32,
    pub fractional: u32,
}

#[cfg(feature = "std")]
impl OscTime {
    const UNIX_OFFSET: u64 = 2_208_988_800; // From RFC 5905
    const TWO_POW_32: f64 = (u32::MAX as f64) + 1.0;
    const ONE_OVER_TWO_POW_32: f64 = 1.0 / OscTime::TWO_POW_32;
    const NANOS_PER_SECOND: f64 = 1.0e9;
    const SECONDS_PER_NANO: f64 = 1.0 / OscTime::NANOS_PER_SECOND;
}

#[cfg(feature = "std")]
impl TryFrom<SystemTime> for OscTime {
    type Error = crate::errors::OscTimeError;

    fn try_from(time: SystemTime) -> core::result::Result<OscTime, crate::errors::OscTimeError> {
        let duration_since_epoch = time
            .duration_since(UNIX_EPOCH)
            .map_err(|_| crate::errors::OscTimeError::BeforeEpoch)?
            + Duration::new(OscTime::UNIX_OFFSET, 0);
        let seconds = u32::try_from(duration_since_epoch.as_secs())
            .map_err(|_| crate::errors::OscTimeError::Overflow)?;
        let nanos = duration_since_epoch.subsec_nanos() as f64;
        let fractional = (nanos * OscTime::SECONDS_PER_NANO * OscTime::TWO_POW_32).round() as u32;
        Ok(OscTime {
            seconds,
            fractional,
        })
    }
}

#[cfg(feature = "std")]
impl From<OscTime> for SystemTime {
    fn from(time: OscTime) -> SystemTime {
        let nanos =
            (time.fractional as f64) * OscTime::ONE_OVER_TWO_POW_32 * OscTime::NANOS_PER_SECOND;
        let duration_since_osc_epoch = Duration::new(time.seconds as u64, nanos.round() as u32);
        let duration_since_unix_epoch =
            duration_since_osc_epoch - Duration::new(OscTime::UNIX_OFFSET, 0);
        UNIX_EPOCH + duration_since_unix_epoch
    }
}

#[cfg(feature = "std")]
impl Display for OscTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time: OffsetDateTime = SystemTime::from(*self).into();
        let formatted = time.format(&Iso8601::DEFAULT).map_err(|_| fmt::Error)?;
        f.write_str(&formatted)
    }
}

impl From<(u32, u32)> for OscTime {
    fn from(time: (u32, u32)) -> OscTime {
        let (seconds, fractional) = time;
        OscTime {
            seconds,
            fractional,
        }
    }
}

impl From<OscTime> for (u32, u32) {
    fn from(time: OscTime) -> (u32, u32) {
        (time.seconds, time.fractional)
    }
}

#[cfg(feature = "std")]
impl TryFrom<SystemTime> for crate::types::ArgValue<'static> {
    type Error = crate::errors::OscTimeError;

    fn try_from(time: SystemTime) -> std::result::Result<Self, crate::errors::OscTimeError> {
        time.try_into().map(ArgValue::Time)
    }
}

/// A MIDI message: port, status byte, and two data bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OscMidiMessage {
    pub port: u8,
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
}

/// An RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OscColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

/// A single OSC argument value, borrowed from the message buffer it was
/// decoded out of. See [OSC Type Tag String](http://opensoundcontrol.org/spec-1_0).
///
/// Unlike an owning representation, `String`/`Blob` never copy: they are
/// slices of the original buffer, so decoding never allocates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ArgValue<'a> {
    Int(i32),
    Float(f32),
    /// Borrowed, null-terminator-stripped string.
    String(&'a str),
    /// Borrowed, same layout as `String`, semantically a distinct type.
    Symbol(&'a str),
    /// Borrowed blob contents (length already stripped).
    Blob(&'a [u8]),
    Time(OscTime),
    Long(i64),
    Double(f64),
    Char(char),
    Color(OscColor),
    Midi(OscMidiMessage),
    Bool(bool),
    Nil,
    Inf,
}

impl<'a> ArgValue<'a> {
    /// The tag character this value is encoded/decoded under.
    pub fn tag(&self) -> char {
        match self {
            ArgValue::Int(_) => 'i',
            ArgValue::Float(_) => 'f',
            ArgValue::String(_) => 's',
            ArgValue::Symbol(_) => 'S',
            ArgValue::Blob(_) => 'b',
            ArgValue::Time(_) => 't',
            ArgValue::Long(_) => 'h',
            ArgValue::Double(_) => 'd',
            ArgValue::Char(_) => 'c',
            ArgValue::Color(_) => 'r',
            ArgValue::Midi(_) => 'm',
            ArgValue::Bool(true) => 'T',
            ArgValue::Bool(false) => 'F',
            ArgValue::Nil => 'N',
            ArgValue::Inf => 'I',
        }
    }

    pub fn int(self) -> Option<i32> {
        match self {
            ArgValue::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn float(self) -> Option<f32> {
        match self {
            ArgValue::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn string(self) -> Option<&'a str> {
        match self {
            ArgValue::String(v) | ArgValue::Symbol(v) => Some(v),
            _ => None,
        }
    }

    pub fn blob(self) -> Option<&'a [u8]> {
        match self {
            ArgValue::Blob(v) => Some(v),
            _ => None,
        }
    }

    pub fn long(self) -> Option<i64> {
        match self {
            ArgValue::Long(v) => Some(v),
            _ => None,
        }
    }

    pub fn double(self) -> Option<f64> {
        match self {
            ArgValue::Double(v) => Some(v),
            _ => None,
        }
    }

    pub fn time(self) -> Option<OscTime> {
        match self {
            ArgValue::Time(v) => Some(v),
            _ => None,
        }
    }

    pub fn bool(self) -> Option<bool> {
        match self {
            ArgValue::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl<'a> From<i32> for ArgValue<'a> {
    fn from(v: i32) -> Self {
        ArgValue::Int(v)
    }
}
impl<'a> From<f32> for ArgValue<'a> {
    fn from(v: f32) -> Self {
        ArgValue::Float(v)
    }
}
impl<'a> From<&'a str> for ArgValue<'a> {
    fn from(v: &'a str) -> Self {
        ArgValue::String(v)
    }
}
impl<'a> From<&'a [u8]> for ArgValue<'a> {
    fn from(v: &'a [u8]) -> Self {
        ArgValue::Blob(v)
    }
}
impl<'a> From<i64> for ArgValue<'a> {
    fn from(v: i64) -> Self {
        ArgValue::Long(v)
    }
}
impl<'a> From<f64> for ArgValue<'a> {
    fn from(v: f64) -> Self {
        ArgValue::Double(v)
    }
}
impl<'a> From<bool> for ArgValue<'a> {
    fn from(v: bool) -> Self {
        ArgValue::Bool(v)
    }
}
impl<'a> From<OscTime> for ArgValue<'a> {
    fn from(v: OscTime) -> Self {
        ArgValue::Time(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_roundtrip() {
        assert_eq!(ArgValue::Int(4).tag(), 'i');
        assert_eq!(ArgValue::Float(1.0).tag(), 'f');
        assert_eq!(ArgValue::String("x").tag(), 's');
        assert_eq!(ArgValue::Bool(true).tag(), 'T');
        assert_eq!(ArgValue::Bool(false).tag(), 'F');
        assert_eq!(ArgValue::Nil.tag(), 'N');
        assert_eq!(ArgValue::Inf.tag(), 'I');
    }

    #[test]
    fn accessors() {
        assert_eq!(ArgValue::Int(4).int(), Some(4));
        assert_eq!(ArgValue::Float(1.0).int(), None);
        assert_eq!(ArgValue::String("hi").string(), Some("hi"));
        assert_eq!(ArgValue::Symbol("hi").string(), Some("hi"));
        assert_eq!(ArgValue::Blob(&[1, 2]).blob(), Some(&[1u8, 2u8][..]));
    }
}
