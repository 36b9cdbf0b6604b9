use crate::errors::DecodeError;
use crate::types::{ArgValue, OscColor, OscMidiMessage, OscTime};
use crate::util::pad4;

use nom::number::complete::{be_f32, be_f64, be_i32, be_i64, be_u32};

type NomErr<'a> = nom::error::Error<&'a [u8]>;

fn read_u32(buf: &[u8], at: usize) -> Option<u32> {
    let (_, v) = be_u32::<_, NomErr>(buf.get(at..)?).ok()?;
    Some(v)
}
fn read_i32(buf: &[u8], at: usize) -> Option<i32> {
    let (_, v) = be_i32::<_, NomErr>(buf.get(at..)?).ok()?;
    Some(v)
}
fn read_i64(buf: &[u8], at: usize) -> Option<i64> {
    let (_, v) = be_i64::<_, NomErr>(buf.get(at..)?).ok()?;
    Some(v)
}
fn read_f32(buf: &[u8], at: usize) -> Option<f32> {
    let (_, v) = be_f32::<_, NomErr>(buf.get(at..)?).ok()?;
    Some(v)
}
fn read_f64(buf: &[u8], at: usize) -> Option<f64> {
    let (_, v) = be_f64::<_, NomErr>(buf.get(at..)?).ok()?;
    Some(v)
}

/// Reads a null-terminated, 4-byte-padded string starting at `start`.
/// Returns the string (not including the terminator) and the offset of the
/// byte immediately after the padding.
fn read_cstr(buf: &[u8], start: usize) -> Option<(&str, usize)> {
    let rel_nul = buf.get(start..)?.iter().position(|&b| b == 0)?;
    let nul_at = start + rel_nul;
    let s = core::str::from_utf8(&buf[start..nul_at]).ok()?;
    let end = start + pad4(rel_nul + 1);
    if end > buf.len() {
        return None;
    }
    Some((s, end))
}

/// Returns the message's address, or `None` if the buffer doesn't start with
/// a null-terminated, `/`-prefixed string.
pub fn address(buf: &[u8]) -> Option<&str> {
    let (addr, _) = read_cstr(buf, 0)?;
    if addr.starts_with('/') {
        Some(addr)
    } else {
        None
    }
}

/// Returns the type-tag characters (without the leading `,`) and the offset
/// where the argument payload begins.
fn type_tag_string(buf: &[u8], start: usize) -> Option<(&str, usize)> {
    let (raw, payload_start) = read_cstr(buf, start)?;
    let tags = raw.strip_prefix(',')?;
    Some((tags, payload_start))
}

fn addr_and_tags(buf: &[u8]) -> Option<(&str, usize)> {
    let (addr, tags_start) = read_cstr(buf, 0)?;
    if !addr.starts_with('/') {
        return None;
    }
    type_tag_string(buf, tags_start)
}

/// Returns the tag-string characters (after the leading `,`), e.g. `"if"`
/// for a message tagged `,if`. Immediates (`T`/`F`/`N`/`I`) are included:
/// they count as arguments even though they carry no payload bytes.
pub fn argument_string(buf: &[u8]) -> Option<&str> {
    addr_and_tags(buf).map(|(tags, _)| tags)
}

/// Returns the number of arguments in the message.
pub fn narguments(buf: &[u8]) -> Option<usize> {
    argument_string(buf).map(str::len)
}

/// Returns the tag character of the `i`-th argument.
pub fn type_tag(buf: &[u8], i: usize) -> Option<char> {
    argument_string(buf)?.chars().nth(i)
}

/// Advances past one argument's payload (already positioned at `offset`,
/// the start of that argument's data), returning the offset just after its
/// padding, or `None` if `tag` is unrecognized or the buffer is too short.
fn skip_arg(tag: char, buf: &[u8], offset: usize) -> Option<usize> {
    let end = match tag {
        'i' | 'f' | 'c' | 'r' | 'm' => offset.checked_add(4)?,
        'h' | 'd' | 't' => offset.checked_add(8)?,
        's' | 'S' => return read_cstr(buf, offset).map(|(_, end)| end),
        'b' => {
            let n = read_u32(buf, offset)? as usize;
            let data_start = offset.checked_add(4)?;
            let padded = pad4(n);
            data_start.checked_add(padded)?
        }
        'T' | 'F' | 'N' | 'I' => offset,
        _ => return None,
    };
    if end > buf.len() {
        None
    } else {
        Some(end)
    }
}

fn decode_arg<'a>(tag: char, buf: &'a [u8], offset: usize) -> Option<ArgValue<'a>> {
    match tag {
        'i' => Some(ArgValue::Int(read_i32(buf, offset)?)),
        'f' => Some(ArgValue::Float(read_f32(buf, offset)?)),
        'h' => Some(ArgValue::Long(read_i64(buf, offset)?)),
        'd' => Some(ArgValue::Double(read_f64(buf, offset)?)),
        't' => Some(ArgValue::Time(OscTime {
            seconds: read_u32(buf, offset)?,
            fractional: read_u32(buf, offset + 4)?,
        })),
        'c' => char::from_u32(read_u32(buf, offset)?).map(ArgValue::Char),
        'r' => {
            let b = buf.get(offset..offset + 4)?;
            Some(ArgValue::Color(OscColor {
                red: b[0],
                green: b[1],
                blue: b[2],
                alpha: b[3],
            }))
        }
        'm' => {
            let b = buf.get(offset..offset + 4)?;
            Some(ArgValue::Midi(OscMidiMessage {
                port: b[0],
                status: b[1],
                data1: b[2],
                data2: b[3],
            }))
        }
        's' => Some(ArgValue::String(read_cstr(buf, offset)?.0)),
        'S' => Some(ArgValue::Symbol(read_cstr(buf, offset)?.0)),
        'b' => {
            let n = read_u32(buf, offset)? as usize;
            let data_start = offset.checked_add(4)?;
            let data_end = data_start.checked_add(n)?;
            Some(ArgValue::Blob(buf.get(data_start..data_end)?))
        }
        'T' => Some(ArgValue::Bool(true)),
        'F' => Some(ArgValue::Bool(false)),
        'N' => Some(ArgValue::Nil),
        'I' => Some(ArgValue::Inf),
        _ => None,
    }
}

/// Locates and decodes the `i`-th argument by walking the tag string and
/// summing the byte width of each prior argument. `O(i)`, matching every
/// other accessor in this module: none of them cache a parsed structure.
pub fn argument(buf: &[u8], i: usize) -> Option<ArgValue<'_>> {
    let (tags, payload_start) = addr_and_tags(buf)?;
    let mut offset = payload_start;
    let mut chars = tags.chars();
    for tag in chars.by_ref().take(i) {
        offset = skip_arg(tag, buf, offset)?;
    }
    let tag = chars.next()?;
    decode_arg(tag, buf, offset)
}

/// Parses the address and type-tag string and walks every argument,
/// returning the total encoded length of the message, or `None` if `buf` is
/// not a well-formed OSC message. This is the one accessor that is `O(n)` in
/// the argument count rather than `O(1)`-per-call, since it must touch every
/// argument to find where the message ends.
pub fn message_length(buf: &[u8]) -> Option<usize> {
    let (tags, mut offset) = addr_and_tags(buf)?;
    for tag in tags.chars() {
        offset = skip_arg(tag, buf, offset)?;
    }
    Some(offset)
}

/// The same check as [`message_length`], reporting *why* parsing failed
/// rather than collapsing every failure to `None`. Intended for non-realtime
/// collaborators (e.g. a pretty printer) that want a diagnosable error.
pub fn validate(buf: &[u8]) -> Result<usize, DecodeError> {
    if buf.len() < 8 {
        return Err(DecodeError::TooShort);
    }
    let (addr, tags_start) =
        read_cstr(buf, 0).ok_or(DecodeError::BadString)?;
    if !addr.starts_with('/') {
        return Err(DecodeError::BadAddress);
    }
    let (raw_tags, mut offset) =
        read_cstr(buf, tags_start).ok_or(DecodeError::BadString)?;
    let tags = raw_tags.strip_prefix(',').ok_or(DecodeError::BadTypeTag)?;
    for tag in tags.chars() {
        offset = skip_arg(tag, buf, offset)
            .ok_or_else(|| match tag {
                'i' | 'f' | 'h' | 'd' | 't' | 'c' | 'r' | 'm' | 's' | 'S' | 'b' | 'T' | 'F'
                | 'N' | 'I' => DecodeError::Truncated,
                other => DecodeError::UnknownTag(other as u8),
            })?;
    }
    Ok(offset)
}

/// True iff `buf` starts with the bundle marker `#bundle\0`.
pub fn bundle_p(buf: &[u8]) -> bool {
    buf.len() >= 8 && &buf[0..8] == b"#bundle\0"
}

/// Returns the bundle's timetag, or `None` if `buf` is not a bundle or is
/// too short to contain one.
pub fn bundle_timetag(buf: &[u8]) -> Option<OscTime> {
    if !bundle_p(buf) {
        return None;
    }
    Some(OscTime {
        seconds: read_u32(buf, 8)?,
        fractional: read_u32(buf, 12)?,
    })
}

/// Iterates a bundle's `(u32 size, element)` pairs, yielding each element as
/// a borrowed slice -- itself a message or a nested bundle -- without
/// copying. Stops (yields nothing further) as soon as a declared size would
/// run past the end of `buf`.
pub struct BundleElements<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for BundleElements<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        let size = read_u32(self.buf, self.pos)? as usize;
        let start = self.pos.checked_add(4)?;
        let end = start.checked_add(size)?;
        let elem = self.buf.get(start..end)?;
        self.pos = end;
        Some(elem)
    }
}

/// Returns an iterator over a bundle's contained messages/bundles. Returns
/// an empty iterator if `buf` is not a bundle.
pub fn bundle_elements(buf: &[u8]) -> BundleElements<'_> {
    if bundle_p(buf) {
        BundleElements { buf, pos: 16 }
    } else {
        BundleElements { buf: &[], pos: 0 }
    }
}

/// The same check [`validate`] gives a plain message, extended to bundles:
/// reports *why* a buffer failed to parse as a well-formed bundle instead of
/// collapsing every failure the way [`bundle_p`]/[`bundle_elements`] do.
/// Recurses into nested bundles; each contained message is checked with
/// [`validate`].
pub fn validate_bundle(buf: &[u8]) -> Result<usize, DecodeError> {
    if !bundle_p(buf) || buf.len() < 16 {
        return Err(DecodeError::BadBundle);
    }
    let mut pos = 16usize;
    while pos < buf.len() {
        let size = read_u32(buf, pos).ok_or(DecodeError::BadBundle)? as usize;
        let start = pos.checked_add(4).ok_or(DecodeError::BadBundle)?;
        let end = start
            .checked_add(size)
            .filter(|&e| e <= buf.len())
            .ok_or(DecodeError::BadBundle)?;
        let element = &buf[start..end];
        if bundle_p(element) {
            validate_bundle(element)?;
        } else {
            validate(element)?;
        }
        pos = end;
    }
    Ok(pos)
}
