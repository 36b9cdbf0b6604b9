use crate::types::{ArgValue, OscTime};
use crate::util::pad4;

/// A small, fixed-capacity cursor over a caller-supplied `&mut [u8]`.
///
/// Unlike the growing-`Vec<u8>` output most OSC encoders target, `Cursor`
/// never reallocates: every write checks remaining capacity first and fails
/// closed (`false`) instead of growing the buffer, so the encoder is usable
/// from a realtime thread with a stack- or static-allocated backing array.
struct Cursor<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Cursor { buf, pos: 0 }
    }

    #[must_use]
    fn write(&mut self, data: &[u8]) -> bool {
        let end = self.pos + data.len();
        if end > self.buf.len() {
            return false;
        }
        self.buf[self.pos..end].copy_from_slice(data);
        self.pos = end;
        true
    }

    #[must_use]
    fn pad_to_4(&mut self, written_since: usize) -> bool {
        let padding = pad4(written_since) - written_since;
        if padding == 0 {
            return true;
        }
        self.write(&[0u8; 4][..padding])
    }
}

/// Writes a complete OSC message into `buf`: address, type-tag string, then
/// argument payload, each 4-byte aligned per the OSC 1.0 wire format.
///
/// `tags` is consumed verbatim in the same order as `args`; a leading `,` in
/// `tags`, if present, is skipped (the wire-format comma is always written
/// once regardless). `args.len()` must equal the number of non-comma
/// characters in `tags`, or this returns `0`.
///
/// Returns the number of bytes written, or `0` if `buf` was not large enough
/// or `address`/`tags`/`args` are inconsistent. On a `0` return, the contents
/// of `buf` are unspecified -- callers must not inspect a partial write.
pub fn message(buf: &mut [u8], address: &str, tags: &str, args: &[ArgValue]) -> usize {
    if !address.starts_with('/') {
        return 0;
    }
    let tags = tags.strip_prefix(',').unwrap_or(tags);
    if tags.len() != args.len() {
        return 0;
    }

    let mut out = Cursor::new(buf);
    if encode_message(&mut out, address, tags, args) {
        out.pos
    } else {
        0
    }
}

fn encode_message(out: &mut Cursor, address: &str, tags: &str, args: &[ArgValue]) -> bool {
    let addr_start = out.pos;
    if !out.write(address.as_bytes()) || !out.write(&[0u8]) {
        return false;
    }
    if !out.pad_to_4(out.pos - addr_start) {
        return false;
    }

    let tags_start = out.pos;
    if !out.write(b",") {
        return false;
    }
    if !out.write(tags.as_bytes()) {
        return false;
    }
    if !out.write(&[0u8]) {
        return false;
    }
    if !out.pad_to_4(out.pos - tags_start) {
        return false;
    }

    for arg in args {
        if !encode_arg(out, arg) {
            return false;
        }
    }
    true
}

fn encode_arg(out: &mut Cursor, arg: &ArgValue) -> bool {
    let start = out.pos;
    let ok = match *arg {
        ArgValue::Int(v) => out.write(&v.to_be_bytes()),
        ArgValue::Float(v) => out.write(&v.to_be_bytes()),
        ArgValue::Long(v) => out.write(&v.to_be_bytes()),
        ArgValue::Double(v) => out.write(&v.to_be_bytes()),
        ArgValue::Char(v) => out.write(&(v as u32).to_be_bytes()),
        ArgValue::String(s) | ArgValue::Symbol(s) => return encode_string(out, s),
        ArgValue::Blob(bytes) => return encode_blob(out, bytes),
        ArgValue::Time(t) => return encode_time(out, t),
        ArgValue::Midi(m) => out.write(&[m.port, m.status, m.data1, m.data2]),
        ArgValue::Color(c) => out.write(&[c.red, c.green, c.blue, c.alpha]),
        ArgValue::Bool(_) | ArgValue::Nil | ArgValue::Inf => true,
    };
    ok && out.pad_to_4(out.pos - start)
}

fn encode_string(out: &mut Cursor, s: &str) -> bool {
    let start = out.pos;
    out.write(s.as_bytes()) && out.write(&[0u8]) && out.pad_to_4(out.pos - start)
}

fn encode_blob(out: &mut Cursor, bytes: &[u8]) -> bool {
    if bytes.len() > u32::MAX as usize {
        return false;
    }
    let start = out.pos;
    out.write(&(bytes.len() as u32).to_be_bytes())
        && out.write(bytes)
        && out.pad_to_4(out.pos - start)
}

fn encode_time(out: &mut Cursor, t: OscTime) -> bool {
    out.write(&t.seconds.to_be_bytes()) && out.write(&t.fractional.to_be_bytes())
}

/// Writes the `#bundle` header and timetag for a minimal bundle framing.
/// Returns the number of bytes written (always 16 on success), or `0` if
/// `buf` is too small. Full recursive bundle construction (nesting further
/// messages/bundles as size-prefixed elements) is left to the caller, who is
/// expected to append pre-encoded `(u32 size, message bytes)` pairs after
/// this header -- see [`crate::decoder::bundle_elements`] for the matching
/// read side.
pub fn bundle_header(buf: &mut [u8], timetag: OscTime) -> usize {
    let mut out = Cursor::new(buf);
    let ok = out.write(b"#bundle\0")
        && out.write(&timetag.seconds.to_be_bytes())
        && out.write(&timetag.fractional.to_be_bytes());
    if ok {
        out.pos
    } else {
        0
    }
}
