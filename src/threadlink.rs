//! A pair of single-producer single-consumer byte ring buffers carrying
//! whole OSC messages between a realtime and a non-realtime thread.
//!
//! Each direction is a [`Ring`]: a fixed-capacity byte buffer (inline, sized
//! by a const generic, never boxed) framed so a reader never sees a message
//! split across the physical end of the array. The only synchronization is
//! a release/acquire pair of cursors per ring -- no locks, no allocation, no
//! blocking on either side.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::errors::LinkError;
use crate::types::ArgValue;

const HEADER_LEN: usize = 4;

fn read_u32(buf: &[u8], at: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[at..at + 4]);
    u32::from_ne_bytes(bytes)
}

fn write_u32(buf: &mut [u8], at: usize, v: u32) {
    buf[at..at + 4].copy_from_slice(&v.to_ne_bytes());
}

/// A framed SPSC byte ring of `CAP` bytes. Entries are `(u32 len)(len
/// bytes)`; a zero-length header is a wrap sentinel meaning "nothing more
/// fits before the physical end, resume reading at offset 0."
///
/// `head`/`tail` are monotonically increasing byte counts (never reset),
/// not positions -- the physical offset is always `count % CAP`. This is
/// what lets `used = head - tail` stay unambiguous even when the physical
/// read/write offsets coincide.
pub struct Ring<const CAP: usize> {
    buf: UnsafeCell<[u8; CAP]>,
    head: AtomicUsize,
    tail: AtomicUsize,
}

// SAFETY: exactly one thread ever writes bytes into `buf` (the owner of the
// `RingWriter`) and exactly one thread ever reads them (the owner of the
// `RingReader`). The reader only ever reads bytes in `[tail, head)`, which
// the writer has fully published (via a `Release` store to `head`) before
// they become visible; the writer only ever writes into `[head, tail+CAP)`,
// space the reader has already given back (via a `Release` store to
// `tail`). The two ranges never overlap.
unsafe impl<const CAP: usize> Sync for Ring<CAP> {}

impl<const CAP: usize> Ring<CAP> {
    pub const fn new() -> Self {
        Ring {
            buf: UnsafeCell::new([0u8; CAP]),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// `true` iff at least one complete message is waiting to be read.
    /// Safe to call from either end; does not disturb either cursor.
    pub fn has_next(&self) -> bool {
        self.head.load(Ordering::Acquire) != self.tail.load(Ordering::Acquire)
    }

    /// An approximate count of messages queued and not yet read. Walks the
    /// framed entries between a snapshot of `tail` and `head` without
    /// storing back to either cursor.
    pub fn pending(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let mut cursor = self.tail.load(Ordering::Acquire);
        let mut count = 0usize;
        while cursor != head {
            let pos = cursor % CAP;
            let contiguous = CAP - pos;
            if contiguous < HEADER_LEN {
                cursor += contiguous;
                continue;
            }
            let len = read_u32(unsafe { &*self.buf.get() }, pos) as usize;
            if len == 0 {
                cursor += contiguous;
                continue;
            }
            cursor += HEADER_LEN + len;
            count += 1;
        }
        count
    }
}

/// Writer-side cursor over one [`Ring`]. Exclusive to its owner: there is no
/// way to construct a second `RingWriter` over the same ring.
struct RingWriter<'a, const CAP: usize> {
    ring: &'a Ring<CAP>,
    head: usize,
}

impl<'a, const CAP: usize> RingWriter<'a, CAP> {
    fn new(ring: &'a Ring<CAP>) -> Self {
        RingWriter { ring, head: 0 }
    }

    fn write_bytes(&mut self, payload: &[u8]) -> Result<(), LinkError> {
        let needed = HEADER_LEN + payload.len();
        if needed > CAP {
            return Err(LinkError::TooLarge);
        }

        let tail = self.ring.tail.load(Ordering::Acquire);
        let mut free = CAP - (self.head - tail);
        let mut pos = self.head % CAP;
        let contiguous = CAP - pos;

        if contiguous < needed {
            if free < contiguous {
                return Err(LinkError::Dropped);
            }
            if contiguous >= HEADER_LEN {
                write_u32(unsafe { &mut *self.ring.buf.get() }, pos, 0);
            }
            free -= contiguous;
            self.head += contiguous;
            pos = 0;
        }

        if free < needed {
            return Err(LinkError::Dropped);
        }

        let buf = unsafe { &mut *self.ring.buf.get() };
        write_u32(buf, pos, payload.len() as u32);
        buf[pos + HEADER_LEN..pos + HEADER_LEN + payload.len()].copy_from_slice(payload);
        self.head += needed;
        self.ring.head.store(self.head, Ordering::Release);
        Ok(())
    }
}

/// Reader-side cursor over one [`Ring`]. Exclusive to its owner: there is no
/// way to construct a second `RingReader` over the same ring.
struct RingReader<'a, const CAP: usize> {
    ring: &'a Ring<CAP>,
    tail: usize,
}

impl<'a, const CAP: usize> RingReader<'a, CAP> {
    fn new(ring: &'a Ring<CAP>) -> Self {
        RingReader { ring, tail: 0 }
    }

    fn read(&mut self) -> Option<&'a [u8]> {
        loop {
            let head = self.ring.head.load(Ordering::Acquire);
            if self.tail == head {
                return None;
            }
            let pos = self.tail % CAP;
            let contiguous = CAP - pos;
            if contiguous < HEADER_LEN {
                self.tail += contiguous;
                self.ring.tail.store(self.tail, Ordering::Release);
                continue;
            }
            let len = read_u32(unsafe { &*self.ring.buf.get() }, pos) as usize;
            if len == 0 {
                self.tail += contiguous;
                self.ring.tail.store(self.tail, Ordering::Release);
                continue;
            }
            let data_start = pos + HEADER_LEN;
            let data = unsafe { &(*self.ring.buf.get())[data_start..data_start + len] };
            self.tail += HEADER_LEN + len;
            self.ring.tail.store(self.tail, Ordering::Release);
            return Some(data);
        }
    }
}

/// Two independent [`Ring`]s -- `up` (control-to-audio) and `down`
/// (audio-to-control) -- plus the max-message size used to size the
/// per-call encode scratch buffer. All storage is inline: a `ThreadLink` is
/// ordinarily placed in a `static` or constructed once at startup.
pub struct ThreadLink<const UP_CAP: usize, const DOWN_CAP: usize, const MAX_MSG: usize> {
    up: Ring<UP_CAP>,
    down: Ring<DOWN_CAP>,
    split: AtomicBool,
}

impl<const UP_CAP: usize, const DOWN_CAP: usize, const MAX_MSG: usize>
    ThreadLink<UP_CAP, DOWN_CAP, MAX_MSG>
{
    pub const fn new() -> Self {
        ThreadLink {
            up: Ring::new(),
            down: Ring::new(),
            split: AtomicBool::new(false),
        }
    }

    /// Splits the link into a [`ControlEnd`] (writes `up`, reads `down`) and
    /// an [`AudioEnd`] (reads `up`, writes `down`), each the sole writer or
    /// reader of its ring. Returns `None` if called more than once: the
    /// single-writer/single-reader discipline is enforced by construction,
    /// not by convention, and a second pair of ends would violate it.
    pub fn split(
        &self,
    ) -> Option<(
        ControlEnd<'_, UP_CAP, DOWN_CAP, MAX_MSG>,
        AudioEnd<'_, UP_CAP, DOWN_CAP, MAX_MSG>,
    )> {
        if self
            .split
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        Some((
            ControlEnd {
                writer: RingWriter::new(&self.up),
                reader: RingReader::new(&self.down),
            },
            AudioEnd {
                reader: RingReader::new(&self.up),
                writer: RingWriter::new(&self.down),
            },
        ))
    }
}

/// The non-realtime side of a [`ThreadLink`]: writes `up`, reads `down`.
pub struct ControlEnd<'a, const UP_CAP: usize, const DOWN_CAP: usize, const MAX_MSG: usize> {
    writer: RingWriter<'a, UP_CAP>,
    reader: RingReader<'a, DOWN_CAP>,
}

/// The realtime side of a [`ThreadLink`]: reads `up`, writes `down`. Must
/// never block; [`AudioEnd::write`] drops the message instead.
pub struct AudioEnd<'a, const UP_CAP: usize, const DOWN_CAP: usize, const MAX_MSG: usize> {
    reader: RingReader<'a, UP_CAP>,
    writer: RingWriter<'a, DOWN_CAP>,
}

macro_rules! impl_end {
    ($end:ident) => {
        impl<'a, const UP_CAP: usize, const DOWN_CAP: usize, const MAX_MSG: usize>
            $end<'a, UP_CAP, DOWN_CAP, MAX_MSG>
        {
            /// Encodes a message into a `MAX_MSG`-byte scratch buffer and
            /// publishes it, or returns `Err(LinkError::Dropped)` if there
            /// is no room (the call never blocks) or
            /// `Err(LinkError::TooLarge)` if it wouldn't fit even in an
            /// empty ring.
            pub fn write(
                &mut self,
                address: &str,
                tags: &str,
                args: &[ArgValue],
            ) -> Result<(), LinkError> {
                let mut scratch = [0u8; MAX_MSG];
                let len = crate::encoder::message(&mut scratch, address, tags, args);
                if len == 0 {
                    return Err(LinkError::TooLarge);
                }
                self.writer.write_bytes(&scratch[..len])
            }

            /// Returns the next complete message, or `None` if none is
            /// ready. The returned bytes stay valid until the next call to
            /// `read` on this same end.
            pub fn read(&mut self) -> Option<&'a [u8]> {
                self.reader.read()
            }

            pub fn has_next(&self) -> bool {
                self.reader.ring.has_next()
            }

            pub fn pending(&self) -> usize {
                self.reader.ring.pending()
            }
        }
    };
}

impl_end!(ControlEnd);
impl_end!(AudioEnd);
