//! **rosc_rt** is a realtime-safe implementation of the core of the
//! [OSC 1.0](http://opensoundcontrol.org/spec-1_0) protocol: a wire codec, an
//! address-pattern dispatcher, and a cross-thread message transport, all built
//! on caller-supplied fixed-size buffers.
//!
//! The crate is `#![no_std]` unconditionally, not merely behind a feature
//! flag: no operation reachable from [`encoder`], [`decoder`], [`dispatch`]
//! or [`threadlink`] allocates, locks, or blocks, regardless of which
//! features are enabled. The `std` feature (on by default) only adds
//! conveniences -- `std::error::Error` impls and [`types::OscTime`]
//! conversions to/from `std::time::SystemTime` -- that the core never calls
//! itself.

#![no_std]

#[cfg(feature = "std")]
extern crate std;

extern crate nom;

/// Crate specific error types.
mod errors;
/// OSC data types: the borrowed argument value, the OSC timetag, and shared constants.
mod types;
/// Shared internal helpers (4-byte padding arithmetic).
mod util;

pub use crate::errors::*;
pub use crate::types::*;

/// Address pattern matching, per the OSC address-pattern language.
pub mod address;
/// Read-only accessors over an encoded OSC message or bundle buffer.
pub mod decoder;
/// A statically describable tree of ports, dispatching a message to a handler.
pub mod dispatch;
/// Encodes an OSC message into a caller-supplied buffer.
pub mod encoder;
/// A pair of SPSC byte ring buffers carrying whole OSC messages between threads.
pub mod threadlink;
