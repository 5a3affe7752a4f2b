//! A bounded-memory, incremental Unicode transcoder. Source code units in UTF-8, UTF-16 or UTF-32
//! are fed one at a time, reassembled into codepoints, and re-encoded into a fixed-size,
//! caller-owned byte region in any of those encodings.
//!
//! Like a truncating `snprintf`, a [`TranscodeBuffer`] writes what fits and reports how much
//! didn't. The destination is null-terminated after every call and never holds part of a
//! codepoint.
//!
//! ```
//! use utf_buffer::{Encoding, TranscodeBuffer};
//!
//! let mut mem = [0; 32];
//! let mut buf = TranscodeBuffer::new(&mut mem, Encoding::Utf32).unwrap();
//! for b in [0xF0, 0x9F, 0xA6, 0x84] {
//!     buf.write_utf8(b).unwrap();
//! }
//! assert_eq!(buf.units().collect::<Vec<_>>(), [0x1F984]);
//! assert_eq!(buf.overflow(), 0);
//! ```
//!
//! ## Features
//!
//! - `utf16` (default): accept UTF-16 as a source and destination encoding
//! - `alloc`: the two-pass [`transcode`] helper
//! - `rand`: [`Encoding`] is a `Distribution<char>`
//! - `serde`: [`Encoding`] (de)serializes by name

#![no_std]
#![warn(
    elided_lifetimes_in_paths,
    missing_docs,
    clippy::cargo,
)]

#[cfg(feature = "alloc")]
extern crate alloc;

/// Report a violated internal invariant and panic. Never used for bad input.
macro_rules! fatal {
    ($($arg:tt)+) => {{
        log::error!("invariant violated: {}", format_args!($($arg)+));
        panic!("invariant violated: {}", format_args!($($arg)+))
    }};
}

macro_rules! invariant {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            fatal!("`{}`: {}", stringify!($cond), format_args!($($arg)+));
        }
    };
}

pub mod assemble;
pub mod buffer;
pub mod encode;
pub mod encoding;
pub mod err;

#[cfg(feature = "alloc")]
pub use buffer::transcode;
pub use buffer::TranscodeBuffer;
pub use encoding::Encoding;
pub use err::{ErrorKind, TranscodeError};
