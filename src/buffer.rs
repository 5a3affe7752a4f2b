//! The bounded, always-terminated destination buffer.
//!
//! See also the [`TranscodeBuffer`] type.

#[cfg(feature = "alloc")]
use alloc::vec;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;
use core::fmt;

use crate::assemble::{Assembler, Step};
use crate::encode::{encode, encoded_units};
use crate::encoding::Encoding;
use crate::err::TranscodeError;

/// A transcoder writing into a fixed, caller-owned byte region.
///
/// Source code units are fed one at a time (or in bulk) in any of the supported encodings.
/// Once they form a whole codepoint, it is re-encoded into the buffer's destination encoding and
/// appended if it fits. The destination is null-terminated with one zero code unit at all times,
/// and never contains part of a codepoint.
///
/// Whatever doesn't fit is counted instead of written: [`overflow`](Self::overflow) reports how
/// many more bytes the destination would have needed. A buffer with no room for even the
/// terminator is a pure size calculator, see [`counting`](Self::counting).
///
/// ```
/// use utf_buffer::{Encoding, TranscodeBuffer};
///
/// let mut mem = [0xFF; 3];
/// let mut buf = TranscodeBuffer::new(&mut mem, Encoding::Utf8).unwrap();
/// buf.push_str("éa").unwrap();
///
/// assert_eq!(buf.as_bytes_with_nul(), &[0xC3, 0xA9, 0x00]);
/// assert_eq!(buf.overflow(), 1);
/// ```
pub struct TranscodeBuffer<'a> {
    dest: &'a mut [u8],
    /// End of the current terminator, zero if it never fit
    pos: usize,
    encoding: Encoding,
    overflow: usize,
    assembler: Assembler,
}

impl<'a> TranscodeBuffer<'a> {
    /// Bind a buffer to `dest`, writing the initial terminator if there is room for it.
    ///
    /// Fails if `encoding` isn't enabled in this build.
    pub fn new(
        dest: &'a mut [u8],
        encoding: Encoding,
    ) -> Result<TranscodeBuffer<'a>, TranscodeError> {
        if !encoding.is_enabled() {
            log::debug!("refusing buffer with disabled encoding {encoding}");
            return Err(TranscodeError::UnsupportedEncoding {
                tag: encoding.tag(),
            });
        }

        let mut buf = TranscodeBuffer {
            dest,
            pos: 0,
            encoding,
            overflow: 0,
            assembler: Assembler::new(),
        };
        buf.write_terminator();
        Ok(buf)
    }

    /// Bind a buffer to `dest` using a raw encoding tag, see [`Encoding::tag`].
    pub fn with_tag(dest: &'a mut [u8], tag: u8) -> Result<TranscodeBuffer<'a>, TranscodeError> {
        TranscodeBuffer::new(dest, Encoding::try_from(tag)?)
    }

    /// A buffer with no destination at all. All input is still validated, but nothing is written,
    /// and [`overflow`](Self::overflow) ends up as the exact number of bytes required to hold the
    /// output, terminator included.
    pub fn counting(encoding: Encoding) -> Result<TranscodeBuffer<'a>, TranscodeError> {
        TranscodeBuffer::new(&mut [], encoding)
    }

    fn write_terminator(&mut self) {
        let width = self.encoding.unit_width();
        if width <= self.dest.len() {
            self.dest[..width].fill(0);
            self.pos = width;
        } else {
            self.add_overflow(width - self.dest.len());
        }
    }

    fn add_overflow(&mut self, len: usize) {
        if self.overflow == 0 {
            log::trace!(
                "{} buffer of {} bytes truncated",
                self.encoding,
                self.dest.len()
            );
        }
        self.overflow += len;
    }

    /// Append whole code units, moving the terminator behind them. Units that don't fit in the
    /// space left are counted by their excess. If not even the terminator fit, they are counted
    /// in full.
    fn append(&mut self, bytes: &[u8]) {
        let width = self.encoding.unit_width();
        let required = bytes.len();
        let available = self.dest.len() - self.pos;
        invariant!(
            required % width == 0,
            "{required} bytes aren't whole {} units",
            self.encoding
        );

        if self.pos == 0 {
            self.add_overflow(required);
        } else if required > available {
            self.add_overflow(required - available);
        } else {
            invariant!(
                self.pos >= width,
                "terminator at {} is shorter than a unit",
                self.pos
            );
            let start = self.pos - width;
            self.dest[start..start + required].copy_from_slice(bytes);
            self.dest[start + required..self.pos + required].fill(0);
            self.pos += required;
        }
    }

    fn emit(&mut self, step: Step) -> Result<(), TranscodeError> {
        let value = match step {
            Step::Pending => return Ok(()),
            Step::Complete(value) => value,
        };
        let c = char::from_u32(value).ok_or_else(|| {
            log::debug!("rejecting codepoint {value:#X}");
            TranscodeError::InvalidCodepoint { value }
        })?;
        let encoded = encode(c, self.encoding);
        let units = encoded_units(c, self.encoding);
        invariant!(
            units <= self.encoding.max_units()
                && encoded.len() == units * self.encoding.unit_width(),
            "{c:?} encoded as {} bytes",
            encoded.len()
        );
        self.append(&encoded);
        Ok(())
    }

    /// Feed one UTF-8 byte.
    pub fn write_utf8(&mut self, byte: u8) -> Result<(), TranscodeError> {
        let step = self.assembler.push_utf8(byte)?;
        self.emit(step)
    }

    /// Feed one UTF-16 code unit.
    ///
    /// Without the `utf16` feature this fails with [`TranscodeError::NotImplemented`] and leaves
    /// the buffer untouched.
    pub fn write_utf16(&mut self, unit: u16) -> Result<(), TranscodeError> {
        if !Encoding::Utf16.is_enabled() {
            return Err(TranscodeError::NotImplemented {
                source: Encoding::Utf16,
                destination: self.encoding,
            });
        }
        let step = self.assembler.push_utf16(unit)?;
        self.emit(step)
    }

    /// Feed one UTF-32 code unit.
    pub fn write_utf32(&mut self, unit: u32) -> Result<(), TranscodeError> {
        let step = self.assembler.push_utf32(unit)?;
        self.emit(step)
    }

    fn write_units<T: Copy>(
        &mut self,
        units: &[T],
        mut write: impl FnMut(&mut Self, T) -> Result<(), TranscodeError>,
    ) -> Result<(), TranscodeError> {
        let counting = self.is_counting();
        for unit in units {
            // Once truncated, a real buffer discards the rest of the input
            if !counting && self.overflow > 0 {
                self.assembler.reset();
                break;
            }
            write(self, *unit)?;
        }
        Ok(())
    }

    /// Feed a sequence of UTF-8 bytes, stopping early once the destination has been truncated.
    pub fn write_utf8_units(&mut self, units: &[u8]) -> Result<(), TranscodeError> {
        self.write_units(units, Self::write_utf8)
    }

    /// Feed a sequence of UTF-16 code units, stopping early once the destination has been
    /// truncated.
    pub fn write_utf16_units(&mut self, units: &[u16]) -> Result<(), TranscodeError> {
        self.write_units(units, Self::write_utf16)
    }

    /// Feed a sequence of UTF-32 code units, stopping early once the destination has been
    /// truncated.
    pub fn write_utf32_units(&mut self, units: &[u32]) -> Result<(), TranscodeError> {
        self.write_units(units, Self::write_utf32)
    }

    /// Feed a whole string.
    pub fn push_str(&mut self, s: &str) -> Result<(), TranscodeError> {
        self.write_utf8_units(s.as_bytes())
    }

    /// The destination encoding.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Size of the destination region in bytes.
    pub fn capacity(&self) -> usize {
        self.dest.len()
    }

    /// Bytes written so far, not counting the terminator.
    pub fn len(&self) -> usize {
        self.pos.saturating_sub(self.encoding.unit_width())
    }

    /// Whether nothing has been written besides the terminator.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many bytes beyond [`capacity`](Self::capacity) would have been needed to hold
    /// everything written so far, terminator included. Zero means nothing was truncated.
    pub fn overflow(&self) -> usize {
        self.overflow
    }

    /// Whether any output has been dropped for lack of space.
    pub fn is_truncated(&self) -> bool {
        self.overflow > 0
    }

    /// Whether this buffer only counts bytes, having no room at all.
    pub fn is_counting(&self) -> bool {
        self.dest.is_empty()
    }

    /// Whether a partial codepoint is waiting for more units.
    pub fn is_pending(&self) -> bool {
        self.assembler.pending().is_some()
    }

    /// The written content, without the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.dest[..self.len()]
    }

    /// The written content, including the terminator. Empty if the terminator never fit.
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.dest[..self.pos]
    }

    /// The written content as a `str`, if the destination encoding is UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self.encoding {
            Encoding::Utf8 => core::str::from_utf8(self.as_bytes()).ok(),
            _ => None,
        }
    }

    /// The written content as destination code units, without the terminator.
    pub fn units(&self) -> impl Iterator<Item = u32> + '_ {
        let width = self.encoding.unit_width();
        self.as_bytes().chunks_exact(width).map(move |unit| match width {
            1 => u32::from(unit[0]),
            2 => u32::from(u16::from_le(bytemuck::pod_read_unaligned(unit))),
            _ => u32::from_le(bytemuck::pod_read_unaligned(unit)),
        })
    }
}

impl fmt::Write for TranscodeBuffer<'_> {
    /// Truncation is silent. Formatting only fails if a partial codepoint of another encoding
    /// is pending on a buffer that still has room.
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s).map_err(|_| fmt::Error)
    }
}

impl fmt::Debug for TranscodeBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscodeBuffer")
            .field("encoding", &self.encoding)
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("overflow", &self.overflow)
            .field("pending", &self.assembler.pending())
            .finish()
    }
}

/// Run `feed` against a buffer twice: once to measure, then into an allocation of exactly the
/// required size. Returns the null-terminated output.
///
/// ```
/// use utf_buffer::{transcode, Encoding};
///
/// let out = transcode(Encoding::Utf16, |buf| buf.push_str("hi")).unwrap();
/// assert_eq!(out, [b'h', 0, b'i', 0, 0, 0]);
/// ```
#[cfg(feature = "alloc")]
pub fn transcode<F>(encoding: Encoding, mut feed: F) -> Result<Vec<u8>, TranscodeError>
where
    F: FnMut(&mut TranscodeBuffer<'_>) -> Result<(), TranscodeError>,
{
    let mut counter = TranscodeBuffer::counting(encoding)?;
    feed(&mut counter)?;
    let required = counter.overflow();

    let mut out = vec![0; required];
    let mut buf = TranscodeBuffer::new(&mut out, encoding)?;
    feed(&mut buf)?;
    invariant!(
        buf.overflow() == 0,
        "second pass overflowed a measured buffer of {required} bytes by {}",
        buf.overflow()
    );
    Ok(out)
}

/// Declare a buffer backed by fresh stack storage of `size` bytes. Construction errors are
/// propagated with `?`.
///
/// ```
/// use utf_buffer::{local_buffer, Encoding};
///
/// # fn main() -> Result<(), utf_buffer::TranscodeError> {
/// local_buffer!(buf, 8, Encoding::Utf8);
/// buf.push_str("abc")?;
/// assert_eq!(buf.as_str(), Some("abc"));
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! local_buffer {
    ($name:ident, $size:expr, $enc:expr) => {
        let mut storage = [0u8; $size];
        let mut $name = $crate::TranscodeBuffer::new(&mut storage, $enc)?;
    };
}
