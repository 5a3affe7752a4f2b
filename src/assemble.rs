//! Reassembly of source code units into whole codepoints.
//!
//! See also the [`Assembler`] type.

use arrayvec::ArrayVec;

use crate::encoding::Encoding;
use crate::err::TranscodeError;

const UTF8_LEAD_MASK: [u8; 4] = [0x7F, 0x1F, 0x0F, 0x07];

/// The outcome of feeding one code unit to an [`Assembler`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// The codepoint needs more units
    Pending,
    /// A codepoint was completed. The value is structurally decoded but not yet checked against
    /// the Unicode scalar value range.
    Complete(u32),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
enum State {
    #[default]
    Idle,
    Utf8 {
        units: ArrayVec<u8, 4>,
        expected: u8,
    },
    Utf16 {
        high: u16,
    },
}

/// A state machine collecting source code units until they form one codepoint. At most one
/// partial codepoint is held at a time, and once a unit of one encoding has been accepted, units
/// of another encoding are rejected until that codepoint completes.
///
/// Any rejected unit resets the assembler to idle.
#[derive(Clone, Debug, Default)]
pub struct Assembler {
    state: State,
}

impl Assembler {
    /// Create an idle assembler
    pub fn new() -> Assembler {
        Assembler::default()
    }

    /// The encoding of the partial codepoint currently held, or `None` if idle.
    pub fn pending(&self) -> Option<Encoding> {
        match self.state {
            State::Idle => None,
            State::Utf8 { .. } => Some(Encoding::Utf8),
            State::Utf16 { .. } => Some(Encoding::Utf16),
        }
    }

    /// Discard any partial codepoint.
    pub fn reset(&mut self) {
        self.state = State::Idle;
    }

    fn reject(&mut self, err: TranscodeError) -> Result<Step, TranscodeError> {
        log::debug!("rejecting source unit: {err}");
        self.reset();
        Err(err)
    }

    fn switch(&mut self, received: Encoding) -> Result<Step, TranscodeError> {
        let pending = match self.pending() {
            Some(pending) => pending,
            None => fatal!("encoding switch reported while idle"),
        };
        self.reject(TranscodeError::EncodingSwitch { pending, received })
    }

    /// Feed one UTF-8 byte.
    pub fn push_utf8(&mut self, byte: u8) -> Result<Step, TranscodeError> {
        let lead = byte.leading_ones();
        match &mut self.state {
            State::Idle => match lead {
                0 => Ok(Step::Complete(u32::from(byte))),
                2..=4 => {
                    let mut units = ArrayVec::new();
                    units.push(byte);
                    self.state = State::Utf8 {
                        units,
                        expected: lead as u8,
                    };
                    Ok(Step::Pending)
                }
                _ => self.reject(TranscodeError::InvalidLeadByte { byte }),
            },
            State::Utf8 { units, expected } => {
                if lead != 1 {
                    return self.reject(TranscodeError::ExpectedContinuation { byte });
                }
                invariant!(
                    units.try_push(byte).is_ok(),
                    "UTF-8 assembly holds {} of {} units",
                    units.len(),
                    expected
                );
                if units.len() < usize::from(*expected) {
                    return Ok(Step::Pending);
                }

                let value = decode_utf8(units);
                self.reset();
                Ok(Step::Complete(value))
            }
            State::Utf16 { .. } => self.switch(Encoding::Utf8),
        }
    }

    /// Feed one UTF-16 code unit.
    pub fn push_utf16(&mut self, unit: u16) -> Result<Step, TranscodeError> {
        match (&self.state, unit) {
            (State::Idle, 0xD800..=0xDBFF) => {
                self.state = State::Utf16 { high: unit };
                Ok(Step::Pending)
            }
            (State::Idle, 0xDC00..=0xDFFF) => {
                self.reject(TranscodeError::UnpairedLowSurrogate { unit })
            }
            (State::Idle, _) => Ok(Step::Complete(u32::from(unit))),
            (&State::Utf16 { high }, 0xDC00..=0xDFFF) => {
                self.reset();
                let high = u32::from(high - 0xD800) << 10;
                let low = u32::from(unit - 0xDC00);
                Ok(Step::Complete(0x10000 + high + low))
            }
            (&State::Utf16 { high }, _) => {
                self.reject(TranscodeError::ExpectedLowSurrogate { high, unit })
            }
            (State::Utf8 { .. }, _) => self.switch(Encoding::Utf16),
        }
    }

    /// Feed one UTF-32 code unit. Each unit is a whole codepoint.
    pub fn push_utf32(&mut self, unit: u32) -> Result<Step, TranscodeError> {
        match self.state {
            State::Idle => Ok(Step::Complete(unit)),
            _ => self.switch(Encoding::Utf32),
        }
    }
}

/// Combine a complete UTF-8 sequence, most significant unit first.
fn decode_utf8(units: &[u8]) -> u32 {
    let (lead, rest) = match units.split_first() {
        Some(split) => split,
        None => fatal!("decoding an empty UTF-8 sequence"),
    };
    let lead = u32::from(lead & UTF8_LEAD_MASK[rest.len()]);
    rest.iter()
        .fold(lead, |acc, unit| (acc << 6) | u32::from(unit & 0x3F))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_utf8(asm: &mut Assembler, bytes: &[u8]) -> Result<Step, TranscodeError> {
        let mut last = Ok(Step::Pending);
        for b in bytes {
            last = asm.push_utf8(*b);
        }
        last
    }

    #[test]
    fn test_utf8_lengths() {
        let mut asm = Assembler::new();
        assert_eq!(asm.push_utf8(b'a'), Ok(Step::Complete(0x61)));
        assert_eq!(feed_utf8(&mut asm, &[0xC3, 0xA9]), Ok(Step::Complete(0xE9)));
        assert_eq!(
            feed_utf8(&mut asm, &[0xE2, 0x82, 0xAC]),
            Ok(Step::Complete(0x20AC))
        );
        assert_eq!(
            feed_utf8(&mut asm, &[0xF0, 0x9F, 0xA6, 0x84]),
            Ok(Step::Complete(0x1F984))
        );
        assert_eq!(asm.pending(), None);
    }

    #[test]
    fn test_utf8_pending() {
        let mut asm = Assembler::new();
        assert_eq!(asm.push_utf8(0xF0), Ok(Step::Pending));
        assert_eq!(asm.pending(), Some(Encoding::Utf8));
        assert_eq!(asm.push_utf8(0x9F), Ok(Step::Pending));
        assert_eq!(asm.push_utf8(0xA6), Ok(Step::Pending));
        assert_eq!(asm.push_utf8(0x84), Ok(Step::Complete(0x1F984)));
        assert_eq!(asm.pending(), None);
    }

    #[test]
    fn test_utf8_invalid_lead() {
        let mut asm = Assembler::new();
        assert_eq!(
            asm.push_utf8(0x80),
            Err(TranscodeError::InvalidLeadByte { byte: 0x80 })
        );
        assert_eq!(
            asm.push_utf8(0xBF),
            Err(TranscodeError::InvalidLeadByte { byte: 0xBF })
        );
        assert_eq!(
            asm.push_utf8(0xF8),
            Err(TranscodeError::InvalidLeadByte { byte: 0xF8 })
        );
        assert_eq!(
            asm.push_utf8(0xFF),
            Err(TranscodeError::InvalidLeadByte { byte: 0xFF })
        );
        assert_eq!(asm.pending(), None);
    }

    #[test]
    fn test_utf8_missing_continuation() {
        let mut asm = Assembler::new();
        assert_eq!(asm.push_utf8(0xE2), Ok(Step::Pending));
        assert_eq!(
            asm.push_utf8(b'a'),
            Err(TranscodeError::ExpectedContinuation { byte: b'a' })
        );
        assert_eq!(asm.pending(), None);
        // A new lead byte while a sequence is open is rejected as well
        assert_eq!(asm.push_utf8(0xC3), Ok(Step::Pending));
        assert_eq!(
            asm.push_utf8(0xC3),
            Err(TranscodeError::ExpectedContinuation { byte: 0xC3 })
        );
        // And the assembler recovers afterwards
        assert_eq!(feed_utf8(&mut asm, &[0xC3, 0xA9]), Ok(Step::Complete(0xE9)));
    }

    #[test]
    fn test_utf16_pairs() {
        let mut asm = Assembler::new();
        assert_eq!(asm.push_utf16(0x41), Ok(Step::Complete(0x41)));
        assert_eq!(asm.push_utf16(0xFFFD), Ok(Step::Complete(0xFFFD)));
        assert_eq!(asm.push_utf16(0xD83E), Ok(Step::Pending));
        assert_eq!(asm.pending(), Some(Encoding::Utf16));
        assert_eq!(asm.push_utf16(0xDD84), Ok(Step::Complete(0x1F984)));
        assert_eq!(asm.push_utf16(0xDBFF), Ok(Step::Pending));
        assert_eq!(asm.push_utf16(0xDFFF), Ok(Step::Complete(0x10FFFF)));
    }

    #[test]
    fn test_utf16_unpaired() {
        let mut asm = Assembler::new();
        assert_eq!(
            asm.push_utf16(0xDC00),
            Err(TranscodeError::UnpairedLowSurrogate { unit: 0xDC00 })
        );
        assert_eq!(asm.push_utf16(0xD800), Ok(Step::Pending));
        assert_eq!(
            asm.push_utf16(0xD801),
            Err(TranscodeError::ExpectedLowSurrogate {
                high: 0xD800,
                unit: 0xD801,
            })
        );
        assert_eq!(asm.pending(), None);
        assert_eq!(asm.push_utf16(0xD800), Ok(Step::Pending));
        assert_eq!(
            asm.push_utf16(b'x'.into()),
            Err(TranscodeError::ExpectedLowSurrogate {
                high: 0xD800,
                unit: 0x78,
            })
        );
    }

    #[test]
    fn test_utf32_passthrough() {
        let mut asm = Assembler::new();
        assert_eq!(asm.push_utf32(0x1F984), Ok(Step::Complete(0x1F984)));
        // Range checks happen after assembly
        assert_eq!(asm.push_utf32(0xD800), Ok(Step::Complete(0xD800)));
        assert_eq!(asm.pending(), None);
    }

    #[test]
    fn test_encoding_switch() {
        let mut asm = Assembler::new();
        assert_eq!(asm.push_utf8(0xC3), Ok(Step::Pending));
        assert_eq!(
            asm.push_utf16(0x41),
            Err(TranscodeError::EncodingSwitch {
                pending: Encoding::Utf8,
                received: Encoding::Utf16,
            })
        );
        assert_eq!(asm.pending(), None);

        assert_eq!(asm.push_utf16(0xD83E), Ok(Step::Pending));
        assert_eq!(
            asm.push_utf32(0x41),
            Err(TranscodeError::EncodingSwitch {
                pending: Encoding::Utf16,
                received: Encoding::Utf32,
            })
        );
        assert_eq!(asm.push_utf16(0xD83E), Ok(Step::Pending));
        assert_eq!(
            asm.push_utf8(0x41),
            Err(TranscodeError::EncodingSwitch {
                pending: Encoding::Utf16,
                received: Encoding::Utf8,
            })
        );
        assert_eq!(asm.pending(), None);
    }
}
