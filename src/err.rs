//! Errors produced while feeding source code units into a [`TranscodeBuffer`](crate::TranscodeBuffer).

use crate::encoding::Encoding;
use core::error::Error;
use core::fmt;

/// The broad class of a [`TranscodeError`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input was malformed, or an encoding was requested that this build doesn't accept.
    InvalidArgument,
    /// The requested source/destination combination isn't supported by this build.
    NotImplemented,
}

/// Error returned when a source code unit can't be accepted.
///
/// Every error leaves the buffer with no partial codepoint pending, so writing may continue
/// with the next unit. Truncation of the destination is never an error, see
/// [`TranscodeBuffer::overflow`](crate::TranscodeBuffer::overflow).
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum TranscodeError {
    /// The encoding tag isn't one of the supported encodings, or support for it was disabled
    UnsupportedEncoding {
        /// The raw tag that was rejected
        tag: u8,
    },
    /// A UTF-8 sequence started with a continuation byte or a byte that can't lead a sequence
    InvalidLeadByte {
        /// The rejected byte
        byte: u8,
    },
    /// A UTF-8 sequence was open, but the next byte wasn't a continuation byte
    ExpectedContinuation {
        /// The rejected byte
        byte: u8,
    },
    /// A UTF-16 low surrogate arrived with no high surrogate before it
    UnpairedLowSurrogate {
        /// The rejected unit
        unit: u16,
    },
    /// A UTF-16 high surrogate was pending, but the next unit wasn't a low surrogate
    ExpectedLowSurrogate {
        /// The pending high surrogate
        high: u16,
        /// The rejected unit
        unit: u16,
    },
    /// A unit of one source encoding arrived while a codepoint of another was being assembled
    EncodingSwitch {
        /// The encoding of the partial codepoint that was discarded
        pending: Encoding,
        /// The encoding of the rejected unit
        received: Encoding,
    },
    /// The assembled value isn't a Unicode scalar value
    InvalidCodepoint {
        /// The rejected value
        value: u32,
    },
    /// The source encoding isn't available in this build
    NotImplemented {
        /// The source encoding that was fed
        source: Encoding,
        /// The destination encoding of the buffer
        destination: Encoding,
    },
}

impl TranscodeError {
    /// The broad class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranscodeError::NotImplemented { .. } => ErrorKind::NotImplemented,
            _ => ErrorKind::InvalidArgument,
        }
    }
}

impl fmt::Display for TranscodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscodeError::UnsupportedEncoding { tag } => {
                write!(f, "unsupported encoding tag {tag}")
            }
            TranscodeError::InvalidLeadByte { byte } => {
                write!(f, "byte {byte:#04X} can't start a UTF-8 sequence")
            }
            TranscodeError::ExpectedContinuation { byte } => {
                write!(f, "expected UTF-8 continuation byte, found {byte:#04X}")
            }
            TranscodeError::UnpairedLowSurrogate { unit } => {
                write!(f, "low surrogate {unit:#06X} without a preceding high surrogate")
            }
            TranscodeError::ExpectedLowSurrogate { high, unit } => write!(
                f,
                "high surrogate {high:#06X} followed by {unit:#06X} instead of a low surrogate"
            ),
            TranscodeError::EncodingSwitch { pending, received } => write!(
                f,
                "{received} unit received while a {pending} codepoint was incomplete"
            ),
            TranscodeError::InvalidCodepoint { value } => {
                write!(f, "{value:#X} is not a Unicode scalar value")
            }
            TranscodeError::NotImplemented {
                source,
                destination,
            } => write!(f, "{source} to {destination} is not supported by this build"),
        }
    }
}

impl Error for TranscodeError {}

#[cfg(test)]
mod tests {
    use super::*;
    extern crate alloc;
    use alloc::string::ToString;

    #[test]
    fn test_kind() {
        assert_eq!(
            TranscodeError::InvalidLeadByte { byte: 0x80 }.kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            TranscodeError::UnsupportedEncoding { tag: 0 }.kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            TranscodeError::NotImplemented {
                source: Encoding::Utf16,
                destination: Encoding::Utf8,
            }
            .kind(),
            ErrorKind::NotImplemented
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            TranscodeError::InvalidLeadByte { byte: 0x80 }.to_string(),
            "byte 0x80 can't start a UTF-8 sequence"
        );
        assert_eq!(
            TranscodeError::ExpectedLowSurrogate {
                high: 0xD83E,
                unit: 0x0041,
            }
            .to_string(),
            "high surrogate 0xD83E followed by 0x0041 instead of a low surrogate"
        );
        assert_eq!(
            TranscodeError::EncodingSwitch {
                pending: Encoding::Utf8,
                received: Encoding::Utf16,
            }
            .to_string(),
            "UTF-16LE unit received while a UTF-8 codepoint was incomplete"
        );
    }
}
