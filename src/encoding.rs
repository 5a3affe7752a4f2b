//! Static facts about the supported encodings. This module provides the [`Encoding`] descriptor,
//! which is used both to pick the destination of a [`TranscodeBuffer`](crate::TranscodeBuffer) and
//! to tag the source units fed into it.

use arrayvec::ArrayVec;
use core::error::Error;
use core::fmt;
use core::str::FromStr;
#[cfg(feature = "rand")]
use rand::{distr::Distribution, Rng};

use crate::err::TranscodeError;

/// One of the Unicode transformation formats a buffer can read or write. Multi-byte code units are
/// always little-endian.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// [UTF-8](https://en.wikipedia.org/wiki/UTF-8), one byte per code unit
    Utf8,
    /// [UTF-16LE](https://en.wikipedia.org/wiki/UTF-16#Byte-order_encoding_schemes), two bytes
    /// per code unit
    Utf16,
    /// [UTF-32LE](https://en.wikipedia.org/wiki/UTF-32), four bytes per code unit
    Utf32,
}

const NAMES: phf::Map<&'static str, Encoding> = phf::phf_map! {
    "utf8" => Encoding::Utf8,
    "utf-8" => Encoding::Utf8,
    "utf16" => Encoding::Utf16,
    "utf-16" => Encoding::Utf16,
    "utf16le" => Encoding::Utf16,
    "utf-16le" => Encoding::Utf16,
    "utf32" => Encoding::Utf32,
    "utf-32" => Encoding::Utf32,
    "utf32le" => Encoding::Utf32,
    "utf-32le" => Encoding::Utf32,
};

impl Encoding {
    /// All encodings, in tag order.
    pub const ALL: [Encoding; 3] = [Encoding::Utf8, Encoding::Utf16, Encoding::Utf32];

    /// The raw tag of this encoding: 1 for UTF-8, 2 for UTF-16, 3 for UTF-32. 0 is reserved for
    /// "no encoding".
    pub const fn tag(self) -> u8 {
        match self {
            Encoding::Utf8 => 1,
            Encoding::Utf16 => 2,
            Encoding::Utf32 => 3,
        }
    }

    /// Width of a single code unit in bytes.
    pub const fn unit_width(self) -> usize {
        1 << (self.tag() - 1)
    }

    /// The most code units a single codepoint may need in this encoding.
    pub const fn max_units(self) -> usize {
        4 / self.unit_width()
    }

    /// The short lowercase name of this encoding.
    pub const fn shorthand(self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf8",
            Encoding::Utf16 => "utf16le",
            Encoding::Utf32 => "utf32le",
        }
    }

    /// Whether this build accepts the encoding. UTF-16 is only available with the `utf16`
    /// feature.
    pub const fn is_enabled(self) -> bool {
        match self {
            Encoding::Utf16 => cfg!(feature = "utf16"),
            _ => true,
        }
    }
}

impl TryFrom<u8> for Encoding {
    type Error = TranscodeError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            1 => Ok(Encoding::Utf8),
            2 => Ok(Encoding::Utf16),
            3 => Ok(Encoding::Utf32),
            _ => Err(TranscodeError::UnsupportedEncoding { tag }),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Utf16 => "UTF-16LE",
            Encoding::Utf32 => "UTF-32LE",
        })
    }
}

/// Error returned when parsing an [`Encoding`] from an unknown name.
#[non_exhaustive]
#[derive(Debug, PartialEq)]
pub struct UnknownEncoding;

impl fmt::Display for UnknownEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown encoding name")
    }
}

impl Error for UnknownEncoding {}

impl FromStr for Encoding {
    type Err = UnknownEncoding;

    /// Parse an encoding name such as `utf-8` or `UTF16LE`, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lower = ArrayVec::<u8, 8>::new();
        for b in s.bytes() {
            lower
                .try_push(b.to_ascii_lowercase())
                .map_err(|_| UnknownEncoding)?;
        }
        let lower = core::str::from_utf8(&lower).map_err(|_| UnknownEncoding)?;
        NAMES.get(lower).copied().ok_or(UnknownEncoding)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Encoding {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.shorthand())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Encoding {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NameVisitor;

        impl serde::de::Visitor<'_> for NameVisitor {
            type Value = Encoding;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a UTF encoding name")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Encoding, E> {
                v.parse()
                    .map_err(|_| E::invalid_value(serde::de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_str(NameVisitor)
    }
}

#[cfg(feature = "rand")]
impl Distribution<char> for Encoding {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> char {
        rng.random::<char>()
    }
}
