//! Re-encoding of a single codepoint into a destination encoding.

use arrayvec::ArrayVec;

use crate::encoding::Encoding;

const UTF8_LEAD_BITS: [u8; 4] = [0x00, 0xC0, 0xE0, 0xF0];

/// The destination bytes of one codepoint, little-endian for multi-byte units.
pub type Encoded = ArrayVec<u8, 4>;

/// Encode `c` as a sequence of `encoding` code units.
pub fn encode(c: char, encoding: Encoding) -> Encoded {
    let mut out = ArrayVec::new();
    match encoding {
        Encoding::Utf8 => encode_utf8(c as u32, &mut out),
        Encoding::Utf16 => encode_utf16(c as u32, &mut out),
        Encoding::Utf32 => out.extend((c as u32).to_le_bytes()),
    }
    out
}

/// The number of code units `c` occupies in `encoding`.
pub fn encoded_units(c: char, encoding: Encoding) -> usize {
    match encoding {
        Encoding::Utf8 => utf8_len(c as u32),
        Encoding::Utf16 => {
            if c as u32 > 0xFFFF {
                2
            } else {
                1
            }
        }
        Encoding::Utf32 => 1,
    }
}

fn utf8_len(cp: u32) -> usize {
    match cp {
        ..=0x7F => 1,
        0x80..=0x7FF => 2,
        0x800..=0xFFFF => 3,
        _ => 4,
    }
}

fn encode_utf8(cp: u32, out: &mut Encoded) {
    let len = utf8_len(cp);
    let mut bytes = [0; 4];
    let mut rest = cp;
    // Continuation units are filled from the end backward
    for b in bytes[1..len].iter_mut().rev() {
        *b = 0x80 | (rest & 0x3F) as u8;
        rest >>= 6;
    }
    bytes[0] = UTF8_LEAD_BITS[len - 1] | rest as u8;
    out.extend(bytes[..len].iter().copied());
}

fn encode_utf16(cp: u32, out: &mut Encoded) {
    if cp <= 0xFFFF {
        out.extend((cp as u16).to_le_bytes());
    } else {
        let v = cp - 0x10000;
        let high = 0xD800 | (v >> 10) as u16;
        let low = 0xDC00 | (v & 0x3FF) as u16;
        out.extend(high.to_le_bytes());
        out.extend(low.to_le_bytes());
    }
}
