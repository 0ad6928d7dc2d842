//! Program Image serialization.
//!
//! An image is one contiguous stream of hexadecimal digit pairs with no
//! separators; each pair is one byte, most significant digit first, zero
//! padded. [`encode`] writes lowercase digits, [`decode`] accepts either
//! case.
//!
//! # Examples
//!
//! ```
//! # use t8_base::image;
//! let image = image::encode(&[0x34, 0x05, 0x00]);
//! assert_eq!(image, "340500");
//!
//! assert_eq!(image::decode(&image), Ok(vec![0x34, 0x05, 0x00]));
//! ```

use core::fmt::{self, Write};
use alloc::{string::String, vec::Vec};

/// Serializes raw program bytes to a hex digit stream.
pub fn encode(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);

    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }

    s
}

/// Decodes a hex digit stream back to raw program bytes.
///
/// The stream is consumed two digits at a time; an odd-length stream or a
/// non-hex character is an [`ImageError`] positioned at the offending digit.
pub fn decode(hex: &str) -> Result<Vec<u8>, ImageError> {
    let digits = hex.as_bytes();

    if digits.len() % 2 != 0 {
        return Err(ImageError {
            pos: digits.len() - 1,
            kind: ImageErrorKind::TruncatedByte,
        });
    }

    let mut bytes = Vec::with_capacity(digits.len() / 2);
    for (i, pair) in digits.chunks_exact(2).enumerate() {
        let (Some(hi), Some(lo)) = (digit(pair[0]), digit(pair[1])) else {
            let off = if digit(pair[0]).is_none() { 0 } else { 1 };

            return Err(ImageError {
                pos: i * 2 + off,
                kind: ImageErrorKind::InvalidDigit(pair[off]),
            });
        };
        bytes.push(hi << 4 | lo);
    }

    Ok(bytes)
}

const fn digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Represents an error that may occur while decoding an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageError {
    pub pos: usize,
    pub kind: ImageErrorKind,
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)?;
        write!(f, " at digit {}", self.pos)
    }
}
#[cfg(not(feature = "no-std"))]
impl std::error::Error for ImageError {}

/// Kind of image decode error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageErrorKind {
    /// Odd number of digits, the last byte is incomplete
    TruncatedByte,
    /// Character outside `0-9a-fA-F`
    InvalidDigit(u8),
}

impl fmt::Display for ImageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TruncatedByte => write!(f, "truncated byte"),
            Self::InvalidDigit(c) => write!(f, "invalid hex digit `{}`", *c as char),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::{vec, vec::Vec};
    use super::*;

    #[test]
    fn encode_pads_and_concatenates() {
        assert_eq!(encode(&[]), "");
        assert_eq!(encode(&[0x00]), "00");
        assert_eq!(encode(&[0x0F, 0xD0, 0x0A]), "0fd00a");
    }

    #[test]
    fn decode_accepts_both_cases() {
        assert_eq!(decode(""), Ok(vec![]));
        assert_eq!(decode("0fd00a"), Ok(vec![0x0F, 0xD0, 0x0A]));
        assert_eq!(decode("0FD00A"), Ok(vec![0x0F, 0xD0, 0x0A]));
    }

    #[test]
    fn roundtrip() {
        let bytes: Vec<u8> = (0..=255).collect();

        assert_eq!(decode(&encode(&bytes)), Ok(bytes));
    }

    #[test]
    fn erroneous_streams() {
        #[rustfmt::skip]
        let cases: &[(&str, usize, ImageErrorKind)] = &[
            ("0",      0, ImageErrorKind::TruncatedByte),
            ("00d",    2, ImageErrorKind::TruncatedByte),
            ("0g",     1, ImageErrorKind::InvalidDigit(b'g')),
            ("00 1",   2, ImageErrorKind::InvalidDigit(b' ')),
            ("x0",     0, ImageErrorKind::InvalidDigit(b'x')),
        ];

        for (stream, pos, kind) in cases {
            assert_eq!(
                decode(stream),
                Err(ImageError { pos: *pos, kind: *kind }),
                "stream: `{stream}`"
            );
        }
    }
}
