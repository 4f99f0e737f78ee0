//! 128-bit GUID value with mixed-endian byte layout.

use std::fmt;
use std::str::FromStr;

use crate::error::JsonError;

/// A GUID stored as its 16 wire bytes.
///
/// The first three groups (`u32`, `u16`, `u16`) are little-endian on the wire,
/// the trailing eight bytes are stored as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Guid(pub [u8; 16]);

impl Guid {
    pub const LENGTH: usize = 16;
    /// Length of the dashed text form.
    pub const TEXT_LENGTH: usize = 36;

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Guid(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

/// Hex digit positions in the dashed text form, mapped to wire byte indexes.
const TEXT_BYTE_ORDER: [usize; 16] = [3, 2, 1, 0, 5, 4, 7, 6, 8, 9, 10, 11, 12, 13, 14, 15];

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &idx) in TEXT_BYTE_ORDER.iter().enumerate() {
            if matches!(i, 4 | 6 | 8 | 10) {
                f.write_str("-")?;
            }
            write!(f, "{:02x}", self.0[idx])?;
        }
        Ok(())
    }
}

impl FromStr for Guid {
    type Err = JsonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.as_bytes();
        if text.len() != Self::TEXT_LENGTH {
            return Err(JsonError::InvalidGuid);
        }
        let mut digits = [0u8; 32];
        let mut n = 0;
        for (i, &c) in text.iter().enumerate() {
            if matches!(i, 8 | 13 | 18 | 23) {
                if c != b'-' {
                    return Err(JsonError::InvalidGuid);
                }
                continue;
            }
            digits[n] = hex_value(c).ok_or(JsonError::InvalidGuid)?;
            n += 1;
        }
        let mut bytes = [0u8; 16];
        for (i, &idx) in TEXT_BYTE_ORDER.iter().enumerate() {
            bytes[idx] = (digits[i * 2] << 4) | digits[i * 2 + 1];
        }
        Ok(Guid(bytes))
    }
}

pub(crate) fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}
