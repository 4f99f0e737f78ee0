//! Pattern-compressed string encodings.
//!
//! Covers GUID text (lowercase, uppercase, double-quoted lowercase), the
//! fixed 16-symbol alphabets (date-time, lowercase hex, uppercase hex) packed
//! as nibbles, and general ASCII strings bit-packed at 4 to 7 bits per char
//! relative to a base character.

use docjson_buffers::Writer;

use super::type_marker::*;
use crate::error::{JsonError, Result};
use crate::guid::hex_value;

pub const GUID_LENGTH: usize = 36;
pub const GUID_WITH_QUOTES_LENGTH: usize = GUID_LENGTH + 2;
pub const ENCODED_GUID_LENGTH: usize = 17;

const MIN_4_BIT_CHARSET_LENGTH: usize = 16;
const MIN_PACKED_4_LENGTH: usize = 24;
const MIN_PACKED_5_LENGTH: usize = 32;
const MIN_PACKED_6_LENGTH: usize = 40;
const MIN_PACKED_7_LENGTH: usize = 88;

const DATE_TIME_CHARS: &[u8; 16] = b" -.0123456789:TZ";
const LOWERCASE_HEX_CHARS: &[u8; 16] = b"0123456789abcdef";
const UPPERCASE_HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";

/// Bytes needed to pack `length` characters at `bits` bits each.
pub fn packed_length(length: usize, bits: usize) -> usize {
    (length * bits + 7) / 8
}

/// Packs a 36-character dashed GUID into 16 bytes, two hex digits per byte
/// with the first digit in the low nibble. Returns the marker (lowercase or
/// uppercase) and the packed bytes; mixed-case input is rejected.
pub fn encode_guid_string(value: &[u8]) -> Option<(u8, [u8; 16])> {
    if value.len() < GUID_LENGTH {
        return None;
    }
    let mut out = [0u8; 16];
    let mut lower = false;
    let mut upper = false;
    let mut nibble = 0usize;
    for (index, &c) in value[..GUID_LENGTH].iter().enumerate() {
        if matches!(index, 8 | 13 | 18 | 23) {
            if c != b'-' {
                return None;
            }
            continue;
        }
        match c {
            b'a'..=b'f' => lower = true,
            b'A'..=b'F' => upper = true,
            b'0'..=b'9' => {}
            _ => return None,
        }
        let digit = hex_value(c)?;
        if nibble % 2 == 0 {
            out[nibble / 2] = digit;
        } else {
            out[nibble / 2] |= digit << 4;
        }
        nibble += 1;
    }
    match (lower, upper) {
        (_, false) => Some((LOWERCASE_GUID_STRING, out)),
        (false, true) => Some((UPPERCASE_GUID_STRING, out)),
        (true, true) => None,
    }
}

fn decode_guid_string(packed: &[u8], uppercase: bool, out: &mut Vec<u8>) {
    let table = if uppercase { UPPERCASE_HEX_CHARS } else { LOWERCASE_HEX_CHARS };
    for (i, &b) in packed.iter().enumerate() {
        if matches!(i, 4 | 6 | 8 | 10) {
            out.push(b'-');
        }
        out.push(table[(b & 0x0F) as usize]);
        out.push(table[(b >> 4) as usize]);
    }
}

fn charset_index(table: &[u8; 16], c: u8) -> Option<u8> {
    table.iter().position(|&t| t == c).map(|i| i as u8)
}

fn is_subset(table: &[u8; 16], charset: &[bool; 128]) -> bool {
    charset
        .iter()
        .enumerate()
        .all(|(c, &present)| !present || table.contains(&(c as u8)))
}

/// Tries every compressed form in priority order and appends the first that
/// applies. Returns `false`, writing nothing, when the value is not eligible.
pub fn try_encode_compressed_string(value: &[u8], writer: &mut Writer) -> bool {
    if value.len() < MIN_4_BIT_CHARSET_LENGTH {
        return false;
    }
    let mut charset = [false; 128];
    let mut first = 128usize;
    let mut last = 0usize;
    let mut count = 0usize;
    for &c in value {
        if c >= 128 {
            return false;
        }
        if !charset[c as usize] {
            charset[c as usize] = true;
            count += 1;
            first = first.min(c as usize);
            last = last.max(c as usize);
        }
    }
    let range = last - first + 1;
    let len = value.len();

    if len <= 0xFF && count <= 16 {
        for (marker, table) in [
            (COMPRESSED_DATE_TIME_STRING, DATE_TIME_CHARS),
            (COMPRESSED_LOWERCASE_HEX_STRING, LOWERCASE_HEX_CHARS),
            (COMPRESSED_UPPERCASE_HEX_STRING, UPPERCASE_HEX_CHARS),
        ] {
            if is_subset(table, &charset) {
                encode_4_bit_charset(marker, table, value, writer);
                return true;
            }
        }
    }
    if len <= 0xFF {
        let base = first as u8;
        if range <= 16 && len >= MIN_PACKED_4_LENGTH {
            encode_packed(PACKED_4_BIT_STRING, 4, Some(base), value, writer);
            return true;
        }
        if range <= 32 && len >= MIN_PACKED_5_LENGTH {
            encode_packed(PACKED_5_BIT_STRING, 5, Some(base), value, writer);
            return true;
        }
        if range <= 64 && len >= MIN_PACKED_6_LENGTH {
            encode_packed(PACKED_6_BIT_STRING, 6, Some(base), value, writer);
            return true;
        }
    }
    if len >= MIN_PACKED_7_LENGTH {
        if len <= 0xFF {
            encode_packed(PACKED_7_BIT_STRING_LENGTH_1, 7, None, value, writer);
            return true;
        }
        if len <= 0xFFFF {
            encode_packed(PACKED_7_BIT_STRING_LENGTH_2, 7, None, value, writer);
            return true;
        }
    }
    false
}

fn encode_4_bit_charset(marker: u8, table: &[u8; 16], value: &[u8], writer: &mut Writer) {
    writer.u8(marker);
    writer.u8(value.len() as u8);
    for pair in value.chunks(2) {
        let low = charset_index(table, pair[0]).unwrap_or(0);
        let high = pair.get(1).and_then(|&c| charset_index(table, c)).unwrap_or(0);
        writer.u8(low | (high << 4));
    }
}

fn encode_packed(marker: u8, bits: usize, base: Option<u8>, value: &[u8], writer: &mut Writer) {
    writer.u8(marker);
    if marker == PACKED_7_BIT_STRING_LENGTH_2 {
        writer.u16(value.len() as u16);
    } else {
        writer.u8(value.len() as u8);
    }
    let base_char = base.unwrap_or(0);
    if let Some(b) = base {
        writer.u8(b);
    }
    let mut remaining = packed_length(value.len(), bits);
    for chunk in value.chunks(8) {
        let mut packed = 0u64;
        for (i, &c) in chunk.iter().enumerate() {
            packed |= ((c - base_char) as u64) << (i * bits);
        }
        let take = bits.min(remaining);
        writer.buf(&packed.to_le_bytes()[..take]);
        remaining -= take;
    }
}

/// Total size in bytes (marker included) of the compressed string at the start of `token`.
pub fn compressed_string_length(token: &[u8]) -> Result<usize> {
    let marker = *token.first().ok_or(JsonError::UnexpectedEndOfBuffer(0))?;
    let byte = |i: usize| token.get(i).copied().ok_or(JsonError::UnexpectedEndOfBuffer(i));
    Ok(match marker {
        LOWERCASE_GUID_STRING | UPPERCASE_GUID_STRING | DOUBLE_QUOTED_LOWERCASE_GUID_STRING => {
            ENCODED_GUID_LENGTH
        }
        COMPRESSED_LOWERCASE_HEX_STRING
        | COMPRESSED_UPPERCASE_HEX_STRING
        | COMPRESSED_DATE_TIME_STRING => 2 + packed_length(byte(1)? as usize, 4),
        PACKED_4_BIT_STRING => 3 + packed_length(byte(1)? as usize, 4),
        PACKED_5_BIT_STRING => 3 + packed_length(byte(1)? as usize, 5),
        PACKED_6_BIT_STRING => 3 + packed_length(byte(1)? as usize, 6),
        PACKED_7_BIT_STRING_LENGTH_1 => 2 + packed_length(byte(1)? as usize, 7),
        PACKED_7_BIT_STRING_LENGTH_2 => {
            let len = u16::from_le_bytes([byte(1)?, byte(2)?]) as usize;
            3 + packed_length(len, 7)
        }
        other => return Err(JsonError::InvalidTypeMarker(other)),
    })
}

/// Decodes any compressed string form back to its exact text.
pub fn decode_compressed_string(token: &[u8]) -> Result<String> {
    let total = compressed_string_length(token)?;
    if token.len() < total {
        return Err(JsonError::UnexpectedEndOfBuffer(token.len()));
    }
    let marker = token[0];
    let mut out = Vec::new();
    match marker {
        LOWERCASE_GUID_STRING => decode_guid_string(&token[1..17], false, &mut out),
        UPPERCASE_GUID_STRING => decode_guid_string(&token[1..17], true, &mut out),
        DOUBLE_QUOTED_LOWERCASE_GUID_STRING => {
            out.push(b'"');
            decode_guid_string(&token[1..17], false, &mut out);
            out.push(b'"');
        }
        COMPRESSED_LOWERCASE_HEX_STRING => decode_4_bit_charset(LOWERCASE_HEX_CHARS, token, &mut out),
        COMPRESSED_UPPERCASE_HEX_STRING => decode_4_bit_charset(UPPERCASE_HEX_CHARS, token, &mut out),
        COMPRESSED_DATE_TIME_STRING => decode_4_bit_charset(DATE_TIME_CHARS, token, &mut out),
        PACKED_4_BIT_STRING => decode_packed(4, token[2], token[1] as usize, &token[3..total], &mut out),
        PACKED_5_BIT_STRING => decode_packed(5, token[2], token[1] as usize, &token[3..total], &mut out),
        PACKED_6_BIT_STRING => decode_packed(6, token[2], token[1] as usize, &token[3..total], &mut out),
        PACKED_7_BIT_STRING_LENGTH_1 => decode_packed(7, 0, token[1] as usize, &token[2..total], &mut out),
        PACKED_7_BIT_STRING_LENGTH_2 => {
            let len = u16::from_le_bytes([token[1], token[2]]) as usize;
            decode_packed(7, 0, len, &token[3..total], &mut out)
        }
        other => return Err(JsonError::InvalidTypeMarker(other)),
    }
    String::from_utf8(out).map_err(|_| JsonError::InvalidUtf8)
}

fn decode_4_bit_charset(table: &[u8; 16], token: &[u8], out: &mut Vec<u8>) {
    let len = token[1] as usize;
    for &b in &token[2..2 + packed_length(len, 4)] {
        out.push(table[(b & 0x0F) as usize]);
        if out.len() < len {
            out.push(table[(b >> 4) as usize]);
        }
    }
}

fn decode_packed(bits: usize, base: u8, len: usize, packed: &[u8], out: &mut Vec<u8>) {
    let mask = (1u64 << bits) - 1;
    for chunk in packed.chunks(bits) {
        let mut word = [0u8; 8];
        word[..chunk.len()].copy_from_slice(chunk);
        let mut value = u64::from_le_bytes(word);
        for _ in 0..8 {
            if out.len() == len {
                return;
            }
            out.push(((value & mask) as u8).wrapping_add(base));
            value >>= bits;
        }
    }
}
