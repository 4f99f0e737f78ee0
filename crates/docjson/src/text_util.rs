//! Lexical helpers for the text format: whitespace, string escaping and
//! number grammar.

use docjson_buffers::Writer;

use crate::error::{JsonError, Result};
use crate::guid::hex_value;
use crate::number64::Number64;

pub fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n')
}

/// True for bytes that may end a number or literal. A misplaced `:` is left
/// for the structural check to report.
pub fn is_delimiter(c: Option<u8>) -> bool {
    match c {
        None => true,
        Some(c) => is_whitespace(c) || matches!(c, b'}' | b']' | b',' | b':'),
    }
}

/// Writes `value` as a quoted JSON string, escaping only `"`, `\` and
/// control characters.
pub fn write_escaped(out: &mut Writer, value: &str) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    out.u8(b'"');
    let bytes = value.as_bytes();
    let mut run = 0;
    for (i, &c) in bytes.iter().enumerate() {
        let short = match c {
            b'"' => b'"',
            b'\\' => b'\\',
            0x08 => b'b',
            0x0C => b'f',
            b'\n' => b'n',
            b'\r' => b'r',
            b'\t' => b't',
            c if c < 0x20 => 0,
            _ => continue,
        };
        out.buf(&bytes[run..i]);
        run = i + 1;
        if short != 0 {
            out.buf(&[b'\\', short]);
        } else {
            out.buf(&[b'\\', b'u', b'0', b'0', HEX[(c >> 4) as usize], HEX[(c & 0xF) as usize]]);
        }
    }
    out.buf(&bytes[run..]);
    out.u8(b'"');
}

fn hex4(buffer: &[u8], at: usize) -> Option<u16> {
    let digits = buffer.get(at..at + 4)?;
    digits
        .iter()
        .try_fold(0u16, |acc, &c| Some((acc << 4) | u16::from(hex_value(c)?)))
}

/// Scans the string literal whose opening quote is at `start`.
///
/// Returns the index just past the closing quote and whether the literal
/// contains escape sequences.
pub fn scan_string(buffer: &[u8], start: usize) -> Result<(usize, bool)> {
    let mut i = start + 1;
    let mut escaped = false;
    while i < buffer.len() {
        match buffer[i] {
            b'"' => return Ok((i + 1, escaped)),
            b'\\' => {
                escaped = true;
                match buffer.get(i + 1) {
                    Some(b'b' | b'f' | b'n' | b'r' | b't' | b'\\' | b'"' | b'/') => i += 2,
                    Some(b'u') if hex4(buffer, i + 2).is_some() => i += 6,
                    Some(_) => return Err(JsonError::InvalidEscape(i)),
                    None => break,
                }
            }
            _ => i += 1,
        }
    }
    Err(JsonError::MissingClosingQuote(start))
}

/// Decodes the escape sequences in the body of a string literal. `at` is the
/// absolute position of `raw[0]`, used for error reporting.
pub fn unescape(raw: &[u8], at: usize) -> Result<String> {
    let mut out: Vec<u8> = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let c = raw[i];
        if c != b'\\' {
            out.push(c);
            i += 1;
            continue;
        }
        let simple = match raw.get(i + 1) {
            Some(b'b') => 0x08,
            Some(b'f') => 0x0C,
            Some(b'n') => b'\n',
            Some(b'r') => b'\r',
            Some(b't') => b'\t',
            Some(b'\\') => b'\\',
            Some(b'"') => b'"',
            Some(b'/') => b'/',
            Some(b'u') => {
                let (ch, used) = unescape_unicode(raw, i).ok_or(JsonError::InvalidEscape(at + i))?;
                let mut utf8 = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
                i += used;
                continue;
            }
            _ => return Err(JsonError::InvalidEscape(at + i)),
        };
        out.push(simple);
        i += 2;
    }
    String::from_utf8(out).map_err(|_| JsonError::InvalidUtf8)
}

/// Decodes `\uXXXX` (and a following low surrogate) starting at `raw[i]`.
fn unescape_unicode(raw: &[u8], i: usize) -> Option<(char, usize)> {
    let high = hex4(raw, i + 2)?;
    if !(0xD800..0xDC00).contains(&high) {
        return char::from_u32(u32::from(high)).map(|c| (c, 6));
    }
    if raw.get(i + 6..i + 8)? != b"\\u" {
        return None;
    }
    let low = hex4(raw, i + 8)?;
    if !(0xDC00..0xE000).contains(&low) {
        return None;
    }
    let code = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
    char::from_u32(code).map(|c| (c, 12))
}

/// Validates the number literal at `start` and returns the index just past it.
///
/// Rejects a leading `+`, redundant leading zeros, a dot or exponent without
/// digits, and any trailing byte that is not a delimiter.
pub fn scan_number(buffer: &[u8], start: usize) -> Result<usize> {
    let err = JsonError::InvalidNumber(start);
    let at = |i: usize| buffer.get(i).copied();
    let digits = |mut i: usize| {
        let from = i;
        while matches!(at(i), Some(b'0'..=b'9')) {
            i += 1;
        }
        (i, i - from)
    };

    let mut i = start;
    if at(i) == Some(b'-') {
        i += 1;
    }
    let (next, count) = digits(i);
    if count == 0 || (count > 1 && at(i) == Some(b'0')) {
        return Err(err);
    }
    i = next;
    if at(i) == Some(b'.') {
        let (next, count) = digits(i + 1);
        if count == 0 {
            return Err(err);
        }
        i = next;
    }
    if matches!(at(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(at(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let (next, count) = digits(i);
        if count == 0 {
            return Err(err);
        }
        i = next;
    }
    if !is_delimiter(at(i)) {
        return Err(err);
    }
    Ok(i)
}

/// Converts a validated number literal, keeping integers exact when they fit.
pub fn parse_number(lexeme: &str) -> Result<Number64> {
    if lexeme == "-0" {
        return Ok(Number64::Double(-0.0));
    }
    if !lexeme.contains(['.', 'e', 'E']) {
        if let Ok(i) = lexeme.parse::<i64>() {
            return Ok(Number64::Integer(i));
        }
    }
    lexeme
        .parse::<f64>()
        .map(Number64::Double)
        .map_err(|_| JsonError::NumberOutOfRange(lexeme.to_owned()))
}
