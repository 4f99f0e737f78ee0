//! Binary encoding model.
//!
//! Stateless decode rules shared by the binary reader and navigator: how many
//! bytes a value occupies, where a container's items start, and how to turn a
//! marker plus payload back into a typed value.

pub mod strings;
pub mod system_strings;
pub mod type_marker;

use std::borrow::Cow;

use docjson_buffers::Reader;

use crate::dictionary::StringDictionary;
use crate::error::{JsonError, Result};
use crate::guid::Guid;
use crate::number64::Number64;
use crate::token::{NodeType, TokenType};
use type_marker::*;

fn cursor(buffer: &[u8], at: usize) -> Reader<'_> {
    Reader::from_slice(buffer, at, buffer.len())
}

fn marker_at(buffer: &[u8], offset: usize) -> Result<u8> {
    buffer
        .get(offset)
        .copied()
        .ok_or(JsonError::UnexpectedEndOfBuffer(offset))
}

/// Reads a little-endian unsigned integer of `width` bytes (1 to 4).
fn read_width(r: &mut Reader<'_>, width: usize) -> Result<usize> {
    Ok(match width {
        1 => r.u8()? as usize,
        2 => r.u16()? as usize,
        3 => r.u24()? as usize,
        _ => r.u32()? as usize,
    })
}

/// Width of the offset payload carried by a reference-string marker.
pub fn reference_width(marker: u8) -> usize {
    (marker - STR_R1) as usize + 1
}

/// Total encoded size in bytes of the value starting at `offset`.
pub fn value_length(buffer: &[u8], offset: usize) -> Result<usize> {
    // `Arr1` and `Obj1` carry no length, so a chain of them is walked down to
    // the first value that knows its own size.
    let mut at = offset;
    loop {
        match marker_at(buffer, at)? {
            ARR1 => at += 1,
            OBJ1 => at += 1 + sized_length(buffer, at + 1)?,
            _ => break,
        }
    }
    Ok(at - offset + sized_length(buffer, at)?)
}

fn sized_length(buffer: &[u8], offset: usize) -> Result<usize> {
    let marker = marker_at(buffer, offset)?;
    let mut r = cursor(buffer, offset + 1);
    let length = match marker {
        m if is_literal_int(m) || is_system_string(m) || is_one_byte_user_string(m) => 1,
        m if is_two_byte_user_string(m) => 2,
        m if is_compressed_string(m) => strings::compressed_string_length(&buffer[offset..])?,
        m if is_encoded_length_string(m) => 1 + encoded_string_length(m),
        STR_L1 | BIN_L1 => 2 + r.u8()? as usize,
        STR_L2 | BIN_L2 => 3 + r.u16()? as usize,
        STR_L4 | BIN_L4 => 5 + r.u32()? as usize,
        m if is_reference_string(m) => 1 + reference_width(m),
        NULL | FALSE | TRUE | ARR0 | OBJ0 => 1,
        NUMBER_UINT8 | UINT8 | INT8 => 2,
        NUMBER_INT16 | INT16 | FLOAT16 => 3,
        NUMBER_INT32 | INT32 | UINT32 | FLOAT32 => 5,
        NUMBER_UINT64 | NUMBER_INT64 | NUMBER_DOUBLE | INT64 | FLOAT64 => 9,
        GUID => 1 + Guid::LENGTH,
        // Only reachable as the name of an `Obj1`.
        ARR1 | OBJ1 => return Err(JsonError::MissingProperty),
        ARR_L1 | OBJ_L1 => 2 + r.u8()? as usize,
        ARR_L2 | OBJ_L2 => 3 + r.u16()? as usize,
        ARR_L4 | OBJ_L4 => 5 + r.u32()? as usize,
        ARR_LC1 | OBJ_LC1 => 3 + r.u8()? as usize,
        ARR_LC2 | OBJ_LC2 => 5 + r.u16()? as usize,
        ARR_LC4 | OBJ_LC4 => 9 + r.u32()? as usize,
        other => return Err(JsonError::InvalidTypeMarker(other)),
    };
    if offset + length > buffer.len() {
        return Err(JsonError::UnexpectedEndOfBuffer(buffer.len()));
    }
    Ok(length)
}

/// An open container during [`check_nesting`]: either the offset its items
/// end at, or the number of values still to come (`Arr1`, `Obj1`).
enum Frame {
    Until(usize),
    Remaining(usize),
}

/// Pops every container completed by a value ending at `at`.
fn value_done(frames: &mut Vec<Frame>, at: usize) -> Result<()> {
    loop {
        match frames.last_mut() {
            Some(Frame::Remaining(left)) => {
                *left -= 1;
                if *left > 0 {
                    return Ok(());
                }
            }
            Some(Frame::Until(close)) => {
                if at < *close {
                    return Ok(());
                }
                if at > *close {
                    return Err(JsonError::InvalidOffset(at));
                }
            }
            None => return Ok(()),
        }
        frames.pop();
    }
}

/// Fails with `MaxNestingExceeded` when a container inside the value at
/// `offset` opens more than `max_depth` levels deep.
pub fn check_nesting(buffer: &[u8], offset: usize, max_depth: usize) -> Result<()> {
    let end = offset + value_length(buffer, offset)?;
    // Every level costs at least one marker byte.
    if end - offset <= max_depth {
        return Ok(());
    }
    let mut frames = Vec::new();
    let mut at = offset;
    while at < end {
        let marker = marker_at(buffer, at)?;
        if !is_array(marker) && !is_object(marker) {
            at += sized_length(buffer, at)?;
            value_done(&mut frames, at)?;
            continue;
        }
        if frames.len() == max_depth {
            return Err(JsonError::MaxNestingExceeded(max_depth));
        }
        match marker {
            ARR0 | OBJ0 => {
                at += 1;
                value_done(&mut frames, at)?;
            }
            ARR1 => {
                at += 1;
                frames.push(Frame::Remaining(1));
            }
            OBJ1 => {
                at += 1;
                frames.push(Frame::Remaining(2));
            }
            _ => {
                let close = at + sized_length(buffer, at)?;
                at += first_value_offset(marker);
                if at == close {
                    value_done(&mut frames, at)?;
                } else {
                    frames.push(Frame::Until(close));
                }
            }
        }
    }
    if !frames.is_empty() {
        return Err(JsonError::InvalidOffset(at));
    }
    Ok(())
}

/// Size of the container prefix (marker plus length and count fields).
pub fn first_value_offset(marker: u8) -> usize {
    match marker {
        ARR_L1 | OBJ_L1 => 2,
        ARR_L2 | OBJ_L2 | ARR_LC1 | OBJ_LC1 => 3,
        ARR_L4 | OBJ_L4 => 5,
        ARR_LC2 | OBJ_LC2 => 5,
        ARR_LC4 | OBJ_LC4 => 9,
        _ => 1,
    }
}

/// Byte range `[start, end)` of a container's items.
pub fn container_items(buffer: &[u8], offset: usize) -> Result<(usize, usize)> {
    let marker = marker_at(buffer, offset)?;
    if !is_array(marker) && !is_object(marker) {
        return Err(JsonError::InvalidTypeMarker(marker));
    }
    let end = offset + value_length(buffer, offset)?;
    Ok((offset + first_value_offset(marker), end))
}

/// Item (or property) count stored in the container header, if it has one.
///
/// Empty and single-item forms and the length-plus-count forms answer without
/// touching the items.
pub fn stored_count(buffer: &[u8], offset: usize) -> Result<Option<usize>> {
    let marker = marker_at(buffer, offset)?;
    let mut r = cursor(buffer, offset + 1);
    Ok(match marker {
        ARR0 | OBJ0 => Some(0),
        ARR1 | OBJ1 => Some(1),
        ARR_LC1 | OBJ_LC1 => {
            r.skip(1)?;
            Some(r.u8()? as usize)
        }
        ARR_LC2 | OBJ_LC2 => {
            r.skip(2)?;
            Some(r.u16()? as usize)
        }
        ARR_LC4 | OBJ_LC4 => {
            r.skip(4)?;
            Some(r.u32()? as usize)
        }
        _ => None,
    })
}

/// Classifies the value at `marker`. String markers report `String`; only a
/// reader knows when a string is a field name.
pub fn token_type(marker: u8) -> Result<TokenType> {
    Ok(match marker {
        m if is_string(m) => TokenType::String,
        m if is_number(m) => TokenType::Number,
        NULL => TokenType::Null,
        FALSE => TokenType::False,
        TRUE => TokenType::True,
        GUID => TokenType::Guid,
        INT8 => TokenType::Int8,
        INT16 => TokenType::Int16,
        INT32 => TokenType::Int32,
        INT64 => TokenType::Int64,
        UINT32 => TokenType::UInt32,
        FLOAT32 => TokenType::Float32,
        FLOAT64 => TokenType::Float64,
        m if is_binary(m) => TokenType::Binary,
        m if is_array(m) => TokenType::BeginArray,
        m if is_object(m) => TokenType::BeginObject,
        other => return Err(JsonError::InvalidTypeMarker(other)),
    })
}

pub fn node_type(marker: u8) -> Result<NodeType> {
    Ok(match token_type(marker)? {
        TokenType::String => NodeType::String,
        TokenType::Number => NodeType::Number,
        TokenType::Null => NodeType::Null,
        TokenType::False => NodeType::False,
        TokenType::True => NodeType::True,
        TokenType::Guid => NodeType::Guid,
        TokenType::Int8 => NodeType::Int8,
        TokenType::Int16 => NodeType::Int16,
        TokenType::Int32 => NodeType::Int32,
        TokenType::Int64 => NodeType::Int64,
        TokenType::UInt32 => NodeType::UInt32,
        TokenType::Float32 => NodeType::Float32,
        TokenType::Float64 => NodeType::Float64,
        TokenType::Binary => NodeType::Binary,
        TokenType::BeginArray => NodeType::Array,
        _ => NodeType::Object,
    })
}

fn half_to_f64(bits: u16) -> f64 {
    let sign = if bits & 0x8000 == 0 { 1.0 } else { -1.0 };
    let exponent = i32::from((bits >> 10) & 0x1F);
    let mantissa = f64::from(bits & 0x03FF);
    match exponent {
        0 => sign * mantissa * 2f64.powi(-24),
        0x1F if mantissa == 0.0 => sign * f64::INFINITY,
        0x1F => f64::NAN,
        _ => sign * (1.0 + mantissa / 1024.0) * 2f64.powi(exponent - 15),
    }
}

/// Decodes any generic number marker (`Number` token) at `offset`.
pub fn read_number(buffer: &[u8], offset: usize) -> Result<Number64> {
    let marker = marker_at(buffer, offset)?;
    let mut r = cursor(buffer, offset + 1);
    Ok(match marker {
        m if is_literal_int(m) => Number64::Integer(i64::from(m)),
        NUMBER_UINT8 | UINT8 => Number64::Integer(i64::from(r.u8()?)),
        NUMBER_INT16 => Number64::Integer(i64::from(r.i16()?)),
        NUMBER_INT32 => Number64::Integer(i64::from(r.i32()?)),
        NUMBER_INT64 => Number64::Integer(r.i64()?),
        NUMBER_UINT64 => {
            let value = r.u64()?;
            match i64::try_from(value) {
                Ok(i) => Number64::Integer(i),
                Err(_) => Number64::Double(value as f64),
            }
        }
        NUMBER_DOUBLE => Number64::Double(r.f64()?),
        FLOAT16 => Number64::Double(half_to_f64(r.u16()?)),
        other => return Err(JsonError::InvalidTypeMarker(other)),
    })
}

fn expect_marker(buffer: &[u8], offset: usize, expected: u8) -> Result<Reader<'_>> {
    let marker = marker_at(buffer, offset)?;
    if marker != expected {
        return Err(JsonError::InvalidTypeMarker(marker));
    }
    Ok(cursor(buffer, offset + 1))
}

pub fn read_int8(buffer: &[u8], offset: usize) -> Result<i8> {
    Ok(expect_marker(buffer, offset, INT8)?.i8()?)
}

pub fn read_int16(buffer: &[u8], offset: usize) -> Result<i16> {
    Ok(expect_marker(buffer, offset, INT16)?.i16()?)
}

pub fn read_int32(buffer: &[u8], offset: usize) -> Result<i32> {
    Ok(expect_marker(buffer, offset, INT32)?.i32()?)
}

pub fn read_int64(buffer: &[u8], offset: usize) -> Result<i64> {
    Ok(expect_marker(buffer, offset, INT64)?.i64()?)
}

pub fn read_uint32(buffer: &[u8], offset: usize) -> Result<u32> {
    Ok(expect_marker(buffer, offset, UINT32)?.u32()?)
}

pub fn read_float32(buffer: &[u8], offset: usize) -> Result<f32> {
    Ok(expect_marker(buffer, offset, FLOAT32)?.f32()?)
}

pub fn read_float64(buffer: &[u8], offset: usize) -> Result<f64> {
    Ok(expect_marker(buffer, offset, FLOAT64)?.f64()?)
}

pub fn read_guid(buffer: &[u8], offset: usize) -> Result<Guid> {
    let bytes = expect_marker(buffer, offset, GUID)?.buf(Guid::LENGTH)?;
    let mut out = [0u8; 16];
    out.copy_from_slice(bytes);
    Ok(Guid(out))
}

pub fn read_binary(buffer: &[u8], offset: usize) -> Result<&[u8]> {
    let marker = marker_at(buffer, offset)?;
    let mut r = cursor(buffer, offset + 1);
    let length = match marker {
        BIN_L1 => r.u8()? as usize,
        BIN_L2 => r.u16()? as usize,
        BIN_L4 => r.u32()? as usize,
        other => return Err(JsonError::InvalidTypeMarker(other)),
    };
    Ok(r.buf(length)?)
}

/// Id of the user string at `offset` (one- or two-byte form).
pub fn user_string_id(buffer: &[u8], offset: usize) -> Result<usize> {
    let marker = marker_at(buffer, offset)?;
    if is_one_byte_user_string(marker) {
        return Ok((marker - USER_STRING_1_BYTE_MIN) as usize);
    }
    if is_two_byte_user_string(marker) {
        let low = marker_at(buffer, offset + 1)? as usize;
        return Ok(USER_STRING_1_BYTE_COUNT
            + low
            + (marker - USER_STRING_2_BYTE_MIN) as usize * 0xFF);
    }
    Err(JsonError::InvalidTypeMarker(marker))
}

/// Target of the reference string at `offset`. The target must lie before
/// `offset` and hold a string that is not itself a reference.
pub fn reference_target(buffer: &[u8], offset: usize) -> Result<usize> {
    let marker = marker_at(buffer, offset)?;
    if !is_reference_string(marker) {
        return Err(JsonError::InvalidTypeMarker(marker));
    }
    let target = read_width(&mut cursor(buffer, offset + 1), reference_width(marker))?;
    if target == 0 || target >= offset {
        return Err(JsonError::InvalidOffset(target));
    }
    let found = buffer[target];
    if !is_string(found) || is_reference_string(found) {
        return Err(JsonError::InvalidOffset(target));
    }
    Ok(target)
}

/// Returns the string at `offset` when its UTF-8 bytes are stored verbatim,
/// following reference strings to their target.
pub fn try_read_buffered_string(buffer: &[u8], offset: usize) -> Result<Option<&str>> {
    let marker = marker_at(buffer, offset)?;
    let mut r = cursor(buffer, offset + 1);
    let length = match marker {
        m if is_encoded_length_string(m) => encoded_string_length(m),
        STR_L1 => r.u8()? as usize,
        STR_L2 => r.u16()? as usize,
        STR_L4 => r.u32()? as usize,
        m if is_reference_string(m) => {
            return try_read_buffered_string(buffer, reference_target(buffer, offset)?);
        }
        m if is_string(m) => return Ok(None),
        other => return Err(JsonError::InvalidTypeMarker(other)),
    };
    Ok(Some(r.utf8(length)?))
}

/// Decodes the string at `offset`, whatever its encoding.
pub fn read_string<'a>(
    buffer: &'a [u8],
    offset: usize,
    dictionary: Option<&'a StringDictionary>,
) -> Result<Cow<'a, str>> {
    if let Some(s) = try_read_buffered_string(buffer, offset)? {
        return Ok(Cow::Borrowed(s));
    }
    let marker = marker_at(buffer, offset)?;
    match marker {
        m if is_system_string(m) => system_strings::system_string((m - SYSTEM_STRING_MIN) as usize)
            .map(Cow::Borrowed)
            .ok_or(JsonError::InvalidTypeMarker(m)),
        m if is_user_string(m) => {
            let id = user_string_id(buffer, offset)?;
            dictionary
                .and_then(|d| d.try_get_string(id))
                .map(Cow::Borrowed)
                .ok_or(JsonError::UnknownUserString(id))
        }
        m if is_compressed_string(m) => {
            Ok(Cow::Owned(strings::decode_compressed_string(&buffer[offset..])?))
        }
        m if is_reference_string(m) => {
            read_string(buffer, reference_target(buffer, offset)?, dictionary)
        }
        other => Err(JsonError::InvalidTypeMarker(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_lengths() {
        let cases: Vec<(Vec<u8>, usize)> = vec![
            (vec![0x05], 1),
            (vec![SYSTEM_STRING_MIN], 1),
            (vec![0x60, 0x10], 2),
            (vec![0x83, b'a', b'b', b'c'], 4),
            (vec![STR_L1, 2, b'h', b'i'], 4),
            (vec![STR_R2, 1, 0], 3),
            (vec![NUMBER_INT16, 0, 1], 3),
            (vec![NUMBER_DOUBLE, 0, 0, 0, 0, 0, 0, 0, 0], 9),
            (vec![INT8, 0xFF], 2),
            (vec![BIN_L1, 2, 9, 9], 4),
            (vec![ARR0], 1),
            (vec![ARR1, 0x01], 2),
            (vec![OBJ1, 0x81, b'a', TRUE], 4),
            (vec![ARR_L1, 2, 0x01, 0x02], 4),
            (vec![OBJ_LC1, 2, 1, 0x80, 0x01], 5),
        ];
        for (bytes, expected) in cases {
            assert_eq!(value_length(&bytes, 0).unwrap(), expected, "{bytes:02x?}");
        }
    }

    #[test]
    fn test_truncated_and_invalid() {
        assert_eq!(
            value_length(&[STR_L1, 5, b'a'], 0),
            Err(JsonError::UnexpectedEndOfBuffer(3))
        );
        assert_eq!(value_length(&[ARR_NUM_C1, 1, 1], 0), Err(JsonError::InvalidTypeMarker(0xF0)));
        assert_eq!(value_length(&[INVALID], 0), Err(JsonError::InvalidTypeMarker(0xFF)));
    }

    #[test]
    fn test_stored_count() {
        assert_eq!(stored_count(&[ARR0], 0).unwrap(), Some(0));
        assert_eq!(stored_count(&[ARR_LC1, 2, 7, 1, 2], 0).unwrap(), Some(7));
        assert_eq!(stored_count(&[ARR_L1, 2, 1, 2], 0).unwrap(), None);
        assert_eq!(container_items(&[ARR_LC1, 2, 2, 1, 2], 0).unwrap(), (3, 5));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(read_number(&[0x1F], 0).unwrap(), Number64::Integer(31));
        assert_eq!(read_number(&[NUMBER_INT16, 0x00, 0x80], 0).unwrap(), Number64::Integer(-32768));
        let mut uint64 = vec![NUMBER_UINT64];
        uint64.extend_from_slice(&u64::MAX.to_le_bytes());
        assert_eq!(read_number(&uint64, 0).unwrap(), Number64::Double(u64::MAX as f64));
        assert_eq!(read_number(&[FLOAT16, 0x00, 0x3C], 0).unwrap(), Number64::Double(1.0));
        assert_eq!(read_number(&[FLOAT16, 0x00, 0xC0], 0).unwrap(), Number64::Double(-2.0));
        assert!(half_to_f64(0x7C01).is_nan());
    }

    #[test]
    fn test_user_string_ids() {
        assert_eq!(user_string_id(&[0x45], 0).unwrap(), 5);
        assert_eq!(user_string_id(&[0x60, 0x00], 0).unwrap(), 32);
        assert_eq!(user_string_id(&[0x61, 0x02], 0).unwrap(), 32 + 255 + 2);
        assert_eq!(user_string_id(&[0x67, 0xFE], 0).unwrap(), USER_STRING_CAPACITY - 1);
    }

    #[test]
    fn test_strings() {
        let dict = StringDictionary::new(["alpha"]).unwrap();
        let buffer = [BINARY_FORMAT, 0x83, b'a', b'b', b'c', STR_R1, 1, 0x40, SYSTEM_STRING_MIN];
        assert_eq!(read_string(&buffer, 1, None).unwrap(), "abc");
        assert_eq!(read_string(&buffer, 5, None).unwrap(), "abc");
        assert_eq!(read_string(&buffer, 7, Some(&dict)).unwrap(), "alpha");
        assert_eq!(read_string(&buffer, 7, None), Err(JsonError::UnknownUserString(0)));
        assert_eq!(read_string(&buffer, 8, None).unwrap(), system_strings::SYSTEM_STRINGS[0]);
        assert_eq!(try_read_buffered_string(&buffer, 8).unwrap(), None);
        assert_eq!(reference_target(&[STR_R1, 5], 0), Err(JsonError::InvalidOffset(5)));
    }

    #[test]
    fn test_reference_to_reference() {
        let buffer = [BINARY_FORMAT, 0x81, b'a', STR_R1, 1, STR_R1, 3, STR_R1, 0];
        assert_eq!(reference_target(&buffer, 3).unwrap(), 1);
        assert_eq!(reference_target(&buffer, 5), Err(JsonError::InvalidOffset(3)));
        assert_eq!(read_string(&buffer, 5, None), Err(JsonError::InvalidOffset(3)));
        assert_eq!(try_read_buffered_string(&buffer, 5), Err(JsonError::InvalidOffset(3)));
        assert_eq!(reference_target(&buffer, 7), Err(JsonError::InvalidOffset(0)));
    }

    #[test]
    fn test_long_single_item_chains() {
        let mut chain = vec![ARR1; 100_000];
        chain.push(OBJ1);
        chain.extend_from_slice(&[0x81, b'k', NULL]);
        assert_eq!(value_length(&chain, 0).unwrap(), chain.len());
        assert_eq!(value_length(&[OBJ1, ARR1, NULL], 0), Err(JsonError::MissingProperty));
    }

    #[test]
    fn test_check_nesting() {
        let mut chain = vec![ARR1; 20];
        chain.push(NULL);
        assert_eq!(check_nesting(&chain, 0, 20), Ok(()));
        assert_eq!(check_nesting(&chain, 0, 19), Err(JsonError::MaxNestingExceeded(19)));

        // [[], [[]], {"a": []}] is three levels deep.
        let mixed = [ARR_L1, 7, ARR0, ARR1, ARR0, OBJ1, 0x81, b'a', ARR0];
        assert_eq!(check_nesting(&mixed, 0, 1), Err(JsonError::MaxNestingExceeded(1)));
        assert_eq!(check_nesting(&mixed, 0, 2), Err(JsonError::MaxNestingExceeded(2)));
        assert_eq!(check_nesting(&mixed, 0, 3), Ok(()));

        // Siblings after a closed container do not deepen.
        let wide = [ARR_L1, 8, ARR1, ARR0, ARR1, ARR0, ARR1, ARR0, 0x01, 0x02];
        assert_eq!(check_nesting(&wide, 0, 3), Ok(()));

        // Items running past the end of their container.
        let overrun = [ARR_L1, 3, 0x01, NUMBER_INT16, 0x00, 0x00];
        assert_eq!(check_nesting(&overrun, 0, 3), Err(JsonError::InvalidOffset(6)));
        let nested_overrun = [ARR_L1, 2, ARR_L1, 2, 0x01, 0x02, 0x03, 0x04];
        assert_eq!(check_nesting(&nested_overrun, 0, 3), Err(JsonError::InvalidOffset(4)));
    }
}
