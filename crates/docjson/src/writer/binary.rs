//! Writer for the binary format.
//!
//! Containers reserve a two-byte header (marker plus one-byte length) when
//! they start. When they end, the header is rewritten to the narrowest form
//! that fits the payload and the payload is moved if the header size changed.
//! Reference strings are emitted with placeholder offsets and patched once
//! the root container is closed.

use std::collections::HashMap;

use docjson_buffers::Writer;
use tracing::{debug, trace};

use crate::binary::strings::{
    encode_guid_string, try_encode_compressed_string, GUID_LENGTH, GUID_WITH_QUOTES_LENGTH,
};
use crate::binary::system_strings::system_string_id;
use crate::binary::type_marker::*;
use crate::error::{JsonError, Result};
use crate::guid::Guid;
use crate::number64::Number64;
use crate::object_state::ObjectState;
use crate::options::{WriterOptions, DEFAULT_MAX_DEPTH};
use crate::token::TokenType;

const MIN_REFERENCE_VALUE_LENGTH: usize = 2;
const MAX_REFERENCE_VALUE_LENGTH: usize = 88;
/// Counts above this always get the length-plus-count array header.
const MAX_UNCOUNTED_ARRAY_ITEMS: usize = 16;
const MAX_UNCOUNTED_ARRAY_LENGTH: usize = 0x1000;
/// Largest header growth a container can apply to its contents (`L1` to `LC4`).
const MAX_HEADER_GROWTH: usize = 7;

#[derive(Debug)]
struct OpenContainer {
    start: usize,
    count: usize,
    shared_from: usize,
    references_from: usize,
}

/// A literal string that later occurrences may point back to.
#[derive(Debug)]
struct SharedString {
    offset: usize,
    max_offset: usize,
}

#[derive(Debug)]
struct PendingReference {
    at: usize,
    target: usize,
    width: usize,
}

pub struct BinaryWriter {
    out: Writer,
    state: ObjectState,
    options: WriterOptions,
    containers: Vec<OpenContainer>,
    shared: Vec<SharedString>,
    shared_index: HashMap<Vec<u8>, usize>,
    references: Vec<PendingReference>,
}

fn offset_width(max_offset: usize) -> usize {
    match max_offset {
        0..=0xFF => 1,
        0x100..=0xFFFF => 2,
        0x1_0000..=0xFF_FFFF => 3,
        _ => 4,
    }
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::with_options(WriterOptions::default())
    }

    pub fn with_options(options: WriterOptions) -> Self {
        let mut out = Writer::new();
        out.u8(BINARY_FORMAT);
        Self {
            out,
            state: ObjectState::new(DEFAULT_MAX_DEPTH),
            options,
            containers: Vec::new(),
            shared: Vec::new(),
            shared_index: HashMap::new(),
            references: Vec::new(),
        }
    }

    pub fn current_length(&self) -> usize {
        self.out.len()
    }

    fn value_written(&mut self) {
        if let Some(top) = self.containers.last_mut() {
            top.count += 1;
        }
    }

    fn begin(&mut self, is_array: bool) -> Result<()> {
        self.state.register_token(if is_array { TokenType::BeginArray } else { TokenType::BeginObject })?;
        self.containers.push(OpenContainer {
            start: self.out.len(),
            count: 0,
            shared_from: self.shared.len(),
            references_from: self.references.len(),
        });
        self.out.u8(if is_array { ARR_L1 } else { OBJ_L1 });
        self.out.u8(0);
        Ok(())
    }

    fn end(&mut self, is_array: bool) -> Result<()> {
        self.state.register_token(if is_array { TokenType::EndArray } else { TokenType::EndObject })?;
        let container = self.containers.pop().ok_or(if is_array {
            JsonError::ArrayNotStarted
        } else {
            JsonError::ObjectNotStarted
        })?;
        let start = container.start;
        let payload = self.out.len() - start - 2;
        let count = container.count;
        let pick = |array: u8, object: u8| if is_array { array } else { object };

        let (marker, header): (u8, Vec<u8>) = if count == 0 {
            (pick(ARR0, OBJ0), Vec::new())
        } else if count == 1 {
            (pick(ARR1, OBJ1), Vec::new())
        } else if payload <= 0xFF {
            if is_array && count > MAX_UNCOUNTED_ARRAY_ITEMS {
                (ARR_LC1, vec![payload as u8, count as u8])
            } else {
                (pick(ARR_L1, OBJ_L1), vec![payload as u8])
            }
        } else if payload <= 0xFFFF {
            if is_array && (count > MAX_UNCOUNTED_ARRAY_ITEMS || payload > MAX_UNCOUNTED_ARRAY_LENGTH) {
                let mut h = (payload as u16).to_le_bytes().to_vec();
                h.extend_from_slice(&(count as u16).to_le_bytes());
                (ARR_LC2, h)
            } else {
                (pick(ARR_L2, OBJ_L2), (payload as u16).to_le_bytes().to_vec())
            }
        } else {
            let length = u32::try_from(payload).map_err(|_| JsonError::NumberOutOfRange(payload.to_string()))?;
            if is_array {
                let mut h = length.to_le_bytes().to_vec();
                h.extend_from_slice(&(count as u32).to_le_bytes());
                (ARR_LC4, h)
            } else {
                (OBJ_L4, length.to_le_bytes().to_vec())
            }
        };
        trace!(marker, payload, count, "closing binary container");

        self.out.resize_region(start + 1, 1, header.len())?;
        self.out.patch_u8(start, marker)?;
        self.out.patch(start + 1, &header)?;
        let delta = header.len() as isize - 1;
        if delta != 0 {
            for shared in &mut self.shared[container.shared_from..] {
                shared.offset = shared.offset.wrapping_add_signed(delta);
            }
            for reference in &mut self.references[container.references_from..] {
                reference.at = reference.at.wrapping_add_signed(delta);
            }
        }
        self.value_written();
        if self.containers.is_empty() {
            self.patch_references()?;
        }
        Ok(())
    }

    fn patch_references(&mut self) -> Result<()> {
        for reference in &self.references {
            let offset = self.shared[reference.target].offset;
            if offset_width(offset) > reference.width {
                return Err(JsonError::InvalidOffset(offset));
            }
            let bytes = (offset as u32).to_le_bytes();
            self.out.patch(reference.at + 1, &bytes[..reference.width])?;
        }
        self.references.clear();
        Ok(())
    }

    pub fn write_object_start(&mut self) -> Result<()> {
        self.begin(false)
    }

    pub fn write_object_end(&mut self) -> Result<()> {
        self.end(false)
    }

    pub fn write_array_start(&mut self) -> Result<()> {
        self.begin(true)
    }

    pub fn write_array_end(&mut self) -> Result<()> {
        self.end(true)
    }

    pub fn write_field_name(&mut self, name: &str) -> Result<()> {
        self.state.register_field_name(Some(name))?;
        self.write_string(name.as_bytes(), true);
        Ok(())
    }

    pub fn write_string_value(&mut self, value: &str) -> Result<()> {
        self.state.register_token(TokenType::String)?;
        self.write_string(value.as_bytes(), false);
        self.value_written();
        Ok(())
    }

    fn write_string(&mut self, value: &[u8], is_field_name: bool) {
        if let Some(id) = system_string_id(value) {
            self.out.u8(SYSTEM_STRING_MIN + id as u8);
            return;
        }
        if let Some(id) = self.options.dictionary.as_ref().and_then(|d| d.try_get_index(value)) {
            self.write_user_string(id);
            return;
        }
        let references = self.options.enable_reference_strings;
        let encoded = self.options.enable_encoded_strings;
        if is_field_name {
            if references && value.len() >= MIN_REFERENCE_VALUE_LENGTH && self.try_write_reference(value) {
                return;
            }
        } else {
            // A compressed value can still be shared; the reference then
            // points at the compressed token.
            if references
                && (MIN_REFERENCE_VALUE_LENGTH..=MAX_REFERENCE_VALUE_LENGTH).contains(&value.len())
                && self.try_write_reference(value)
            {
                return;
            }
            if encoded && self.try_write_encoded(value) {
                return;
            }
        }
        self.write_literal_string(value);
    }

    fn write_user_string(&mut self, id: usize) {
        if id < USER_STRING_1_BYTE_COUNT {
            self.out.u8(USER_STRING_1_BYTE_MIN + id as u8);
        } else {
            let offset = id - USER_STRING_1_BYTE_COUNT;
            self.out.u8(USER_STRING_2_BYTE_MIN + (offset / 0xFF) as u8);
            self.out.u8((offset % 0xFF) as u8);
        }
    }

    fn try_write_encoded(&mut self, value: &[u8]) -> bool {
        if value.len() == GUID_LENGTH {
            if let Some((marker, packed)) = encode_guid_string(value) {
                self.out.u8(marker);
                self.out.buf(&packed);
                return true;
            }
        }
        if value.len() == GUID_WITH_QUOTES_LENGTH && value[0] == b'"' && value[GUID_WITH_QUOTES_LENGTH - 1] == b'"' {
            if let Some((LOWERCASE_GUID_STRING, packed)) = encode_guid_string(&value[1..GUID_LENGTH + 1]) {
                self.out.u8(DOUBLE_QUOTED_LOWERCASE_GUID_STRING);
                self.out.buf(&packed);
                return true;
            }
        }
        try_encode_compressed_string(value, &mut self.out)
    }

    /// Writes a back-reference if `value` was shared earlier. Otherwise records
    /// it as shared when a later reference would be shorter than the literal,
    /// and returns `false` so the caller writes the literal.
    fn try_write_reference(&mut self, value: &[u8]) -> bool {
        if let Some(&target) = self.shared_index.get(value) {
            let width = offset_width(self.shared[target].max_offset);
            let at = self.out.len();
            self.out.u8(STR_R1 + (width - 1) as u8);
            self.out.buf(&[0u8; 4][..width]);
            self.references.push(PendingReference { at, target, width });
            return true;
        }
        let offset = self.out.len();
        let max_offset = self.containers.len() * MAX_HEADER_GROWTH + offset;
        let len = value.len();
        let worth_sharing = len >= 5
            || (max_offset <= 0xFF && len >= 2)
            || (max_offset <= 0xFFFF && len >= 3)
            || (max_offset <= 0xFF_FFFF && len >= 4);
        if worth_sharing {
            self.shared_index.insert(value.to_vec(), self.shared.len());
            self.shared.push(SharedString { offset, max_offset });
        }
        false
    }

    fn write_literal_string(&mut self, value: &[u8]) {
        let len = value.len();
        if let Some(marker) = encoded_length_string_marker(len) {
            self.out.u8(marker);
        } else if len < 0xFF {
            self.out.u8(STR_L1);
            self.out.u8(len as u8);
        } else if len < 0xFFFF {
            self.out.u8(STR_L2);
            self.out.u16(len as u16);
        } else {
            self.out.u8(STR_L4);
            self.out.u32(len as u32);
        }
        self.out.buf(value);
    }

    fn scalar(&mut self, token: TokenType) -> Result<()> {
        self.state.register_token(token)?;
        self.value_written();
        Ok(())
    }

    /// Integers get the narrowest encoding that holds them exactly; doubles
    /// are always eight bytes.
    pub fn write_number64_value(&mut self, value: Number64) -> Result<()> {
        self.scalar(TokenType::Number)?;
        match value {
            Number64::Integer(i) => {
                if let Some(marker) = literal_int_marker(i) {
                    self.out.u8(marker);
                } else if (0..=0xFF).contains(&i) {
                    self.out.u8(NUMBER_UINT8);
                    self.out.u8(i as u8);
                } else if let Ok(v) = i16::try_from(i) {
                    self.out.u8(NUMBER_INT16);
                    self.out.i16(v);
                } else if let Ok(v) = i32::try_from(i) {
                    self.out.u8(NUMBER_INT32);
                    self.out.i32(v);
                } else {
                    self.out.u8(NUMBER_INT64);
                    self.out.i64(i);
                }
            }
            Number64::Double(d) => {
                self.out.u8(NUMBER_DOUBLE);
                self.out.f64(d);
            }
        }
        Ok(())
    }

    pub fn write_bool_value(&mut self, value: bool) -> Result<()> {
        self.scalar(if value { TokenType::True } else { TokenType::False })?;
        self.out.u8(if value { TRUE } else { FALSE });
        Ok(())
    }

    pub fn write_null_value(&mut self) -> Result<()> {
        self.scalar(TokenType::Null)?;
        self.out.u8(NULL);
        Ok(())
    }

    pub fn write_int8_value(&mut self, value: i8) -> Result<()> {
        self.scalar(TokenType::Int8)?;
        self.out.u8(INT8);
        self.out.i8(value);
        Ok(())
    }

    pub fn write_int16_value(&mut self, value: i16) -> Result<()> {
        self.scalar(TokenType::Int16)?;
        self.out.u8(INT16);
        self.out.i16(value);
        Ok(())
    }

    pub fn write_int32_value(&mut self, value: i32) -> Result<()> {
        self.scalar(TokenType::Int32)?;
        self.out.u8(INT32);
        self.out.i32(value);
        Ok(())
    }

    pub fn write_int64_value(&mut self, value: i64) -> Result<()> {
        self.scalar(TokenType::Int64)?;
        self.out.u8(INT64);
        self.out.i64(value);
        Ok(())
    }

    pub fn write_uint32_value(&mut self, value: u32) -> Result<()> {
        self.scalar(TokenType::UInt32)?;
        self.out.u8(UINT32);
        self.out.u32(value);
        Ok(())
    }

    pub fn write_float32_value(&mut self, value: f32) -> Result<()> {
        self.scalar(TokenType::Float32)?;
        self.out.u8(FLOAT32);
        self.out.f32(value);
        Ok(())
    }

    pub fn write_float64_value(&mut self, value: f64) -> Result<()> {
        self.scalar(TokenType::Float64)?;
        self.out.u8(FLOAT64);
        self.out.f64(value);
        Ok(())
    }

    pub fn write_guid_value(&mut self, value: Guid) -> Result<()> {
        self.scalar(TokenType::Guid)?;
        self.out.u8(GUID);
        self.out.buf(value.as_bytes());
        Ok(())
    }

    pub fn write_binary_value(&mut self, value: &[u8]) -> Result<()> {
        let len = value.len();
        let length = u32::try_from(len).map_err(|_| JsonError::NumberOutOfRange(len.to_string()))?;
        self.scalar(TokenType::Binary)?;
        if len <= 0xFF {
            self.out.u8(BIN_L1);
            self.out.u8(len as u8);
        } else if len <= 0xFFFF {
            self.out.u8(BIN_L2);
            self.out.u16(len as u16);
        } else {
            self.out.u8(BIN_L4);
            self.out.u32(length);
        }
        self.out.buf(value);
        Ok(())
    }

    /// The finished buffer, or an empty buffer if nothing was written.
    pub fn get_result(&self) -> Result<Vec<u8>> {
        if self.out.len() == 1 {
            return Ok(Vec::new());
        }
        if !self.state.is_complete() {
            return Err(JsonError::NotComplete);
        }
        debug!(format = "binary", length = self.out.len(), "json writer finished");
        Ok(self.out.as_slice().to_vec())
    }
}

impl Default for BinaryWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::strings::decode_compressed_string;
    use crate::dictionary::StringDictionary;
    use std::sync::Arc;

    fn number(value: Number64) -> Vec<u8> {
        let mut w = BinaryWriter::new();
        w.write_number64_value(value).unwrap();
        w.get_result().unwrap()
    }

    fn string(value: &str, options: WriterOptions) -> Vec<u8> {
        let mut w = BinaryWriter::with_options(options);
        w.write_string_value(value).unwrap();
        w.get_result().unwrap()
    }

    #[test]
    fn test_smallest_number_encoding() {
        let cases: Vec<(i64, Vec<u8>)> = vec![
            (0, vec![0x80, 0x00]),
            (31, vec![0x80, 0x1F]),
            (32, vec![0x80, NUMBER_UINT8, 32]),
            (255, vec![0x80, NUMBER_UINT8, 0xFF]),
            (256, vec![0x80, NUMBER_INT16, 0x00, 0x01]),
            (-1, vec![0x80, NUMBER_INT16, 0xFF, 0xFF]),
            (i64::from(i16::MIN), vec![0x80, NUMBER_INT16, 0x00, 0x80]),
            (i64::from(i16::MAX) + 1, vec![0x80, NUMBER_INT32, 0x00, 0x80, 0, 0]),
            (i64::from(i32::MIN) - 1, [vec![0x80, NUMBER_INT64], (i64::from(i32::MIN) - 1).to_le_bytes().to_vec()].concat()),
        ];
        for (value, expected) in cases {
            assert_eq!(number(Number64::Integer(value)), expected, "{value}");
        }
        let double = number(Number64::Double(4.0));
        assert_eq!(double[1], NUMBER_DOUBLE);
        assert_eq!(double.len(), 10);
    }

    #[test]
    fn test_string_priorities() {
        let plain = WriterOptions::default();
        assert_eq!(string("$s", plain.clone()), vec![0x80, SYSTEM_STRING_MIN]);
        assert_eq!(string("name", plain.clone()), vec![0x80, SYSTEM_STRING_MIN + 21]);
        assert_eq!(string("abc", plain.clone()), vec![0x80, 0x83, b'a', b'b', b'c']);

        let guid = string("0f8fad5b-d9cb-469f-a165-70867728950e", plain.clone());
        assert_eq!((guid[1], guid.len()), (LOWERCASE_GUID_STRING, 18));
        let quoted = string("\"0f8fad5b-d9cb-469f-a165-70867728950e\"", plain.clone());
        assert_eq!(quoted[1], DOUBLE_QUOTED_LOWERCASE_GUID_STRING);
        let quoted_upper = string("\"0F8FAD5B-D9CB-469F-A165-70867728950E\"", plain.clone());
        assert_eq!(quoted_upper[1], ENCODED_LENGTH_STRING_MIN + 38);

        let date = string("2020-06-01T12:00:00Z", plain.clone());
        assert_eq!(date[1], COMPRESSED_DATE_TIME_STRING);
        assert_eq!(decode_compressed_string(&date[1..]).unwrap(), "2020-06-01T12:00:00Z");

        let disabled = WriterOptions::new().with_encoded_strings(false);
        assert_eq!(string("2020-06-01T12:00:00Z", disabled)[1], ENCODED_LENGTH_STRING_MIN + 20);

        let long = "x".repeat(100);
        let bytes = string(&long, WriterOptions::new().with_encoded_strings(false));
        assert_eq!(&bytes[..3], &[0x80, STR_L1, 100]);
        let bytes = string(&"y".repeat(300), WriterOptions::new().with_encoded_strings(false));
        assert_eq!(&bytes[..4], &[0x80, STR_L2, 0x2C, 0x01]);
    }

    #[test]
    fn test_user_strings() {
        let words: Vec<String> = (0..40).map(|i| format!("word{i}")).collect();
        let dict = Arc::new(StringDictionary::new(&words).unwrap());
        let options = WriterOptions::new().with_dictionary(dict);
        assert_eq!(string("word3", options.clone()), vec![0x80, 0x43]);
        assert_eq!(string("word33", options), vec![0x80, 0x60, 0x01]);

        let short = Arc::new(StringDictionary::new(["x"]).unwrap());
        assert_eq!(string("x", WriterOptions::new().with_dictionary(short)), vec![0x80, 0x40]);
    }

    #[test]
    fn test_container_headers() {
        let mut w = BinaryWriter::new();
        w.write_array_start().unwrap();
        w.write_array_end().unwrap();
        assert_eq!(w.get_result().unwrap(), vec![0x80, ARR0]);

        let mut w = BinaryWriter::new();
        w.write_object_start().unwrap();
        w.write_field_name("a").unwrap();
        w.write_bool_value(true).unwrap();
        w.write_object_end().unwrap();
        assert_eq!(w.get_result().unwrap(), vec![0x80, OBJ1, 0x81, b'a', TRUE]);

        let mut w = BinaryWriter::new();
        w.write_array_start().unwrap();
        w.write_null_value().unwrap();
        w.write_bool_value(false).unwrap();
        w.write_array_end().unwrap();
        assert_eq!(w.get_result().unwrap(), vec![0x80, ARR_L1, 2, NULL, FALSE]);

        let mut w = BinaryWriter::new();
        w.write_array_start().unwrap();
        for i in 0..20 {
            w.write_number64_value(Number64::Integer(i)).unwrap();
        }
        w.write_array_end().unwrap();
        let bytes = w.get_result().unwrap();
        assert_eq!(&bytes[..4], &[0x80, ARR_LC1, 20, 20]);
        assert_eq!(bytes.len(), 24);
    }

    #[test]
    fn test_large_container_moves_payload() {
        let mut w = BinaryWriter::with_options(WriterOptions::new().with_encoded_strings(false));
        w.write_object_start().unwrap();
        w.write_field_name("k").unwrap();
        w.write_string_value(&"z".repeat(300)).unwrap();
        w.write_object_end().unwrap();
        let bytes = w.get_result().unwrap();
        assert_eq!(bytes[1], OBJ1);

        let mut w = BinaryWriter::with_options(WriterOptions::new().with_encoded_strings(false));
        w.write_array_start().unwrap();
        w.write_string_value(&"z".repeat(300)).unwrap();
        w.write_null_value().unwrap();
        w.write_array_end().unwrap();
        let bytes = w.get_result().unwrap();
        assert_eq!(bytes[1], ARR_L2);
        assert_eq!(u16::from_le_bytes([bytes[2], bytes[3]]) as usize, bytes.len() - 4);
        assert_eq!(&bytes[4..7], &[STR_L2, 0x2C, 0x01]);
    }

    #[test]
    fn test_reference_strings() {
        let mut w = BinaryWriter::new();
        w.write_array_start().unwrap();
        w.write_object_start().unwrap();
        w.write_field_name("city").unwrap();
        w.write_string_value("Paris").unwrap();
        w.write_object_end().unwrap();
        w.write_object_start().unwrap();
        w.write_field_name("city").unwrap();
        w.write_string_value("Paris").unwrap();
        w.write_object_end().unwrap();
        w.write_array_end().unwrap();
        let bytes = w.get_result().unwrap();
        #[rustfmt::skip]
        let expected = vec![
            0x80, ARR_L1, 17,
            OBJ1, 0x84, b'c', b'i', b't', b'y', 0x85, b'P', b'a', b'r', b'i', b's',
            OBJ1, STR_R1, 4, STR_R1, 9,
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_repeated_compressed_values_are_referenced() {
        let guid = "123e4567-e89b-12d3-a456-426614174000";
        let mut w = BinaryWriter::new();
        w.write_array_start().unwrap();
        w.write_string_value(guid).unwrap();
        w.write_string_value(guid).unwrap();
        w.write_array_end().unwrap();
        let bytes = w.get_result().unwrap();
        assert_eq!(&bytes[..4], &[0x80, ARR_L1, 19, LOWERCASE_GUID_STRING]);
        assert_eq!(&bytes[20..], &[STR_R1, 3]);
        assert_eq!(crate::binary::read_string(&bytes, 20, None).unwrap(), guid);
        assert_eq!(crate::binary::try_read_buffered_string(&bytes, 20).unwrap(), None);

        let mut w = BinaryWriter::with_options(WriterOptions::new().with_reference_strings(false));
        w.write_array_start().unwrap();
        w.write_string_value(guid).unwrap();
        w.write_string_value(guid).unwrap();
        w.write_array_end().unwrap();
        let bytes = w.get_result().unwrap();
        assert_eq!(bytes.len(), 3 + 17 + 17);
        assert_eq!(bytes[20], LOWERCASE_GUID_STRING);
    }

    #[test]
    fn test_reference_strings_disabled() {
        let mut w = BinaryWriter::with_options(WriterOptions::new().with_reference_strings(false));
        w.write_array_start().unwrap();
        w.write_string_value("hello").unwrap();
        w.write_string_value("hello").unwrap();
        w.write_array_end().unwrap();
        let bytes = w.get_result().unwrap();
        assert_eq!(bytes.len(), 3 + 12);
    }

    #[test]
    fn test_result_states() {
        let w = BinaryWriter::new();
        assert_eq!(w.get_result().unwrap(), Vec::<u8>::new());
        assert_eq!(w.current_length(), 1);

        let mut w = BinaryWriter::new();
        w.write_array_start().unwrap();
        assert_eq!(w.get_result(), Err(JsonError::NotComplete));
        assert_eq!(w.write_object_end(), Err(JsonError::ObjectNotStarted));
    }
}
