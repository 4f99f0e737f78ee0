//! Forward-only token readers.
//!
//! [`JsonReader`] picks the text or binary implementation from the first
//! byte of the buffer and exposes one contract over both.

mod binary;
mod text;

use std::borrow::Cow;

pub use binary::BinaryReader;
pub use text::TextReader;

use crate::error::{JsonError, Result};
use crate::guid::Guid;
use crate::number64::{non_finite_from_str, Number64};
use crate::options::ReaderOptions;
use crate::token::{SerializationFormat, TokenType};

pub enum JsonReader<'a> {
    Text(TextReader<'a>),
    Binary(BinaryReader<'a>),
}

macro_rules! dispatch {
    ($self:ident, $reader:ident => $body:expr) => {
        match $self {
            JsonReader::Text($reader) => $body,
            JsonReader::Binary($reader) => $body,
        }
    };
}

impl<'a> JsonReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Result<Self> {
        Self::with_options(buffer, &ReaderOptions::default())
    }

    pub fn with_options(buffer: &'a [u8], options: &ReaderOptions) -> Result<Self> {
        Ok(match SerializationFormat::detect(buffer) {
            SerializationFormat::Text => JsonReader::Text(TextReader::with_options(buffer, options)),
            SerializationFormat::Binary => {
                JsonReader::Binary(BinaryReader::with_options(buffer, options)?)
            }
        })
    }

    pub fn serialization_format(&self) -> SerializationFormat {
        match self {
            JsonReader::Text(_) => SerializationFormat::Text,
            JsonReader::Binary(_) => SerializationFormat::Binary,
        }
    }

    /// `NotStarted` until the first successful [`read`](Self::read).
    pub fn current_token_type(&self) -> TokenType {
        dispatch!(self, r => r.current_token_type())
    }

    pub fn current_depth(&self) -> usize {
        dispatch!(self, r => r.current_depth())
    }

    /// Advances one token. Returns `false` once the buffer is exhausted.
    pub fn read(&mut self) -> Result<bool> {
        dispatch!(self, r => r.read())
    }

    /// Value of a `String` or `FieldName` token.
    pub fn get_string_value(&self) -> Result<Cow<'_, str>> {
        dispatch!(self, r => r.get_string_value())
    }

    /// Zero-copy view of the current string when its bytes are stored verbatim.
    pub fn try_get_buffered_string(&self) -> Option<&'a str> {
        dispatch!(self, r => r.try_get_buffered_string())
    }

    /// Value of a `Number` token.
    ///
    /// A `String` token holding `"NaN"`, `"Infinity"` or `"-Infinity"` is read
    /// back as the matching double, since that is how writers store them in text.
    pub fn get_number_value(&self) -> Result<Number64> {
        if self.current_token_type() == TokenType::String {
            return non_finite_from_str(&self.get_string_value()?)
                .ok_or(JsonError::NotNumberToken(TokenType::String));
        }
        dispatch!(self, r => r.get_number_value())
    }

    pub fn get_int8_value(&self) -> Result<i8> {
        dispatch!(self, r => r.get_int8_value())
    }

    pub fn get_int16_value(&self) -> Result<i16> {
        dispatch!(self, r => r.get_int16_value())
    }

    pub fn get_int32_value(&self) -> Result<i32> {
        dispatch!(self, r => r.get_int32_value())
    }

    pub fn get_int64_value(&self) -> Result<i64> {
        dispatch!(self, r => r.get_int64_value())
    }

    pub fn get_uint32_value(&self) -> Result<u32> {
        dispatch!(self, r => r.get_uint32_value())
    }

    pub fn get_float32_value(&self) -> Result<f32> {
        dispatch!(self, r => r.get_float32_value())
    }

    pub fn get_float64_value(&self) -> Result<f64> {
        dispatch!(self, r => r.get_float64_value())
    }

    pub fn get_guid_value(&self) -> Result<Guid> {
        dispatch!(self, r => r.get_guid_value())
    }

    pub fn get_binary_value(&self) -> Result<Cow<'_, [u8]>> {
        match self {
            JsonReader::Text(r) => r.get_binary_value(),
            JsonReader::Binary(r) => r.get_binary_value().map(Cow::Borrowed),
        }
    }

    /// Exact bytes of the current token in the source buffer.
    pub fn buffered_raw_token(&self) -> &'a [u8] {
        dispatch!(self, r => r.buffered_raw_token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_format() {
        let text = JsonReader::new(b"[1]").unwrap();
        assert_eq!(text.serialization_format(), SerializationFormat::Text);
        let binary = JsonReader::new(&[0x80, 0xE0]).unwrap();
        assert_eq!(binary.serialization_format(), SerializationFormat::Binary);
        assert_eq!(binary.current_token_type(), TokenType::NotStarted);
    }

    #[test]
    fn test_nan_sentinels() {
        let mut reader = JsonReader::new(br#"["NaN", "-Infinity", "nan"]"#).unwrap();
        reader.read().unwrap();
        reader.read().unwrap();
        assert!(reader.get_number_value().unwrap().is_nan());
        assert_eq!(reader.get_string_value().unwrap(), "NaN");
        reader.read().unwrap();
        assert_eq!(reader.get_number_value().unwrap(), Number64::Double(f64::NEG_INFINITY));
        reader.read().unwrap();
        assert_eq!(reader.get_number_value(), Err(JsonError::NotNumberToken(TokenType::String)));
    }
}
