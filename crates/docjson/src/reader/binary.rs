//! Forward-only reader over the binary format.

use std::borrow::Cow;
use std::sync::Arc;

use crate::binary::{self, type_marker};
use crate::dictionary::StringDictionary;
use crate::error::{JsonError, Result};
use crate::guid::Guid;
use crate::number64::Number64;
use crate::object_state::{ContainerKind, ObjectState};
use crate::options::ReaderOptions;
use crate::token::TokenType;

pub struct BinaryReader<'a> {
    buffer: &'a [u8],
    dictionary: Option<Arc<StringDictionary>>,
    state: ObjectState,
    /// End offsets of the open containers.
    ends: Vec<usize>,
    pos: usize,
    token: TokenType,
    start: usize,
    len: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Result<Self> {
        Self::with_options(buffer, &ReaderOptions::default())
    }

    /// Validates the format byte and trims `buffer` to the root value.
    pub fn with_options(buffer: &'a [u8], options: &ReaderOptions) -> Result<Self> {
        if buffer.first() != Some(&type_marker::BINARY_FORMAT) {
            return Err(JsonError::InvalidFormat);
        }
        let buffer = if buffer.len() > 1 {
            &buffer[..1 + binary::value_length(buffer, 1)?]
        } else {
            buffer
        };
        Ok(Self {
            buffer,
            dictionary: options.dictionary.clone(),
            state: ObjectState::new(options.max_depth),
            ends: Vec::new(),
            pos: 1,
            token: TokenType::NotStarted,
            start: 0,
            len: 0,
        })
    }

    pub fn current_token_type(&self) -> TokenType {
        self.token
    }

    pub fn current_depth(&self) -> usize {
        self.state.depth()
    }

    pub fn read(&mut self) -> Result<bool> {
        if let Some(&end) = self.ends.last() {
            if self.pos == end {
                let token = match self.state.container() {
                    Some(ContainerKind::Object) => TokenType::EndObject,
                    _ => TokenType::EndArray,
                };
                self.state.register_token(token)?;
                self.ends.pop();
                self.set_token(token, self.pos, 0);
                return Ok(true);
            }
        }
        if self.pos >= self.buffer.len() {
            return Ok(false);
        }

        let marker = self.buffer[self.pos];
        let len = binary::value_length(self.buffer, self.pos)?;
        let limit = self.ends.last().copied().unwrap_or(self.buffer.len());
        if self.pos + len > limit {
            return Err(JsonError::UnexpectedEndOfBuffer(limit));
        }
        let mut token = binary::token_type(marker)?;
        let start = self.pos;
        match token {
            TokenType::String if self.state.property_expected() => {
                self.state.register_field_name(None)?;
                token = TokenType::FieldName;
                self.pos += len;
            }
            TokenType::BeginArray | TokenType::BeginObject => {
                self.state.register_token(token)?;
                self.ends.push(self.pos + len);
                self.pos += binary::first_value_offset(marker);
            }
            _ => {
                self.state.register_token(token)?;
                self.pos += len;
            }
        }
        self.set_token(token, start, len);
        Ok(true)
    }

    fn set_token(&mut self, token: TokenType, start: usize, len: usize) {
        self.token = token;
        self.start = start;
        self.len = len;
    }

    fn expect(&self, expected: TokenType) -> Result<()> {
        if self.token != expected {
            return Err(JsonError::WrongTokenType { expected, actual: self.token });
        }
        Ok(())
    }

    pub fn get_string_value(&self) -> Result<Cow<'_, str>> {
        match self.token {
            TokenType::String | TokenType::FieldName => {
                binary::read_string(self.buffer, self.start, self.dictionary.as_deref())
            }
            other => Err(JsonError::NotStringToken(other)),
        }
    }

    pub fn try_get_buffered_string(&self) -> Option<&'a str> {
        match self.token {
            TokenType::String | TokenType::FieldName => {
                binary::try_read_buffered_string(self.buffer, self.start).ok().flatten()
            }
            _ => None,
        }
    }

    pub fn get_number_value(&self) -> Result<Number64> {
        match self.token {
            TokenType::Number => binary::read_number(self.buffer, self.start),
            other => Err(JsonError::NotNumberToken(other)),
        }
    }

    pub fn get_int8_value(&self) -> Result<i8> {
        self.expect(TokenType::Int8)?;
        binary::read_int8(self.buffer, self.start)
    }

    pub fn get_int16_value(&self) -> Result<i16> {
        self.expect(TokenType::Int16)?;
        binary::read_int16(self.buffer, self.start)
    }

    pub fn get_int32_value(&self) -> Result<i32> {
        self.expect(TokenType::Int32)?;
        binary::read_int32(self.buffer, self.start)
    }

    pub fn get_int64_value(&self) -> Result<i64> {
        self.expect(TokenType::Int64)?;
        binary::read_int64(self.buffer, self.start)
    }

    pub fn get_uint32_value(&self) -> Result<u32> {
        self.expect(TokenType::UInt32)?;
        binary::read_uint32(self.buffer, self.start)
    }

    pub fn get_float32_value(&self) -> Result<f32> {
        self.expect(TokenType::Float32)?;
        binary::read_float32(self.buffer, self.start)
    }

    pub fn get_float64_value(&self) -> Result<f64> {
        self.expect(TokenType::Float64)?;
        binary::read_float64(self.buffer, self.start)
    }

    pub fn get_guid_value(&self) -> Result<Guid> {
        self.expect(TokenType::Guid)?;
        binary::read_guid(self.buffer, self.start)
    }

    pub fn get_binary_value(&self) -> Result<&'a [u8]> {
        self.expect(TokenType::Binary)?;
        binary::read_binary(self.buffer, self.start)
    }

    /// Marker and payload of the current token. Containers span all their items.
    pub fn buffered_raw_token(&self) -> &'a [u8] {
        &self.buffer[self.start..self.start + self.len]
    }
}
