//! Forward-only reader over UTF-8 JSON text with the sigil extensions
//! (`I`, `H`, `L`, `LL`, `UL`, `S`, `D`, `G`, `B`).

use std::borrow::Cow;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{JsonError, Result};
use crate::guid::Guid;
use crate::number64::Number64;
use crate::object_state::ObjectState;
use crate::options::ReaderOptions;
use crate::text_util::{is_delimiter, is_whitespace, parse_number, scan_number, scan_string, unescape};
use crate::token::TokenType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Separator {
    None,
    Name,
    Value,
}

pub struct TextReader<'a> {
    buffer: &'a [u8],
    pos: usize,
    state: ObjectState,
    separator: Separator,
    token: TokenType,
    start: usize,
    end: usize,
    has_escapes: bool,
    number: Number64,
    integer: i64,
    float: f64,
    guid: Guid,
    binary: Vec<u8>,
}

impl<'a> TextReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self::with_options(buffer, &ReaderOptions::default())
    }

    pub fn with_options(buffer: &'a [u8], options: &ReaderOptions) -> Self {
        Self {
            buffer,
            pos: 0,
            state: ObjectState::new(options.max_depth),
            separator: Separator::None,
            token: TokenType::NotStarted,
            start: 0,
            end: 0,
            has_escapes: false,
            number: Number64::Integer(0),
            integer: 0,
            float: 0.0,
            guid: Guid::default(),
            binary: Vec::new(),
        }
    }

    pub fn current_token_type(&self) -> TokenType {
        self.token
    }

    pub fn current_depth(&self) -> usize {
        self.state.depth()
    }

    fn peek(&self) -> Option<u8> {
        self.buffer.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if is_whitespace(c)) {
            self.pos += 1;
        }
    }

    fn missing_end(&self) -> JsonError {
        if self.state.in_object() {
            JsonError::MissingEndObject
        } else {
            JsonError::MissingEndArray
        }
    }

    pub fn read(&mut self) -> Result<bool> {
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b':') => {
                    if self.token != TokenType::FieldName || self.separator != Separator::None {
                        return Err(JsonError::UnexpectedNameSeparator);
                    }
                    self.separator = Separator::Name;
                }
                Some(b',') => {
                    if !self.token.is_value_end()
                        || self.separator != Separator::None
                        || self.state.depth() == 0
                    {
                        return Err(JsonError::UnexpectedValueSeparator);
                    }
                    self.separator = Separator::Value;
                }
                _ => break,
            }
            self.pos += 1;
        }

        let Some(c) = self.peek() else {
            if self.state.depth() > 0 {
                return Err(self.missing_end());
            }
            return Ok(false);
        };
        if self.state.is_complete() {
            return Err(JsonError::InvalidToken(self.pos));
        }

        self.start = self.pos;
        match c {
            b'}' | b']' => {
                let (token, err) = if c == b'}' {
                    (TokenType::EndObject, JsonError::UnexpectedEndObject)
                } else {
                    (TokenType::EndArray, JsonError::UnexpectedEndArray)
                };
                if self.separator != Separator::None {
                    return Err(err);
                }
                self.state.register_token(token)?;
                self.pos += 1;
                self.finish(token);
                return Ok(true);
            }
            _ => self.check_value_separator()?,
        }

        let token = match c {
            b'{' => {
                self.pos += 1;
                TokenType::BeginObject
            }
            b'[' => {
                self.pos += 1;
                TokenType::BeginArray
            }
            b'"' => {
                let (end, escaped) = scan_string(self.buffer, self.pos)?;
                std::str::from_utf8(&self.buffer[self.pos + 1..end - 1])
                    .map_err(|_| JsonError::InvalidUtf8)?;
                self.has_escapes = escaped;
                self.pos = end;
                if self.state.property_expected() {
                    self.state.register_field_name(None)?;
                    self.finish(TokenType::FieldName);
                    return Ok(true);
                }
                TokenType::String
            }
            b't' => self.literal(b"true", TokenType::True)?,
            b'f' => self.literal(b"false", TokenType::False)?,
            b'n' => self.literal(b"null", TokenType::Null)?,
            b'-' | b'0'..=b'9' => {
                let end = scan_number(self.buffer, self.pos)?;
                self.number = parse_number(self.lexeme(self.pos, end))?;
                self.pos = end;
                TokenType::Number
            }
            b'I' => self.sigil_integer(1, TokenType::Int8, i64::from(i8::MIN), i64::from(i8::MAX))?,
            b'H' => self.sigil_integer(1, TokenType::Int16, i64::from(i16::MIN), i64::from(i16::MAX))?,
            b'L' if self.buffer.get(self.pos + 1) == Some(&b'L') => {
                self.sigil_integer(2, TokenType::Int64, i64::MIN, i64::MAX)?
            }
            b'L' => self.sigil_integer(1, TokenType::Int32, i64::from(i32::MIN), i64::from(i32::MAX))?,
            b'U' if self.buffer.get(self.pos + 1) == Some(&b'L') => {
                self.sigil_integer(2, TokenType::UInt32, 0, i64::from(u32::MAX))?
            }
            b'S' => self.sigil_float(TokenType::Float32)?,
            b'D' => self.sigil_float(TokenType::Float64)?,
            b'G' => self.sigil_guid()?,
            b'B' => self.sigil_binary()?,
            _ => return Err(JsonError::InvalidToken(self.pos)),
        };
        self.state.register_token(token)?;
        self.finish(token);
        Ok(true)
    }

    fn check_value_separator(&self) -> Result<()> {
        if self.token == TokenType::FieldName {
            if self.separator != Separator::Name {
                return Err(JsonError::MissingNameSeparator);
            }
        } else if self.token.is_value_end() && self.separator != Separator::Value {
            return Err(JsonError::MissingValueSeparator);
        }
        Ok(())
    }

    fn finish(&mut self, token: TokenType) {
        self.token = token;
        self.end = self.pos;
        self.separator = Separator::None;
    }

    fn lexeme(&self, start: usize, end: usize) -> &'a str {
        // Number and base64 lexemes are validated ASCII.
        std::str::from_utf8(&self.buffer[start..end]).unwrap_or_default()
    }

    fn literal(&mut self, word: &[u8], token: TokenType) -> Result<TokenType> {
        let end = self.pos + word.len();
        if self.buffer.get(self.pos..end) != Some(word) || !is_delimiter(self.buffer.get(end).copied()) {
            return Err(JsonError::InvalidToken(self.pos));
        }
        self.pos = end;
        Ok(token)
    }

    fn sigil_integer(&mut self, sigil: usize, token: TokenType, min: i64, max: i64) -> Result<TokenType> {
        let from = self.pos + sigil;
        let end = scan_number(self.buffer, from)?;
        let lexeme = self.lexeme(from, end);
        let value = lexeme.parse::<i64>().map_err(|_| JsonError::InvalidNumber(from))?;
        if value < min || value > max {
            return Err(JsonError::NumberOutOfRange(lexeme.to_owned()));
        }
        self.integer = value;
        self.pos = end;
        Ok(token)
    }

    fn sigil_float(&mut self, token: TokenType) -> Result<TokenType> {
        let from = self.pos + 1;
        let rest = &self.buffer[from..];
        let special = [
            (&b"NaN"[..], f64::NAN),
            (&b"Infinity"[..], f64::INFINITY),
            (&b"-Infinity"[..], f64::NEG_INFINITY),
        ]
        .into_iter()
        .find(|(word, _)| rest.starts_with(word) && is_delimiter(rest.get(word.len()).copied()));
        let (value, end) = match special {
            Some((word, value)) => (value, from + word.len()),
            None => {
                let end = scan_number(self.buffer, from)?;
                let value = self
                    .lexeme(from, end)
                    .parse::<f64>()
                    .map_err(|_| JsonError::InvalidNumber(from))?;
                (value, end)
            }
        };
        if token == TokenType::Float32 && value.is_finite() && (value as f32).is_infinite() {
            return Err(JsonError::NumberOutOfRange(self.lexeme(from, end).to_owned()));
        }
        self.float = value;
        self.pos = end;
        Ok(token)
    }

    fn sigil_guid(&mut self) -> Result<TokenType> {
        let from = self.pos + 1;
        let end = from + Guid::TEXT_LENGTH;
        let text = self
            .buffer
            .get(from..end)
            .and_then(|t| std::str::from_utf8(t).ok())
            .ok_or(JsonError::InvalidGuid)?;
        if !is_delimiter(self.buffer.get(end).copied()) {
            return Err(JsonError::InvalidGuid);
        }
        self.guid = Guid::from_str(text)?;
        self.pos = end;
        Ok(TokenType::Guid)
    }

    fn sigil_binary(&mut self) -> Result<TokenType> {
        let from = self.pos + 1;
        let mut end = from;
        while matches!(self.buffer.get(end), Some(c) if c.is_ascii_alphanumeric() || matches!(c, b'+' | b'/' | b'=')) {
            end += 1;
        }
        if !is_delimiter(self.buffer.get(end).copied()) {
            return Err(JsonError::InvalidToken(end));
        }
        self.binary = STANDARD.decode(&self.buffer[from..end])?;
        self.pos = end;
        Ok(TokenType::Binary)
    }

    fn expect(&self, expected: TokenType) -> Result<()> {
        if self.token != expected {
            return Err(JsonError::WrongTokenType { expected, actual: self.token });
        }
        Ok(())
    }

    fn string_body(&self) -> Result<&'a [u8]> {
        match self.token {
            TokenType::String | TokenType::FieldName => Ok(&self.buffer[self.start + 1..self.end - 1]),
            other => Err(JsonError::NotStringToken(other)),
        }
    }

    pub fn get_string_value(&self) -> Result<Cow<'a, str>> {
        let body = self.string_body()?;
        if self.has_escapes {
            return Ok(Cow::Owned(unescape(body, self.start + 1)?));
        }
        std::str::from_utf8(body)
            .map(Cow::Borrowed)
            .map_err(|_| JsonError::InvalidUtf8)
    }

    pub fn try_get_buffered_string(&self) -> Option<&'a str> {
        let body = self.string_body().ok()?;
        if self.has_escapes {
            return None;
        }
        std::str::from_utf8(body).ok()
    }

    pub fn get_number_value(&self) -> Result<Number64> {
        match self.token {
            TokenType::Number => Ok(self.number),
            other => Err(JsonError::NotNumberToken(other)),
        }
    }

    pub fn get_int8_value(&self) -> Result<i8> {
        self.expect(TokenType::Int8)?;
        Ok(self.integer as i8)
    }

    pub fn get_int16_value(&self) -> Result<i16> {
        self.expect(TokenType::Int16)?;
        Ok(self.integer as i16)
    }

    pub fn get_int32_value(&self) -> Result<i32> {
        self.expect(TokenType::Int32)?;
        Ok(self.integer as i32)
    }

    pub fn get_int64_value(&self) -> Result<i64> {
        self.expect(TokenType::Int64)?;
        Ok(self.integer)
    }

    pub fn get_uint32_value(&self) -> Result<u32> {
        self.expect(TokenType::UInt32)?;
        Ok(self.integer as u32)
    }

    pub fn get_float32_value(&self) -> Result<f32> {
        self.expect(TokenType::Float32)?;
        Ok(self.float as f32)
    }

    pub fn get_float64_value(&self) -> Result<f64> {
        self.expect(TokenType::Float64)?;
        Ok(self.float)
    }

    pub fn get_guid_value(&self) -> Result<Guid> {
        self.expect(TokenType::Guid)?;
        Ok(self.guid)
    }

    pub fn get_binary_value(&self) -> Result<Cow<'_, [u8]>> {
        self.expect(TokenType::Binary)?;
        Ok(Cow::Borrowed(self.binary.as_slice()))
    }

    /// The lexeme of the current token, quotes and sigils included.
    pub fn buffered_raw_token(&self) -> &'a [u8] {
        &self.buffer[self.start..self.end]
    }

    /// Byte range of the current token in the source buffer.
    pub(crate) fn token_span(&self) -> (usize, usize) {
        (self.start, self.end)
    }
}
