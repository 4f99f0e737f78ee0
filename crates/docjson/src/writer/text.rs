//! Writer for UTF-8 JSON text with the sigil extensions.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use docjson_buffers::Writer;
use tracing::debug;

use crate::error::{JsonError, Result};
use crate::guid::Guid;
use crate::number64::{format_f32, format_f64, Number64};
use crate::object_state::ObjectState;
use crate::options::DEFAULT_MAX_DEPTH;
use crate::text_util::write_escaped;
use crate::token::TokenType;

pub struct TextWriter {
    out: Writer,
    state: ObjectState,
    first_value: bool,
}

fn special_float_name(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("NaN")
    } else if value == f64::INFINITY {
        Some("Infinity")
    } else if value == f64::NEG_INFINITY {
        Some("-Infinity")
    } else {
        None
    }
}

impl TextWriter {
    pub fn new() -> Self {
        Self {
            out: Writer::new(),
            state: ObjectState::new(DEFAULT_MAX_DEPTH),
            first_value: true,
        }
    }

    pub fn current_length(&self) -> usize {
        self.out.len()
    }

    fn separator(&mut self) {
        if !self.first_value {
            self.out.u8(b',');
        }
        self.first_value = false;
    }

    fn value(&mut self, token: TokenType) -> Result<()> {
        self.state.register_token(token)?;
        self.separator();
        Ok(())
    }

    pub fn write_object_start(&mut self) -> Result<()> {
        self.value(TokenType::BeginObject)?;
        self.out.u8(b'{');
        self.first_value = true;
        Ok(())
    }

    pub fn write_object_end(&mut self) -> Result<()> {
        self.state.register_token(TokenType::EndObject)?;
        self.out.u8(b'}');
        self.first_value = false;
        Ok(())
    }

    pub fn write_array_start(&mut self) -> Result<()> {
        self.value(TokenType::BeginArray)?;
        self.out.u8(b'[');
        self.first_value = true;
        Ok(())
    }

    pub fn write_array_end(&mut self) -> Result<()> {
        self.state.register_token(TokenType::EndArray)?;
        self.out.u8(b']');
        self.first_value = false;
        Ok(())
    }

    pub fn write_field_name(&mut self, name: &str) -> Result<()> {
        self.state.register_field_name(Some(name))?;
        self.separator();
        write_escaped(&mut self.out, name);
        self.out.u8(b':');
        self.first_value = true;
        Ok(())
    }

    pub fn write_string_value(&mut self, value: &str) -> Result<()> {
        self.value(TokenType::String)?;
        write_escaped(&mut self.out, value);
        Ok(())
    }

    /// Non-finite doubles are written as the quoted strings `"NaN"`,
    /// `"Infinity"` and `"-Infinity"`.
    pub fn write_number64_value(&mut self, value: Number64) -> Result<()> {
        self.value(TokenType::Number)?;
        match value {
            Number64::Integer(i) => self.out.utf8(&i.to_string()),
            Number64::Double(d) => match special_float_name(d) {
                Some(name) => {
                    self.out.u8(b'"');
                    self.out.utf8(name);
                    self.out.u8(b'"');
                }
                None => self.out.utf8(&format_f64(d)),
            },
        }
        Ok(())
    }

    pub fn write_bool_value(&mut self, value: bool) -> Result<()> {
        self.value(if value { TokenType::True } else { TokenType::False })?;
        self.out.utf8(if value { "true" } else { "false" });
        Ok(())
    }

    pub fn write_null_value(&mut self) -> Result<()> {
        self.value(TokenType::Null)?;
        self.out.utf8("null");
        Ok(())
    }

    fn write_sigil(&mut self, token: TokenType, sigil: &str, literal: &str) -> Result<()> {
        self.value(token)?;
        self.out.utf8(sigil);
        self.out.utf8(literal);
        Ok(())
    }

    pub fn write_int8_value(&mut self, value: i8) -> Result<()> {
        self.write_sigil(TokenType::Int8, "I", &value.to_string())
    }

    pub fn write_int16_value(&mut self, value: i16) -> Result<()> {
        self.write_sigil(TokenType::Int16, "H", &value.to_string())
    }

    pub fn write_int32_value(&mut self, value: i32) -> Result<()> {
        self.write_sigil(TokenType::Int32, "L", &value.to_string())
    }

    pub fn write_int64_value(&mut self, value: i64) -> Result<()> {
        self.write_sigil(TokenType::Int64, "LL", &value.to_string())
    }

    pub fn write_uint32_value(&mut self, value: u32) -> Result<()> {
        self.write_sigil(TokenType::UInt32, "UL", &value.to_string())
    }

    pub fn write_float32_value(&mut self, value: f32) -> Result<()> {
        let literal = match special_float_name(f64::from(value)) {
            Some(name) => name.to_owned(),
            None => format_f32(value),
        };
        self.write_sigil(TokenType::Float32, "S", &literal)
    }

    pub fn write_float64_value(&mut self, value: f64) -> Result<()> {
        let literal = match special_float_name(value) {
            Some(name) => name.to_owned(),
            None => format_f64(value),
        };
        self.write_sigil(TokenType::Float64, "D", &literal)
    }

    pub fn write_guid_value(&mut self, value: Guid) -> Result<()> {
        self.write_sigil(TokenType::Guid, "G", &value.to_string())
    }

    pub fn write_binary_value(&mut self, value: &[u8]) -> Result<()> {
        self.write_sigil(TokenType::Binary, "B", &STANDARD.encode(value))
    }

    /// The finished document. Fails while containers are open or before any
    /// value was written.
    pub fn get_result(&self) -> Result<Vec<u8>> {
        if !self.state.is_complete() {
            return Err(JsonError::NotComplete);
        }
        debug!(format = "text", length = self.out.len(), "json writer finished");
        Ok(self.out.as_slice().to_vec())
    }
}

impl Default for TextWriter {
    fn default() -> Self {
        Self::new()
    }
}
