//! Token writers.
//!
//! [`JsonWriter`] wraps the text or binary implementation behind one contract
//! and adds the transcoding helpers that copy from a reader or a navigator.

mod binary;
mod text;

pub use binary::BinaryWriter;
pub use text::TextWriter;

use tracing::debug;

use crate::error::{JsonError, Result};
use crate::guid::Guid;
use crate::navigator::{JsonNavigator, Node};
use crate::number64::Number64;
use crate::options::WriterOptions;
use crate::reader::JsonReader;
use crate::token::{NodeType, SerializationFormat, TokenType};

pub enum JsonWriter {
    Text(TextWriter),
    Binary(BinaryWriter),
}

macro_rules! dispatch {
    ($self:ident, $writer:ident => $body:expr) => {
        match $self {
            JsonWriter::Text($writer) => $body,
            JsonWriter::Binary($writer) => $body,
        }
    };
}

impl JsonWriter {
    pub fn text() -> Self {
        JsonWriter::Text(TextWriter::new())
    }

    pub fn binary() -> Self {
        JsonWriter::Binary(BinaryWriter::new())
    }

    pub fn binary_with_options(options: WriterOptions) -> Self {
        JsonWriter::Binary(BinaryWriter::with_options(options))
    }

    /// Text writers have no options; `options` only shapes binary output.
    pub fn new(format: SerializationFormat, options: WriterOptions) -> Self {
        match format {
            SerializationFormat::Text => Self::text(),
            SerializationFormat::Binary => Self::binary_with_options(options),
        }
    }

    pub fn serialization_format(&self) -> SerializationFormat {
        match self {
            JsonWriter::Text(_) => SerializationFormat::Text,
            JsonWriter::Binary(_) => SerializationFormat::Binary,
        }
    }

    pub fn current_length(&self) -> usize {
        dispatch!(self, w => w.current_length())
    }

    pub fn write_object_start(&mut self) -> Result<()> {
        dispatch!(self, w => w.write_object_start())
    }

    pub fn write_object_end(&mut self) -> Result<()> {
        dispatch!(self, w => w.write_object_end())
    }

    pub fn write_array_start(&mut self) -> Result<()> {
        dispatch!(self, w => w.write_array_start())
    }

    pub fn write_array_end(&mut self) -> Result<()> {
        dispatch!(self, w => w.write_array_end())
    }

    pub fn write_field_name(&mut self, name: &str) -> Result<()> {
        dispatch!(self, w => w.write_field_name(name))
    }

    pub fn write_string_value(&mut self, value: &str) -> Result<()> {
        dispatch!(self, w => w.write_string_value(value))
    }

    pub fn write_number64_value(&mut self, value: Number64) -> Result<()> {
        dispatch!(self, w => w.write_number64_value(value))
    }

    pub fn write_bool_value(&mut self, value: bool) -> Result<()> {
        dispatch!(self, w => w.write_bool_value(value))
    }

    pub fn write_null_value(&mut self) -> Result<()> {
        dispatch!(self, w => w.write_null_value())
    }

    pub fn write_int8_value(&mut self, value: i8) -> Result<()> {
        dispatch!(self, w => w.write_int8_value(value))
    }

    pub fn write_int16_value(&mut self, value: i16) -> Result<()> {
        dispatch!(self, w => w.write_int16_value(value))
    }

    pub fn write_int32_value(&mut self, value: i32) -> Result<()> {
        dispatch!(self, w => w.write_int32_value(value))
    }

    pub fn write_int64_value(&mut self, value: i64) -> Result<()> {
        dispatch!(self, w => w.write_int64_value(value))
    }

    pub fn write_uint32_value(&mut self, value: u32) -> Result<()> {
        dispatch!(self, w => w.write_uint32_value(value))
    }

    pub fn write_float32_value(&mut self, value: f32) -> Result<()> {
        dispatch!(self, w => w.write_float32_value(value))
    }

    pub fn write_float64_value(&mut self, value: f64) -> Result<()> {
        dispatch!(self, w => w.write_float64_value(value))
    }

    pub fn write_guid_value(&mut self, value: Guid) -> Result<()> {
        dispatch!(self, w => w.write_guid_value(value))
    }

    pub fn write_binary_value(&mut self, value: &[u8]) -> Result<()> {
        dispatch!(self, w => w.write_binary_value(value))
    }

    /// Encoded document. Fails with `NotComplete` while containers are open.
    pub fn get_result(&self) -> Result<Vec<u8>> {
        dispatch!(self, w => w.get_result())
    }

    /// Copies the token the reader is positioned on.
    pub fn write_current_token(&mut self, reader: &JsonReader<'_>) -> Result<()> {
        match reader.current_token_type() {
            TokenType::NotStarted => Err(JsonError::UnexpectedToken),
            TokenType::BeginArray => self.write_array_start(),
            TokenType::EndArray => self.write_array_end(),
            TokenType::BeginObject => self.write_object_start(),
            TokenType::EndObject => self.write_object_end(),
            TokenType::FieldName => self.write_field_name(&reader.get_string_value()?),
            TokenType::String => self.write_string_value(&reader.get_string_value()?),
            TokenType::Number => self.write_number64_value(reader.get_number_value()?),
            TokenType::True => self.write_bool_value(true),
            TokenType::False => self.write_bool_value(false),
            TokenType::Null => self.write_null_value(),
            TokenType::Int8 => self.write_int8_value(reader.get_int8_value()?),
            TokenType::Int16 => self.write_int16_value(reader.get_int16_value()?),
            TokenType::Int32 => self.write_int32_value(reader.get_int32_value()?),
            TokenType::Int64 => self.write_int64_value(reader.get_int64_value()?),
            TokenType::UInt32 => self.write_uint32_value(reader.get_uint32_value()?),
            TokenType::Float32 => self.write_float32_value(reader.get_float32_value()?),
            TokenType::Float64 => self.write_float64_value(reader.get_float64_value()?),
            TokenType::Guid => self.write_guid_value(reader.get_guid_value()?),
            TokenType::Binary => self.write_binary_value(&reader.get_binary_value()?),
        }
    }

    /// Drains the reader into this writer, token by token.
    pub fn write_all(&mut self, reader: &mut JsonReader<'_>) -> Result<()> {
        let mut tokens = 0usize;
        while reader.read()? {
            self.write_current_token(reader)?;
            tokens += 1;
        }
        debug!(
            tokens,
            from = ?reader.serialization_format(),
            to = ?self.serialization_format(),
            "transcoded reader"
        );
        Ok(())
    }

    /// Writes the value at `node`, recursing into containers.
    pub fn write_node(&mut self, navigator: &JsonNavigator<'_>, node: Node) -> Result<()> {
        match navigator.get_node_type(node)? {
            NodeType::Array => {
                self.write_array_start()?;
                for item in navigator.get_array_items(node)? {
                    self.write_node(navigator, item?)?;
                }
                self.write_array_end()
            }
            NodeType::Object => {
                self.write_object_start()?;
                for property in navigator.get_object_properties(node)? {
                    let property = property?;
                    self.write_field_name(&navigator.get_string_value(property.name)?)?;
                    self.write_node(navigator, property.value)?;
                }
                self.write_object_end()
            }
            NodeType::FieldName => self.write_field_name(&navigator.get_string_value(node)?),
            NodeType::String => self.write_string_value(&navigator.get_string_value(node)?),
            NodeType::Number => self.write_number64_value(navigator.get_number_value(node)?),
            NodeType::True => self.write_bool_value(true),
            NodeType::False => self.write_bool_value(false),
            NodeType::Null => self.write_null_value(),
            NodeType::Int8 => self.write_int8_value(navigator.get_int8_value(node)?),
            NodeType::Int16 => self.write_int16_value(navigator.get_int16_value(node)?),
            NodeType::Int32 => self.write_int32_value(navigator.get_int32_value(node)?),
            NodeType::Int64 => self.write_int64_value(navigator.get_int64_value(node)?),
            NodeType::UInt32 => self.write_uint32_value(navigator.get_uint32_value(node)?),
            NodeType::Float32 => self.write_float32_value(navigator.get_float32_value(node)?),
            NodeType::Float64 => self.write_float64_value(navigator.get_float64_value(node)?),
            NodeType::Guid => self.write_guid_value(navigator.get_guid_value(node)?),
            NodeType::Binary => self.write_binary_value(&navigator.get_binary_value(node)?),
        }
    }
}
