//! Bridge to `serde_json::Value`, built only on the reader, writer and
//! navigator contracts.
//!
//! Extended types have no `serde_json` counterpart and widen on the way in:
//! sized integers and floats become numbers, GUIDs become their dashed text
//! and binary values become standard base64 strings. Non-finite doubles become
//! the same `"NaN"` / `"Infinity"` / `"-Infinity"` strings the text writer emits.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Number, Value};

use crate::error::{JsonError, Result};
use crate::navigator::{JsonNavigator, Node};
use crate::number64::Number64;
use crate::options::{ReaderOptions, WriterOptions};
use crate::reader::JsonReader;
use crate::token::{NodeType, SerializationFormat, TokenType};
use crate::writer::JsonWriter;

fn number_value(number: Number64) -> Value {
    match number {
        Number64::Integer(i) => Value::Number(i.into()),
        Number64::Double(d) => float_value(d),
    }
}

fn float_value(value: f64) -> Value {
    match Number::from_f64(value) {
        Some(number) => Value::Number(number),
        None if value.is_nan() => Value::String("NaN".to_owned()),
        None if value > 0.0 => Value::String("Infinity".to_owned()),
        None => Value::String("-Infinity".to_owned()),
    }
}

/// Reads one complete value starting at the next token.
pub fn read_value(reader: &mut JsonReader<'_>) -> Result<Value> {
    if !reader.read()? {
        return Err(JsonError::NotComplete);
    }
    current_value(reader)
}

fn current_value(reader: &mut JsonReader<'_>) -> Result<Value> {
    Ok(match reader.current_token_type() {
        TokenType::BeginArray => {
            let mut items = Vec::new();
            loop {
                if !reader.read()? {
                    return Err(JsonError::MissingEndArray);
                }
                if reader.current_token_type() == TokenType::EndArray {
                    break;
                }
                items.push(current_value(reader)?);
            }
            Value::Array(items)
        }
        TokenType::BeginObject => {
            let mut map = Map::new();
            loop {
                if !reader.read()? {
                    return Err(JsonError::MissingEndObject);
                }
                if reader.current_token_type() == TokenType::EndObject {
                    break;
                }
                let name = reader.get_string_value()?.into_owned();
                if !reader.read()? {
                    return Err(JsonError::MissingEndObject);
                }
                let value = current_value(reader)?;
                map.entry(name).or_insert(value);
            }
            Value::Object(map)
        }
        TokenType::String => Value::String(reader.get_string_value()?.into_owned()),
        TokenType::Number => number_value(reader.get_number_value()?),
        TokenType::True => Value::Bool(true),
        TokenType::False => Value::Bool(false),
        TokenType::Null => Value::Null,
        TokenType::Int8 => Value::from(reader.get_int8_value()?),
        TokenType::Int16 => Value::from(reader.get_int16_value()?),
        TokenType::Int32 => Value::from(reader.get_int32_value()?),
        TokenType::Int64 => Value::from(reader.get_int64_value()?),
        TokenType::UInt32 => Value::from(reader.get_uint32_value()?),
        TokenType::Float32 => float_value(f64::from(reader.get_float32_value()?)),
        TokenType::Float64 => float_value(reader.get_float64_value()?),
        TokenType::Guid => Value::String(reader.get_guid_value()?.to_string()),
        TokenType::Binary => Value::String(STANDARD.encode(reader.get_binary_value()?)),
        TokenType::NotStarted | TokenType::EndArray | TokenType::EndObject | TokenType::FieldName => {
            return Err(JsonError::UnexpectedToken)
        }
    })
}

/// Converts the value at `node` without going through a reader.
pub fn node_value(navigator: &JsonNavigator<'_>, node: Node) -> Result<Value> {
    Ok(match navigator.get_node_type(node)? {
        NodeType::Array => Value::Array(
            navigator
                .get_array_items(node)?
                .map(|item| node_value(navigator, item?))
                .collect::<Result<_>>()?,
        ),
        NodeType::Object => {
            let mut map = Map::new();
            for property in navigator.get_object_properties(node)? {
                let property = property?;
                let name = navigator.get_string_value(property.name)?.into_owned();
                let value = node_value(navigator, property.value)?;
                map.entry(name).or_insert(value);
            }
            Value::Object(map)
        }
        NodeType::String | NodeType::FieldName => {
            Value::String(navigator.get_string_value(node)?.into_owned())
        }
        NodeType::Number => number_value(navigator.get_number_value(node)?),
        NodeType::True => Value::Bool(true),
        NodeType::False => Value::Bool(false),
        NodeType::Null => Value::Null,
        NodeType::Int8 => Value::from(navigator.get_int8_value(node)?),
        NodeType::Int16 => Value::from(navigator.get_int16_value(node)?),
        NodeType::Int32 => Value::from(navigator.get_int32_value(node)?),
        NodeType::Int64 => Value::from(navigator.get_int64_value(node)?),
        NodeType::UInt32 => Value::from(navigator.get_uint32_value(node)?),
        NodeType::Float32 => float_value(f64::from(navigator.get_float32_value(node)?)),
        NodeType::Float64 => float_value(navigator.get_float64_value(node)?),
        NodeType::Guid => Value::String(navigator.get_guid_value(node)?.to_string()),
        NodeType::Binary => Value::String(STANDARD.encode(navigator.get_binary_value(node)?)),
    })
}

/// Writes `value` as generic tokens. Integers that fit `i64` stay integers;
/// everything else goes through the double path.
pub fn write_value(writer: &mut JsonWriter, value: &Value) -> Result<()> {
    match value {
        Value::Null => writer.write_null_value(),
        Value::Bool(b) => writer.write_bool_value(*b),
        Value::Number(n) => {
            let number = match n.as_i64() {
                Some(i) => Number64::Integer(i),
                None => Number64::Double(n.as_f64().unwrap_or(f64::NAN)),
            };
            writer.write_number64_value(number)
        }
        Value::String(s) => writer.write_string_value(s),
        Value::Array(items) => {
            writer.write_array_start()?;
            for item in items {
                write_value(writer, item)?;
            }
            writer.write_array_end()
        }
        Value::Object(map) => {
            writer.write_object_start()?;
            for (name, item) in map {
                writer.write_field_name(name)?;
                write_value(writer, item)?;
            }
            writer.write_object_end()
        }
    }
}

/// Parses a whole buffer in either format.
pub fn from_slice(buffer: &[u8], options: &ReaderOptions) -> Result<Value> {
    let mut reader = JsonReader::with_options(buffer, options)?;
    let value = read_value(&mut reader)?;
    if reader.read()? {
        return Err(JsonError::PropertyArrayOrObjectNotStarted);
    }
    Ok(value)
}

/// Encodes `value` in `format`.
pub fn to_vec(value: &Value, format: SerializationFormat, options: WriterOptions) -> Result<Vec<u8>> {
    let mut writer = JsonWriter::new(format, options);
    write_value(&mut writer, value)?;
    writer.get_result()
}
