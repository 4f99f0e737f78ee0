//! Token, node and format identifiers shared by every reader, writer and navigator.

use crate::binary::type_marker::BINARY_FORMAT;

/// Serialization format of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SerializationFormat {
    Text,
    Binary,
}

impl SerializationFormat {
    /// Sniffs the format from the first byte: binary buffers start with `0x80`,
    /// anything else is treated as UTF-8 text.
    pub fn detect(buffer: &[u8]) -> Self {
        match buffer.first() {
            Some(&BINARY_FORMAT) => SerializationFormat::Binary,
            _ => SerializationFormat::Text,
        }
    }
}

/// One atomic unit of the JSON-superset grammar as surfaced by a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    NotStarted,
    BeginArray,
    EndArray,
    BeginObject,
    EndObject,
    String,
    Number,
    True,
    False,
    Null,
    FieldName,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt32,
    Float32,
    Float64,
    Guid,
    Binary,
}

impl TokenType {
    /// Returns `true` for tokens that complete a value (scalars and container ends).
    pub fn is_value_end(self) -> bool {
        !matches!(
            self,
            TokenType::NotStarted
                | TokenType::BeginArray
                | TokenType::BeginObject
                | TokenType::FieldName
        )
    }

    /// Node kind a token opens or carries; `None` for container ends and `NotStarted`.
    pub fn node_type(self) -> Option<NodeType> {
        Some(match self {
            TokenType::NotStarted | TokenType::EndArray | TokenType::EndObject => return None,
            TokenType::BeginArray => NodeType::Array,
            TokenType::BeginObject => NodeType::Object,
            TokenType::String => NodeType::String,
            TokenType::Number => NodeType::Number,
            TokenType::True => NodeType::True,
            TokenType::False => NodeType::False,
            TokenType::Null => NodeType::Null,
            TokenType::FieldName => NodeType::FieldName,
            TokenType::Int8 => NodeType::Int8,
            TokenType::Int16 => NodeType::Int16,
            TokenType::Int32 => NodeType::Int32,
            TokenType::Int64 => NodeType::Int64,
            TokenType::UInt32 => NodeType::UInt32,
            TokenType::Float32 => NodeType::Float32,
            TokenType::Float64 => NodeType::Float64,
            TokenType::Guid => NodeType::Guid,
            TokenType::Binary => NodeType::Binary,
        })
    }
}

/// Kind of value a navigator node points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Null,
    False,
    True,
    Number,
    String,
    Array,
    Object,
    FieldName,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt32,
    Float32,
    Float64,
    Guid,
    Binary,
}
