//! Codec error type.

use docjson_buffers::BufferError;
use thiserror::Error;

use crate::token::{NodeType, TokenType};

/// Every failure the readers, writers and navigators can report.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum JsonError {
    // Structural
    #[error("unexpected end of array")]
    UnexpectedEndArray,
    #[error("unexpected end of object")]
    UnexpectedEndObject,
    #[error("missing end of array")]
    MissingEndArray,
    #[error("missing end of object")]
    MissingEndObject,
    #[error("array not started")]
    ArrayNotStarted,
    #[error("object not started")]
    ObjectNotStarted,
    #[error("expected a field name before the value")]
    MissingProperty,
    #[error("field name `{0}` already written in this object")]
    PropertyAlreadyAdded(String),
    #[error("a value was written after the root value was complete")]
    PropertyArrayOrObjectNotStarted,
    #[error("missing name separator")]
    MissingNameSeparator,
    #[error("unexpected name separator")]
    UnexpectedNameSeparator,
    #[error("missing value separator")]
    MissingValueSeparator,
    #[error("unexpected value separator")]
    UnexpectedValueSeparator,
    #[error("unexpected token")]
    UnexpectedToken,
    #[error("json value is not complete")]
    NotComplete,
    #[error("maximum nesting depth {0} exceeded")]
    MaxNestingExceeded(usize),

    // Lexical
    #[error("invalid number at byte {0}")]
    InvalidNumber(usize),
    #[error("invalid escape sequence at byte {0}")]
    InvalidEscape(usize),
    #[error("missing closing quote for string starting at byte {0}")]
    MissingClosingQuote(usize),
    #[error("invalid token at byte {0}")]
    InvalidToken(usize),
    #[error("invalid UTF-8")]
    InvalidUtf8,
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("invalid guid literal")]
    InvalidGuid,

    // Type mismatch
    #[error("current token is {0:?}, not a string")]
    NotStringToken(TokenType),
    #[error("current token is {0:?}, not a number")]
    NotNumberToken(TokenType),
    #[error("expected token {expected:?}, found {actual:?}")]
    WrongTokenType { expected: TokenType, actual: TokenType },
    #[error("expected node {expected:?}, found {actual:?}")]
    WrongNodeType { expected: NodeType, actual: NodeType },
    #[error("value {0} does not fit the declared width")]
    NumberOutOfRange(String),

    // Capacity
    #[error("dictionary of {count} strings exceeds capacity {capacity}")]
    DictionaryCapacityExceeded { count: usize, capacity: usize },
    #[error("user string id {0} is not in the dictionary")]
    UnknownUserString(usize),

    // Format contract
    #[error("expected an array property `{0}` on the root object")]
    MissingDocuments(String),
    #[error("buffer is not in the expected serialization format")]
    InvalidFormat,
    #[error("unexpected end of buffer at byte {0}")]
    UnexpectedEndOfBuffer(usize),
    #[error("invalid type marker 0x{0:02x}")]
    InvalidTypeMarker(u8),
    #[error("invalid string reference offset {0}")]
    InvalidOffset(usize),
    #[error("index {0} out of range")]
    IndexOutOfRange(usize),
}

impl From<BufferError> for JsonError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::EndOfBuffer { at, .. } => JsonError::UnexpectedEndOfBuffer(at),
            BufferError::InvalidUtf8 => JsonError::InvalidUtf8,
            BufferError::Overflow => JsonError::InvalidFormat,
        }
    }
}

pub type Result<T> = std::result::Result<T, JsonError>;
