//! Dual-format codec for a JSON-superset document model.
//!
//! The same token stream can be stored as UTF-8 text (plain JSON plus
//! sigil-prefixed extended types such as `I7`, `UL42`, `G<guid>`, `B<base64>`)
//! or as a compact binary format that starts with `0x80`.
//!
//! - [`JsonReader`] - forward-only token reader over either format
//! - [`JsonWriter`] - token writer with smallest-encoding binary output
//! - [`JsonNavigator`] - random access by [`Node`] handle
//! - [`StringDictionary`] - caller-supplied strings encoded as one- or two-byte ids
//!
//! # Example
//!
//! ```
//! use docjson::{JsonNavigator, JsonReader, JsonWriter};
//!
//! let mut reader = JsonReader::new(br#"{"id": "a1", "n": [1, 2]}"#).unwrap();
//! let mut writer = JsonWriter::binary();
//! writer.write_all(&mut reader).unwrap();
//! let binary = writer.get_result().unwrap();
//!
//! let navigator = JsonNavigator::new(&binary).unwrap();
//! let n = navigator
//!     .try_get_object_property(navigator.get_root_node(), "n")
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(navigator.get_array_item_count(n.value).unwrap(), 2);
//! ```

pub mod binary;
pub mod dictionary;
pub mod documents;
pub mod error;
pub mod guid;
pub mod navigator;
pub mod number64;
pub mod object_state;
pub mod options;
pub mod reader;
pub mod token;
pub mod value;
pub mod writer;

mod text_util;

pub use dictionary::StringDictionary;
pub use documents::{read_documents, Documents, DOCUMENTS_PROPERTY};
pub use error::{JsonError, Result};
pub use guid::Guid;
pub use navigator::{JsonNavigator, Node, ObjectProperty};
pub use number64::Number64;
pub use options::{ReaderOptions, WriterOptions, DEFAULT_MAX_DEPTH};
pub use reader::JsonReader;
pub use token::{NodeType, SerializationFormat, TokenType};
pub use writer::JsonWriter;
