//! Little-endian byte buffer primitives for the docjson codec.
//!
//! # Overview
//!
//! - [`Reader`] - bounds-checked little-endian cursor over a borrowed byte slice
//! - [`Writer`] - growable output buffer with in-place patching and region resizing
//!
//! # Example
//!
//! ```
//! use docjson_buffers::{Reader, Writer};
//!
//! let mut writer = Writer::new();
//! writer.u8(0x01);
//! writer.u16(0x0203);
//! writer.utf8("hello");
//! let data = writer.flush();
//!
//! let mut reader = Reader::new(&data);
//! assert_eq!(reader.u8().unwrap(), 0x01);
//! assert_eq!(reader.u16().unwrap(), 0x0203);
//! assert_eq!(reader.utf8(5).unwrap(), "hello");
//! ```

mod reader;
mod writer;

pub use reader::Reader;
pub use writer::Writer;

/// Error type for buffer operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// Attempted to read `needed` bytes at `at`, past the end of the buffer.
    EndOfBuffer { at: usize, needed: usize },
    /// Invalid UTF-8 sequence.
    InvalidUtf8,
    /// A positioned write or region edit fell outside the written bytes.
    Overflow,
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferError::EndOfBuffer { at, needed } => {
                write!(f, "end of buffer reading {needed} bytes at {at}")
            }
            BufferError::InvalidUtf8 => write!(f, "invalid UTF-8 sequence"),
            BufferError::Overflow => write!(f, "buffer overflow"),
        }
    }
}

impl std::error::Error for BufferError {}
