//! Reader and writer configuration.

use std::sync::Arc;

use crate::dictionary::StringDictionary;

pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options for binary and text writers.
#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// Allow GUID, date-time, hex and bit-packed string encodings.
    pub enable_encoded_strings: bool,
    /// Allow back-references to strings written earlier in the same buffer.
    pub enable_reference_strings: bool,
    pub dictionary: Option<Arc<StringDictionary>>,
}

impl WriterOptions {
    pub fn new() -> Self {
        Self {
            enable_encoded_strings: true,
            enable_reference_strings: true,
            dictionary: None,
        }
    }

    pub fn with_encoded_strings(mut self, enabled: bool) -> Self {
        self.enable_encoded_strings = enabled;
        self
    }

    pub fn with_reference_strings(mut self, enabled: bool) -> Self {
        self.enable_reference_strings = enabled;
        self
    }

    pub fn with_dictionary(mut self, dictionary: Arc<StringDictionary>) -> Self {
        self.dictionary = Some(dictionary);
        self
    }
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Options for readers and navigators.
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// Dictionary the buffer was written with, if any.
    pub dictionary: Option<Arc<StringDictionary>>,
    pub max_depth: usize,
}

impl ReaderOptions {
    pub fn new() -> Self {
        Self {
            dictionary: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_dictionary(mut self, dictionary: Arc<StringDictionary>) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self::new()
    }
}
