//! User string dictionary.
//!
//! An ordered list of strings whose position is the id written on the wire.
//! A buffer written with a dictionary can only be decoded with an identical
//! one (same strings, same order).

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::binary::type_marker::USER_STRING_CAPACITY;
use crate::error::{JsonError, Result};

#[derive(Debug, Clone, Default)]
pub struct StringDictionary {
    strings: Vec<Arc<str>>,
    index: HashMap<Arc<str>, usize>,
}

impl StringDictionary {
    /// Maximum number of user strings addressable by the user-string markers.
    pub const CAPACITY: usize = USER_STRING_CAPACITY;

    /// Builds a dictionary from `strings`, assigning ids in iteration order.
    ///
    /// A repeated string keeps the id of its first occurrence.
    pub fn new<I, S>(strings: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let strings: Vec<Arc<str>> = strings.into_iter().map(|s| Arc::from(s.as_ref())).collect();
        if strings.len() > Self::CAPACITY {
            return Err(JsonError::DictionaryCapacityExceeded {
                count: strings.len(),
                capacity: Self::CAPACITY,
            });
        }
        let mut index = HashMap::with_capacity(strings.len());
        for (id, s) in strings.iter().enumerate() {
            index.entry(Arc::clone(s)).or_insert(id);
        }
        debug!(count = strings.len(), "built user string dictionary");
        Ok(Self { strings, index })
    }

    pub fn try_get_string(&self, id: usize) -> Option<&str> {
        self.strings.get(id).map(|s| s.as_ref())
    }

    /// Looks up the id of a UTF-8 encoded string.
    pub fn try_get_index(&self, utf8: &[u8]) -> Option<usize> {
        let s = std::str::from_utf8(utf8).ok()?;
        self.index.get(s).copied()
    }

    pub fn count(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(|s| s.as_ref())
    }
}

impl PartialEq for StringDictionary {
    fn eq(&self, other: &Self) -> bool {
        self.strings == other.strings
    }
}

impl Eq for StringDictionary {}
