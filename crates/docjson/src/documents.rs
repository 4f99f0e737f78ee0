//! Change-feed response bodies: a root object whose named property holds the
//! array of documents.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::dictionary::StringDictionary;
use crate::error::{JsonError, Result};
use crate::navigator::{JsonNavigator, Node};
use crate::options::ReaderOptions;
use crate::token::NodeType;
use crate::value::node_value;

/// Conventional name of the documents property.
pub const DOCUMENTS_PROPERTY: &str = "Documents";

/// The document nodes of one response body, in order.
pub struct Documents<'a> {
    navigator: JsonNavigator<'a>,
    nodes: Vec<Node>,
}

impl<'a> Documents<'a> {
    pub fn navigator(&self) -> &JsonNavigator<'a> {
        &self.navigator
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn to_values(&self) -> Result<Vec<Value>> {
        self.nodes.iter().map(|&node| node_value(&self.navigator, node)).collect()
    }
}

/// Locates `property` on the root object of `buffer` and returns its items.
///
/// Fails with `MissingDocuments` when the root is not an object or the
/// property is absent or not an array.
pub fn read_documents<'a>(
    buffer: &'a [u8],
    property: &str,
    dictionary: Option<Arc<StringDictionary>>,
) -> Result<Documents<'a>> {
    let mut options = ReaderOptions::new();
    if let Some(dictionary) = dictionary {
        options = options.with_dictionary(dictionary);
    }
    let navigator = JsonNavigator::with_options(buffer, &options)?;
    let missing = || JsonError::MissingDocuments(property.to_owned());

    let root = navigator.get_root_node();
    if navigator.get_node_type(root)? != NodeType::Object {
        return Err(missing());
    }
    let array = navigator.try_get_object_property(root, property)?.ok_or_else(missing)?.value;
    if navigator.get_node_type(array)? != NodeType::Array {
        return Err(missing());
    }
    let nodes = navigator.get_array_items(array)?.collect::<Result<Vec<_>>>()?;
    debug!(property, count = nodes.len(), format = ?navigator.serialization_format(), "read documents");
    Ok(Documents { navigator, nodes })
}
