//! Random-access navigation over an encoded document.
//!
//! A [`Node`] is an opaque handle into one navigator's buffer. Handles from
//! different navigators must not be mixed.

mod binary;
mod text;

use std::borrow::Cow;

pub use binary::{BinaryItems, BinaryNavigator, BinaryProperties};
pub use text::{TextItems, TextNavigator, TextProperties};

use crate::error::{JsonError, Result};
use crate::guid::Guid;
use crate::number64::{non_finite_from_str, Number64};
use crate::options::ReaderOptions;
use crate::token::{NodeType, SerializationFormat};

/// Position of a value inside a navigator's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Node {
    index: usize,
    is_field_name: bool,
}

impl Node {
    pub(crate) fn value(index: usize) -> Self {
        Self { index, is_field_name: false }
    }

    pub(crate) fn field_name(index: usize) -> Self {
        Self { index, is_field_name: true }
    }
}

/// One name/value pair of an object node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectProperty {
    pub name: Node,
    pub value: Node,
}

pub enum JsonNavigator<'a> {
    Text(TextNavigator<'a>),
    Binary(BinaryNavigator<'a>),
}

macro_rules! dispatch {
    ($self:ident, $nav:ident => $body:expr) => {
        match $self {
            JsonNavigator::Text($nav) => $body,
            JsonNavigator::Binary($nav) => $body,
        }
    };
}

impl<'a> JsonNavigator<'a> {
    pub fn new(buffer: &'a [u8]) -> Result<Self> {
        Self::with_options(buffer, &ReaderOptions::default())
    }

    pub fn with_options(buffer: &'a [u8], options: &ReaderOptions) -> Result<Self> {
        Ok(match SerializationFormat::detect(buffer) {
            SerializationFormat::Text => JsonNavigator::Text(TextNavigator::with_options(buffer, options)?),
            SerializationFormat::Binary => {
                JsonNavigator::Binary(BinaryNavigator::with_options(buffer, options)?)
            }
        })
    }

    pub fn serialization_format(&self) -> SerializationFormat {
        match self {
            JsonNavigator::Text(_) => SerializationFormat::Text,
            JsonNavigator::Binary(_) => SerializationFormat::Binary,
        }
    }

    pub fn get_root_node(&self) -> Node {
        dispatch!(self, n => n.get_root_node())
    }

    pub fn get_node_type(&self, node: Node) -> Result<NodeType> {
        dispatch!(self, n => n.get_node_type(node))
    }

    pub fn get_array_item_count(&self, node: Node) -> Result<usize> {
        dispatch!(self, n => n.get_array_item_count(node))
    }

    pub fn get_array_item_at(&self, node: Node, index: usize) -> Result<Node> {
        dispatch!(self, n => n.get_array_item_at(node, index))
    }

    /// Items in document order. Calling again restarts from the first item.
    pub fn get_array_items(&self, node: Node) -> Result<ArrayItems<'_>> {
        Ok(match self {
            JsonNavigator::Text(n) => ArrayItems::Text(n.get_array_items(node)?),
            JsonNavigator::Binary(n) => ArrayItems::Binary(n.get_array_items(node)?),
        })
    }

    pub fn get_object_property_count(&self, node: Node) -> Result<usize> {
        dispatch!(self, n => n.get_object_property_count(node))
    }

    /// Properties in document order, duplicates included.
    pub fn get_object_properties(&self, node: Node) -> Result<ObjectProperties<'_>> {
        Ok(match self {
            JsonNavigator::Text(n) => ObjectProperties::Text(n.get_object_properties(node)?),
            JsonNavigator::Binary(n) => ObjectProperties::Binary(n.get_object_properties(node)?),
        })
    }

    /// First property named `name`, if any.
    pub fn try_get_object_property(&self, node: Node, name: &str) -> Result<Option<ObjectProperty>> {
        dispatch!(self, n => n.try_get_object_property(node, name))
    }

    /// Value of a `String` or `FieldName` node.
    pub fn get_string_value(&self, node: Node) -> Result<Cow<'_, str>> {
        match self {
            JsonNavigator::Text(n) => n.get_string_value(node),
            JsonNavigator::Binary(n) => n.get_string_value(node),
        }
    }

    pub fn try_get_buffered_string(&self, node: Node) -> Option<&'a str> {
        dispatch!(self, n => n.try_get_buffered_string(node))
    }

    /// Value of a `Number` node; a `String` node spelling a non-finite double
    /// is accepted the same way readers accept it.
    pub fn get_number_value(&self, node: Node) -> Result<Number64> {
        if self.get_node_type(node)? == NodeType::String {
            return non_finite_from_str(&self.get_string_value(node)?).ok_or(JsonError::WrongNodeType {
                expected: NodeType::Number,
                actual: NodeType::String,
            });
        }
        dispatch!(self, n => n.get_number_value(node))
    }

    pub fn get_int8_value(&self, node: Node) -> Result<i8> {
        dispatch!(self, n => n.get_int8_value(node))
    }

    pub fn get_int16_value(&self, node: Node) -> Result<i16> {
        dispatch!(self, n => n.get_int16_value(node))
    }

    pub fn get_int32_value(&self, node: Node) -> Result<i32> {
        dispatch!(self, n => n.get_int32_value(node))
    }

    pub fn get_int64_value(&self, node: Node) -> Result<i64> {
        dispatch!(self, n => n.get_int64_value(node))
    }

    pub fn get_uint32_value(&self, node: Node) -> Result<u32> {
        dispatch!(self, n => n.get_uint32_value(node))
    }

    pub fn get_float32_value(&self, node: Node) -> Result<f32> {
        dispatch!(self, n => n.get_float32_value(node))
    }

    pub fn get_float64_value(&self, node: Node) -> Result<f64> {
        dispatch!(self, n => n.get_float64_value(node))
    }

    pub fn get_guid_value(&self, node: Node) -> Result<Guid> {
        dispatch!(self, n => n.get_guid_value(node))
    }

    pub fn get_binary_value(&self, node: Node) -> Result<Cow<'a, [u8]>> {
        match self {
            JsonNavigator::Text(n) => n.get_binary_value(node).map(Cow::Owned),
            JsonNavigator::Binary(n) => n.get_binary_value(node).map(Cow::Borrowed),
        }
    }

    /// The encoded bytes of `node` in this navigator's own format.
    pub fn buffered_raw_json(&self, node: Node) -> Result<&'a [u8]> {
        dispatch!(self, n => n.buffered_raw_json(node))
    }
}

#[derive(Debug, Clone)]
pub enum ArrayItems<'n> {
    Text(TextItems<'n>),
    Binary(BinaryItems<'n>),
}

impl Iterator for ArrayItems<'_> {
    type Item = Result<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            ArrayItems::Text(items) => items.next().map(Ok),
            ArrayItems::Binary(items) => items.next(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ObjectProperties<'n> {
    Text(TextProperties<'n>),
    Binary(BinaryProperties<'n>),
}

impl Iterator for ObjectProperties<'_> {
    type Item = Result<ObjectProperty>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            ObjectProperties::Text(properties) => properties.next().map(Ok),
            ObjectProperties::Binary(properties) => properties.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::type_marker::*;

    #[test]
    fn test_picks_format() {
        let text = JsonNavigator::new(b"[]").unwrap();
        assert_eq!(text.serialization_format(), SerializationFormat::Text);
        let bytes = [BINARY_FORMAT, ARR0];
        let binary = JsonNavigator::new(&bytes).unwrap();
        assert_eq!(binary.serialization_format(), SerializationFormat::Binary);
        assert_eq!(binary.get_array_item_count(binary.get_root_node()).unwrap(), 0);
    }

    #[test]
    fn test_non_finite_string_nodes() {
        let nav = JsonNavigator::new(br#"["NaN", "-Infinity", "nope"]"#).unwrap();
        let items: Vec<Node> = nav
            .get_array_items(nav.get_root_node())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert!(nav.get_number_value(items[0]).unwrap().is_nan());
        assert_eq!(nav.get_number_value(items[1]).unwrap(), Number64::Double(f64::NEG_INFINITY));
        assert_eq!(
            nav.get_number_value(items[2]),
            Err(JsonError::WrongNodeType { expected: NodeType::Number, actual: NodeType::String })
        );
    }

    #[test]
    fn test_binary_value_in_both_formats() {
        let nav = JsonNavigator::new(b"BAQID").unwrap();
        assert_eq!(nav.get_binary_value(nav.get_root_node()).unwrap().as_ref(), &[1, 2, 3]);
        let bytes = [BINARY_FORMAT, BIN_L1, 3, 1, 2, 3];
        let nav = JsonNavigator::new(&bytes).unwrap();
        assert_eq!(nav.get_binary_value(nav.get_root_node()).unwrap().as_ref(), &[1, 2, 3]);
    }
}
