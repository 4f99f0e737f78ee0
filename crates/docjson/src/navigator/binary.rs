//! Random access over a binary buffer without materializing it.

use std::borrow::Cow;
use std::sync::Arc;

use crate::binary::{self, type_marker};
use crate::dictionary::StringDictionary;
use crate::error::{JsonError, Result};
use crate::guid::Guid;
use crate::number64::Number64;
use crate::options::ReaderOptions;
use crate::token::NodeType;

use super::{Node, ObjectProperty};

pub struct BinaryNavigator<'a> {
    buffer: &'a [u8],
    dictionary: Option<Arc<StringDictionary>>,
}

impl<'a> BinaryNavigator<'a> {
    pub fn new(buffer: &'a [u8]) -> Result<Self> {
        Self::with_options(buffer, &ReaderOptions::default())
    }

    /// Checks the format byte, the extent of the root value and its nesting
    /// depth.
    pub fn with_options(buffer: &'a [u8], options: &ReaderOptions) -> Result<Self> {
        if buffer.first() != Some(&type_marker::BINARY_FORMAT) {
            return Err(JsonError::InvalidFormat);
        }
        let root_length = binary::value_length(buffer, 1)?;
        binary::check_nesting(buffer, 1, options.max_depth)?;
        Ok(Self {
            buffer: &buffer[..1 + root_length],
            dictionary: options.dictionary.clone(),
        })
    }

    pub fn get_root_node(&self) -> Node {
        Node::value(1)
    }

    fn marker(&self, node: Node) -> Result<u8> {
        self.buffer
            .get(node.index)
            .copied()
            .ok_or(JsonError::InvalidOffset(node.index))
    }

    pub fn get_node_type(&self, node: Node) -> Result<NodeType> {
        if node.is_field_name {
            return Ok(NodeType::FieldName);
        }
        binary::node_type(self.marker(node)?)
    }

    fn expect(&self, node: Node, expected: NodeType) -> Result<()> {
        let actual = self.get_node_type(node)?;
        if actual != expected {
            return Err(JsonError::WrongNodeType { expected, actual });
        }
        Ok(())
    }

    fn items(&self, node: Node, expected: NodeType) -> Result<BinaryItems<'a>> {
        self.expect(node, expected)?;
        let (next, end) = binary::container_items(self.buffer, node.index)?;
        Ok(BinaryItems { buffer: self.buffer, next, end })
    }

    /// O(1) for empty, single-item and counted arrays; other forms are scanned.
    pub fn get_array_item_count(&self, node: Node) -> Result<usize> {
        self.expect(node, NodeType::Array)?;
        match binary::stored_count(self.buffer, node.index)? {
            Some(count) => Ok(count),
            None => self.items(node, NodeType::Array)?.try_fold(0, |n, item| item.map(|_| n + 1)),
        }
    }

    pub fn get_array_item_at(&self, node: Node, index: usize) -> Result<Node> {
        for (position, item) in self.items(node, NodeType::Array)?.enumerate() {
            let item = item?;
            if position == index {
                return Ok(item);
            }
        }
        Err(JsonError::IndexOutOfRange(index))
    }

    pub fn get_array_items(&self, node: Node) -> Result<BinaryItems<'a>> {
        self.items(node, NodeType::Array)
    }

    pub fn get_object_property_count(&self, node: Node) -> Result<usize> {
        self.expect(node, NodeType::Object)?;
        match binary::stored_count(self.buffer, node.index)? {
            Some(count) => Ok(count),
            None => self.get_object_properties(node)?.try_fold(0, |n, p| p.map(|_| n + 1)),
        }
    }

    pub fn get_object_properties(&self, node: Node) -> Result<BinaryProperties<'a>> {
        Ok(BinaryProperties { items: self.items(node, NodeType::Object)? })
    }

    /// First property whose name equals `name`.
    pub fn try_get_object_property(&self, node: Node, name: &str) -> Result<Option<ObjectProperty>> {
        for property in self.get_object_properties(node)? {
            let property = property?;
            if self.get_string_value(property.name)? == name {
                return Ok(Some(property));
            }
        }
        Ok(None)
    }

    pub fn get_string_value(&self, node: Node) -> Result<Cow<'_, str>> {
        match self.get_node_type(node)? {
            NodeType::String | NodeType::FieldName => {
                binary::read_string(self.buffer, node.index, self.dictionary.as_deref())
            }
            actual => Err(JsonError::WrongNodeType { expected: NodeType::String, actual }),
        }
    }

    pub fn try_get_buffered_string(&self, node: Node) -> Option<&'a str> {
        binary::try_read_buffered_string(self.buffer, node.index).ok().flatten()
    }

    pub fn get_number_value(&self, node: Node) -> Result<Number64> {
        self.expect(node, NodeType::Number)?;
        binary::read_number(self.buffer, node.index)
    }

    pub fn get_int8_value(&self, node: Node) -> Result<i8> {
        self.expect(node, NodeType::Int8)?;
        binary::read_int8(self.buffer, node.index)
    }

    pub fn get_int16_value(&self, node: Node) -> Result<i16> {
        self.expect(node, NodeType::Int16)?;
        binary::read_int16(self.buffer, node.index)
    }

    pub fn get_int32_value(&self, node: Node) -> Result<i32> {
        self.expect(node, NodeType::Int32)?;
        binary::read_int32(self.buffer, node.index)
    }

    pub fn get_int64_value(&self, node: Node) -> Result<i64> {
        self.expect(node, NodeType::Int64)?;
        binary::read_int64(self.buffer, node.index)
    }

    pub fn get_uint32_value(&self, node: Node) -> Result<u32> {
        self.expect(node, NodeType::UInt32)?;
        binary::read_uint32(self.buffer, node.index)
    }

    pub fn get_float32_value(&self, node: Node) -> Result<f32> {
        self.expect(node, NodeType::Float32)?;
        binary::read_float32(self.buffer, node.index)
    }

    pub fn get_float64_value(&self, node: Node) -> Result<f64> {
        self.expect(node, NodeType::Float64)?;
        binary::read_float64(self.buffer, node.index)
    }

    pub fn get_guid_value(&self, node: Node) -> Result<Guid> {
        self.expect(node, NodeType::Guid)?;
        binary::read_guid(self.buffer, node.index)
    }

    pub fn get_binary_value(&self, node: Node) -> Result<&'a [u8]> {
        self.expect(node, NodeType::Binary)?;
        binary::read_binary(self.buffer, node.index)
    }

    /// Encoded bytes of the value at `node`, marker included.
    pub fn buffered_raw_json(&self, node: Node) -> Result<&'a [u8]> {
        let length = binary::value_length(self.buffer, node.index)?;
        Ok(&self.buffer[node.index..node.index + length])
    }
}

/// Lazily walks the values inside a container, one `value_length` step at a time.
#[derive(Debug, Clone)]
pub struct BinaryItems<'a> {
    buffer: &'a [u8],
    next: usize,
    end: usize,
}

impl Iterator for BinaryItems<'_> {
    type Item = Result<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let at = self.next;
        match binary::value_length(self.buffer, at) {
            Ok(length) if at + length <= self.end => {
                self.next = at + length;
                Some(Ok(Node::value(at)))
            }
            Ok(_) => {
                self.next = self.end;
                Some(Err(JsonError::UnexpectedEndOfBuffer(self.end)))
            }
            Err(err) => {
                self.next = self.end;
                Some(Err(err))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct BinaryProperties<'a> {
    items: BinaryItems<'a>,
}

impl Iterator for BinaryProperties<'_> {
    type Item = Result<ObjectProperty>;

    fn next(&mut self) -> Option<Self::Item> {
        let name = match self.items.next()? {
            Ok(node) => node,
            Err(err) => return Some(Err(err)),
        };
        let value = match self.items.next() {
            Some(Ok(node)) => node,
            Some(Err(err)) => return Some(Err(err)),
            None => return Some(Err(JsonError::MissingProperty)),
        };
        Some(Ok(ObjectProperty { name: Node::field_name(name.index), value }))
    }
}
