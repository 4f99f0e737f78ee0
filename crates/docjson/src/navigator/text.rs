//! Random access over JSON text, backed by a node arena built in one pass.

use std::borrow::Cow;
use std::ops::Range;
use std::slice::{ChunksExact, Iter};

use crate::error::{JsonError, Result};
use crate::guid::Guid;
use crate::number64::Number64;
use crate::options::ReaderOptions;
use crate::reader::TextReader;
use crate::token::{NodeType, TokenType};

use super::{Node, ObjectProperty};

#[derive(Debug, Clone)]
struct TextNode {
    kind: NodeType,
    start: usize,
    end: usize,
    /// Children as a range of `links`; objects alternate name and value.
    children: Range<usize>,
}

pub struct TextNavigator<'a> {
    buffer: &'a [u8],
    nodes: Vec<TextNode>,
    links: Vec<usize>,
}

impl<'a> TextNavigator<'a> {
    pub fn new(buffer: &'a [u8]) -> Result<Self> {
        Self::with_options(buffer, &ReaderOptions::default())
    }

    /// Tokenizes the whole buffer up front, so every structural error surfaces here.
    pub fn with_options(buffer: &'a [u8], options: &ReaderOptions) -> Result<Self> {
        let mut reader = TextReader::with_options(buffer, options);
        let mut nodes: Vec<TextNode> = Vec::new();
        let mut links = Vec::new();
        let mut open: Vec<(usize, Vec<usize>)> = Vec::new();

        while reader.read()? {
            let token = reader.current_token_type();
            let (start, end) = reader.token_span();
            if matches!(token, TokenType::EndArray | TokenType::EndObject) {
                let (index, children) = open.pop().ok_or(JsonError::UnexpectedToken)?;
                let first = links.len();
                links.extend(children);
                let node = &mut nodes[index];
                node.end = end;
                node.children = first..links.len();
                continue;
            }
            let kind = token.node_type().ok_or(JsonError::UnexpectedToken)?;
            let index = nodes.len();
            nodes.push(TextNode { kind, start, end, children: 0..0 });
            if let Some((_, siblings)) = open.last_mut() {
                siblings.push(index);
            }
            if matches!(kind, NodeType::Array | NodeType::Object) {
                open.push((index, Vec::new()));
            }
        }

        if nodes.is_empty() {
            return Err(JsonError::UnexpectedEndOfBuffer(buffer.len()));
        }
        Ok(Self { buffer, nodes, links })
    }

    pub fn get_root_node(&self) -> Node {
        Node::value(0)
    }

    fn node(&self, node: Node) -> Result<&TextNode> {
        self.nodes.get(node.index).ok_or(JsonError::InvalidOffset(node.index))
    }

    pub fn get_node_type(&self, node: Node) -> Result<NodeType> {
        Ok(self.node(node)?.kind)
    }

    fn children(&self, node: Node, expected: NodeType) -> Result<&[usize]> {
        let entry = self.node(node)?;
        if entry.kind != expected {
            return Err(JsonError::WrongNodeType { expected, actual: entry.kind });
        }
        Ok(&self.links[entry.children.clone()])
    }

    pub fn get_array_item_count(&self, node: Node) -> Result<usize> {
        Ok(self.children(node, NodeType::Array)?.len())
    }

    pub fn get_array_item_at(&self, node: Node, index: usize) -> Result<Node> {
        self.children(node, NodeType::Array)?
            .get(index)
            .map(|&child| Node::value(child))
            .ok_or(JsonError::IndexOutOfRange(index))
    }

    pub fn get_array_items(&self, node: Node) -> Result<TextItems<'_>> {
        Ok(TextItems(self.children(node, NodeType::Array)?.iter()))
    }

    pub fn get_object_property_count(&self, node: Node) -> Result<usize> {
        Ok(self.children(node, NodeType::Object)?.len() / 2)
    }

    pub fn get_object_properties(&self, node: Node) -> Result<TextProperties<'_>> {
        Ok(TextProperties(self.children(node, NodeType::Object)?.chunks_exact(2)))
    }

    pub fn try_get_object_property(&self, node: Node, name: &str) -> Result<Option<ObjectProperty>> {
        for property in self.get_object_properties(node)? {
            if self.get_string_value(property.name)? == name {
                return Ok(Some(property));
            }
        }
        Ok(None)
    }

    /// Re-reads the lexeme of a scalar node on its own.
    fn scalar(&self, node: Node, expected: NodeType) -> Result<TextReader<'a>> {
        let entry = self.node(node)?;
        if entry.kind != expected {
            return Err(JsonError::WrongNodeType { expected, actual: entry.kind });
        }
        let mut reader = TextReader::new(&self.buffer[entry.start..entry.end]);
        reader.read()?;
        Ok(reader)
    }

    fn string_reader(&self, node: Node) -> Result<TextReader<'a>> {
        match self.get_node_type(node)? {
            kind @ (NodeType::String | NodeType::FieldName) => self.scalar(node, kind),
            actual => Err(JsonError::WrongNodeType { expected: NodeType::String, actual }),
        }
    }

    pub fn get_string_value(&self, node: Node) -> Result<Cow<'a, str>> {
        self.string_reader(node)?.get_string_value()
    }

    pub fn try_get_buffered_string(&self, node: Node) -> Option<&'a str> {
        self.string_reader(node).ok()?.try_get_buffered_string()
    }

    pub fn get_number_value(&self, node: Node) -> Result<Number64> {
        self.scalar(node, NodeType::Number)?.get_number_value()
    }

    pub fn get_int8_value(&self, node: Node) -> Result<i8> {
        self.scalar(node, NodeType::Int8)?.get_int8_value()
    }

    pub fn get_int16_value(&self, node: Node) -> Result<i16> {
        self.scalar(node, NodeType::Int16)?.get_int16_value()
    }

    pub fn get_int32_value(&self, node: Node) -> Result<i32> {
        self.scalar(node, NodeType::Int32)?.get_int32_value()
    }

    pub fn get_int64_value(&self, node: Node) -> Result<i64> {
        self.scalar(node, NodeType::Int64)?.get_int64_value()
    }

    pub fn get_uint32_value(&self, node: Node) -> Result<u32> {
        self.scalar(node, NodeType::UInt32)?.get_uint32_value()
    }

    pub fn get_float32_value(&self, node: Node) -> Result<f32> {
        self.scalar(node, NodeType::Float32)?.get_float32_value()
    }

    pub fn get_float64_value(&self, node: Node) -> Result<f64> {
        self.scalar(node, NodeType::Float64)?.get_float64_value()
    }

    pub fn get_guid_value(&self, node: Node) -> Result<Guid> {
        self.scalar(node, NodeType::Guid)?.get_guid_value()
    }

    pub fn get_binary_value(&self, node: Node) -> Result<Vec<u8>> {
        Ok(self.scalar(node, NodeType::Binary)?.get_binary_value()?.into_owned())
    }

    /// Source text of the value at `node`, from its first to its last byte.
    pub fn buffered_raw_json(&self, node: Node) -> Result<&'a [u8]> {
        let entry = self.node(node)?;
        Ok(&self.buffer[entry.start..entry.end])
    }
}

#[derive(Debug, Clone)]
pub struct TextItems<'n>(Iter<'n, usize>);

impl Iterator for TextItems<'_> {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        self.0.next().map(|&index| Node::value(index))
    }
}

#[derive(Debug, Clone)]
pub struct TextProperties<'n>(ChunksExact<'n, usize>);

impl Iterator for TextProperties<'_> {
    type Item = ObjectProperty;

    fn next(&mut self) -> Option<ObjectProperty> {
        self.0.next().map(|pair| ObjectProperty {
            name: Node::value(pair[0]),
            value: Node::value(pair[1]),
        })
    }
}
