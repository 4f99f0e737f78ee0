//! Structural state machine shared by readers and writers.
//!
//! Every token a reader produces or a writer accepts goes through
//! [`ObjectState::register_token`], which enforces JSON nesting rules and
//! reports the precise structural error.

use std::collections::HashSet;

use crate::error::{JsonError, Result};
use crate::token::TokenType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Array,
    Object,
}

#[derive(Debug)]
struct Frame {
    kind: ContainerKind,
    names: HashSet<String>,
}

#[derive(Debug)]
pub struct ObjectState {
    stack: Vec<Frame>,
    current_token: TokenType,
    property_expected: bool,
    root_complete: bool,
    max_depth: usize,
}

impl ObjectState {
    pub fn new(max_depth: usize) -> Self {
        Self {
            stack: Vec::new(),
            current_token: TokenType::NotStarted,
            property_expected: false,
            root_complete: false,
            max_depth,
        }
    }

    pub fn current_token(&self) -> TokenType {
        self.current_token
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn container(&self) -> Option<ContainerKind> {
        self.stack.last().map(|f| f.kind)
    }

    pub fn in_object(&self) -> bool {
        self.container() == Some(ContainerKind::Object)
    }

    pub fn in_array(&self) -> bool {
        self.container() == Some(ContainerKind::Array)
    }

    /// True when the next token inside the current object must be a field name.
    pub fn property_expected(&self) -> bool {
        self.in_object() && self.property_expected
    }

    /// True once a complete root value has been registered.
    pub fn is_complete(&self) -> bool {
        self.root_complete
    }

    pub fn register_token(&mut self, token: TokenType) -> Result<()> {
        match token {
            TokenType::NotStarted => return Err(JsonError::UnexpectedToken),
            TokenType::FieldName => {
                return Err(JsonError::WrongTokenType {
                    expected: TokenType::String,
                    actual: TokenType::FieldName,
                })
            }
            TokenType::BeginArray => self.begin(ContainerKind::Array)?,
            TokenType::BeginObject => self.begin(ContainerKind::Object)?,
            TokenType::EndArray => self.end(ContainerKind::Array)?,
            TokenType::EndObject => self.end(ContainerKind::Object)?,
            _ => self.scalar()?,
        }
        self.current_token = token;
        Ok(())
    }

    /// Registers a field name token. When `name` is given it is checked
    /// against the names already written in the enclosing object.
    pub fn register_field_name(&mut self, name: Option<&str>) -> Result<()> {
        let frame = match self.stack.last_mut() {
            Some(frame) if frame.kind == ContainerKind::Object => frame,
            _ => return Err(JsonError::ObjectNotStarted),
        };
        if !self.property_expected {
            return Err(JsonError::UnexpectedToken);
        }
        if let Some(name) = name {
            if !frame.names.insert(name.to_owned()) {
                return Err(JsonError::PropertyAlreadyAdded(name.to_owned()));
            }
        }
        self.property_expected = false;
        self.current_token = TokenType::FieldName;
        Ok(())
    }

    fn check_value_allowed(&self) -> Result<()> {
        match self.container() {
            None if self.root_complete => Err(JsonError::PropertyArrayOrObjectNotStarted),
            Some(ContainerKind::Object) if self.property_expected => Err(JsonError::MissingProperty),
            _ => Ok(()),
        }
    }

    fn value_done(&mut self) {
        if self.stack.is_empty() {
            self.root_complete = true;
        } else {
            self.property_expected = self.in_object();
        }
    }

    fn scalar(&mut self) -> Result<()> {
        self.check_value_allowed()?;
        self.value_done();
        Ok(())
    }

    fn begin(&mut self, kind: ContainerKind) -> Result<()> {
        self.check_value_allowed()?;
        if self.stack.len() >= self.max_depth {
            return Err(JsonError::MaxNestingExceeded(self.max_depth));
        }
        self.stack.push(Frame { kind, names: HashSet::new() });
        self.property_expected = kind == ContainerKind::Object;
        Ok(())
    }

    fn end(&mut self, kind: ContainerKind) -> Result<()> {
        match (self.container(), kind) {
            (Some(ContainerKind::Array), ContainerKind::Array) => {}
            (Some(ContainerKind::Object), ContainerKind::Object) => {
                if !self.property_expected {
                    return Err(JsonError::UnexpectedEndObject);
                }
            }
            (_, ContainerKind::Array) => return Err(JsonError::ArrayNotStarted),
            (_, ContainerKind::Object) => return Err(JsonError::ObjectNotStarted),
        }
        self.stack.pop();
        self.value_done();
        Ok(())
    }
}
