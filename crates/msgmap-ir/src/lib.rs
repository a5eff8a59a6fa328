#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # msgmap-ir
//!
//! In-memory document model for message translation.
//!
//! This crate provides a small namespace-aware element tree used to read and
//! build XML documents, plus helpers for viewing parsed JSON payloads as
//! nested mappings, sequences and scalars.

/// Document container with a single root element.
pub mod document;
/// Element tree nodes and qualified-name matching.
pub mod element;
/// Helpers for addressing parsed JSON payloads.
pub mod json;
/// Namespace handles shared between elements.
pub mod namespace;
/// Slash-path cursor over element trees.
pub mod traversal;

pub use document::Document;
pub use element::{Attribute, Element};
pub use namespace::Namespace;
pub use traversal::Cursor;

use thiserror::Error;

/// Errors that can occur when working with the document model
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Element not found at path: {path}")]
    NodeNotFound { path: String },

    #[error("Invalid element name '{name}'")]
    InvalidName { name: String },
}

impl Error {
    /// Build a node-not-found error with path context.
    pub fn node_not_found(path: impl Into<String>) -> Self {
        Self::NodeNotFound { path: path.into() }
    }

    /// Build an invalid-name error for an element name that is not an XML name.
    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName { name: name.into() }
    }
}

/// Crate-local result type for document model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A parsed inbound message: either a keyed JSON structure or an XML document.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedInput {
    /// JSON payload viewed as nested mappings/sequences/scalars
    Json(serde_json::Value),

    /// XML payload (plain, vendor-specific, or a SOAP body) as an element tree
    Xml(Document),
}

impl ParsedInput {
    /// The XML document, if this input was parsed from XML.
    #[must_use]
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            ParsedInput::Xml(doc) => Some(doc),
            ParsedInput::Json(_) => None,
        }
    }

    /// The JSON value, if this input was parsed from JSON.
    #[must_use]
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ParsedInput::Json(value) => Some(value),
            ParsedInput::Xml(_) => None,
        }
    }
}

impl From<Document> for ParsedInput {
    fn from(doc: Document) -> Self {
        ParsedInput::Xml(doc)
    }
}

impl From<serde_json::Value> for ParsedInput {
    fn from(value: serde_json::Value) -> Self {
        ParsedInput::Json(value)
    }
}
