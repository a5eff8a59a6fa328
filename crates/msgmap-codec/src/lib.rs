//! # msgmap-codec
//!
//! Inbound message parsing and XML serialization.
//!
//! This crate turns raw JSON, SOAP, XML and vendor-XML text into a
//! [`msgmap_ir::ParsedInput`], and writes [`msgmap_ir::Document`] trees back
//! out as compact XML.

pub mod format;
pub mod parser;
pub mod serializer;
pub mod soap;
pub mod xml;

pub use format::MessageFormat;
pub use parser::InputParser;
pub use serializer::XmlSerializer;

use thiserror::Error;

/// Errors that can occur when parsing or serializing messages
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Failed to parse {format} at line {line}, col {column}: {message}")]
    Parse {
        format: MessageFormat,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    /// Create a parse error at a known position
    pub fn parse_at(format: MessageFormat, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            format,
            line,
            column,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
