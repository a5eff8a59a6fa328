//! Format-dispatching input parser

use crate::{Error, MessageFormat, Result};
use msgmap_ir::{Document, ParsedInput};
use serde_json::Value;
use tracing::debug;

/// Parses raw inbound text according to a declared [`MessageFormat`].
///
/// The parser holds no state; a single value can be shared freely between
/// threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputParser;

impl InputParser {
    /// Create a parser
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse `content` in the given format.
    ///
    /// JSON yields [`ParsedInput::Json`]; every XML-family format yields a
    /// [`ParsedInput::Xml`] document. For SOAP the document is the body
    /// payload rather than the envelope.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] when `content` is malformed for `format`.
    pub fn parse(&self, content: &str, format: MessageFormat) -> Result<ParsedInput> {
        debug!(%format, bytes = content.len(), "parsing inbound message");
        match format {
            MessageFormat::Json => self.parse_json(content).map(ParsedInput::Json),
            MessageFormat::Soap => self.parse_soap(content).map(ParsedInput::Xml),
            MessageFormat::Xml | MessageFormat::ProprietaryXml => {
                crate::xml::parse_document(content, format).map(ParsedInput::Xml)
            }
        }
    }

    /// Parse `content` using a textual format tag such as `"json"` or `"SOAP"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] for unknown tags and
    /// [`Error::Parse`] for malformed content.
    pub fn parse_tagged(&self, content: &str, format: &str) -> Result<ParsedInput> {
        let format: MessageFormat = format.parse()?;
        self.parse(content, format)
    }

    /// Parse a JSON message whose top level is an object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for invalid JSON or a non-object top level.
    pub fn parse_json(&self, content: &str) -> Result<Value> {
        let value: Value = serde_json::from_str(content).map_err(|e| {
            Error::parse_at(MessageFormat::Json, e.line(), e.column(), e.to_string())
        })?;

        if !value.is_object() {
            return Err(Error::parse_at(
                MessageFormat::Json,
                1,
                1,
                format!("expected a JSON object at the top level, found {}", kind_of(&value)),
            ));
        }
        Ok(value)
    }

    /// Parse plain XML into a document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] when the text is not well-formed.
    pub fn parse_xml(&self, content: &str) -> Result<Document> {
        crate::xml::parse_document(content, MessageFormat::Xml)
    }

    /// Parse a SOAP envelope, returning its body payload as a document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] when the text is not a well-formed envelope.
    pub fn parse_soap(&self, content: &str) -> Result<Document> {
        crate::soap::parse_envelope(content)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
