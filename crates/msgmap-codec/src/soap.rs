//! SOAP envelope unwrapping

use crate::{Error, MessageFormat, Result};
use msgmap_ir::{Document, Element};
use tracing::debug;

/// Parse a SOAP envelope and return its payload as a standalone document.
///
/// The payload is the first element child of the envelope's `Body`. When the
/// envelope has no `Body`, or the `Body` is empty, the whole envelope is
/// returned instead.
///
/// # Errors
///
/// Returns [`Error::Parse`] when the text is not well-formed XML or the root
/// element is not an `Envelope`.
pub fn parse_envelope(content: &str) -> Result<Document> {
    let document = crate::xml::parse_document(content, MessageFormat::Soap)?;

    if !document.root().matches_local("Envelope") {
        return Err(Error::parse_at(
            MessageFormat::Soap,
            1,
            1,
            format!(
                "expected SOAP Envelope root, found <{}>",
                document.root().qualified_name()
            ),
        ));
    }

    match body_payload(document.root()) {
        Some(payload) => {
            debug!(payload = %payload.qualified_name(), "unwrapped SOAP body");
            Ok(Document::new(payload.clone()))
        }
        None => {
            debug!("SOAP envelope has no body payload, using the envelope");
            Ok(document)
        }
    }
}

fn body_payload(envelope: &Element) -> Option<&Element> {
    envelope.child_by_local_name("Body")?.children.first()
}
