//! XML reader producing namespace-aware element trees

use crate::{Error, MessageFormat, Result};
use msgmap_ir::{Attribute, Document, Element, Namespace};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::sync::Arc;
use tracing::trace;

/// Namespace bindings introduced by one open element
type Frame = Vec<Arc<Namespace>>;

/// Parse well-formed XML text into a [`Document`].
///
/// `format` only labels errors; SOAP and vendor XML share this reader.
///
/// # Errors
///
/// Returns [`Error::Parse`] with line/column context when the text is not
/// well-formed, uses an unbound namespace prefix, or has no single root.
pub fn parse_document(content: &str, format: MessageFormat) -> Result<Document> {
    let mut reader = Reader::from_str(content);
    let mut open: Vec<Element> = Vec::new();
    let mut frames: Vec<Frame> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let position = usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX);
        let event = reader.read_event().map_err(|e| {
            let at = usize::try_from(reader.error_position()).unwrap_or(position);
            error_at(content, at, format, e.to_string())
        })?;

        match event {
            Event::Start(start) => {
                let (element, frame) = open_element(&start, &frames)
                    .map_err(|message| error_at(content, position, format, message))?;
                frames.push(frame);
                open.push(element);
            }
            Event::Empty(start) => {
                let (element, _) = open_element(&start, &frames)
                    .map_err(|message| error_at(content, position, format, message))?;
                close_element(element, &mut open, &mut root)
                    .map_err(|message| error_at(content, position, format, message))?;
            }
            Event::End(_) => {
                frames.pop();
                let mut element = open.pop().ok_or_else(|| {
                    error_at(content, position, format, "unexpected closing tag")
                })?;
                if !element.children.is_empty()
                    && element.text.as_deref().is_some_and(|t| t.trim().is_empty())
                {
                    element.text = None;
                }
                close_element(element, &mut open, &mut root)
                    .map_err(|message| error_at(content, position, format, message))?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| error_at(content, position, format, e.to_string()))?;
                append_text(&mut open, &text)
                    .map_err(|message| error_at(content, position, format, message))?;
            }
            Event::CData(data) => {
                let text = String::from_utf8(data.into_inner().into_owned())
                    .map_err(|e| error_at(content, position, format, e.to_string()))?;
                append_text(&mut open, &text)
                    .map_err(|message| error_at(content, position, format, message))?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes carry no payload.
            _ => {}
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(error_at(
            content,
            content.len(),
            format,
            format!("unexpected end of input, <{}> is not closed", unclosed.qualified_name()),
        ));
    }

    let root = root.ok_or_else(|| error_at(content, content.len(), format, "no root element"))?;
    trace!(root = %root.qualified_name(), "parsed XML document");
    Ok(Document::new(root))
}

/// Build an element from a start tag, resolving its namespace against the
/// bindings in scope plus those the tag itself declares.
fn open_element(start: &BytesStart<'_>, frames: &[Frame]) -> std::result::Result<(Element, Frame), String> {
    let qname = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| format!("element name is not UTF-8: {e}"))?
        .to_string();

    let mut frame: Frame = Vec::new();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| format!("attribute name is not UTF-8: {e}"))?
            .to_string();
        let value = attr.unescape_value().map_err(|e| e.to_string())?.into_owned();

        if key == "xmlns" {
            frame.push(Namespace::new("", value));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            frame.push(Namespace::new(prefix, value));
        } else {
            attributes.push(Attribute::new(key, value));
        }
    }

    let (prefix, local) = match qname.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => ("", qname.as_str()),
    };

    let namespace = lookup(prefix, &frame, frames);
    let namespace = match namespace {
        Some(ns) if ns.uri().is_empty() => None,
        Some(ns) => Some(ns),
        None if prefix.is_empty() => None,
        None => return Err(format!("unbound namespace prefix '{prefix}' on <{qname}>")),
    };

    let mut element = Element::new(local);
    element.namespace = namespace.clone();
    element.attributes = attributes;
    for declared in &frame {
        if namespace.as_ref() != Some(declared) && !declared.uri().is_empty() {
            element.declare_namespace(Arc::clone(declared));
        }
    }

    Ok((element, frame))
}

/// Innermost binding for `prefix`
fn lookup(prefix: &str, current: &Frame, frames: &[Frame]) -> Option<Arc<Namespace>> {
    std::iter::once(current)
        .chain(frames.iter().rev())
        .flat_map(|frame| frame.iter().rev())
        .find(|ns| ns.prefix() == prefix)
        .cloned()
}

fn close_element(element: Element, open: &mut [Element], root: &mut Option<Element>) -> std::result::Result<(), String> {
    match open.last_mut() {
        Some(parent) => {
            parent.add_child(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(format!(
            "multiple root elements, <{}> follows the document element",
            element.qualified_name()
        )),
    }
}

fn append_text(open: &mut [Element], text: &str) -> std::result::Result<(), String> {
    match open.last_mut() {
        Some(current) => {
            current.append_text(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err("text content outside the document element".to_string()),
    }
}

fn error_at(content: &str, offset: usize, format: MessageFormat, message: impl Into<String>) -> Error {
    let (line, column) = line_column(content, offset);
    Error::parse_at(format, line, column, message)
}

/// One-based line and column of a byte offset
pub(crate) fn line_column(content: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(content.len());
    let before = &content.as_bytes()[..offset];
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    let column = match before.iter().rposition(|&b| b == b'\n') {
        Some(newline) => offset - newline,
        None => offset + 1,
    };
    (line, column)
}
