//! Compact XML serializer

use msgmap_ir::{Document, Element, Namespace};
use quick_xml::escape::{escape, partial_escape};
use std::sync::Arc;

/// XML declaration written ahead of every serialized document
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Serializer for element trees
///
/// Output is compact (no indentation) UTF-8 XML preceded by the declaration
/// line. Namespace declarations are written only where a binding first comes
/// into scope or changes.
pub struct XmlSerializer;

impl XmlSerializer {
    /// Create a new XML serializer
    pub fn new() -> Self {
        Self
    }

    /// Serialize a document
    #[must_use]
    pub fn serialize(&self, document: &Document) -> String {
        let mut out = String::with_capacity(256);
        out.push_str(XML_DECLARATION);
        out.push('\n');
        let mut scope: Vec<(String, String)> = Vec::new();
        write_element(&mut out, document.root(), &mut scope);
        out
    }

}

impl Default for XmlSerializer {
    fn default() -> Self {
        Self::new()
    }
}

/// URI currently bound to `prefix`, empty when unbound
fn bound_uri<'a>(scope: &'a [(String, String)], prefix: &str) -> &'a str {
    scope
        .iter()
        .rev()
        .find(|(p, _)| p == prefix)
        .map_or("", |(_, uri)| uri.as_str())
}

fn write_element(out: &mut String, element: &Element, scope: &mut Vec<(String, String)>) {
    let depth = scope.len();
    let name = element.qualified_name();

    out.push('<');
    out.push_str(&name);

    match &element.namespace {
        Some(ns) => declare_if_needed(out, ns, scope),
        None => {
            if !bound_uri(scope, "").is_empty() {
                out.push_str(r#" xmlns="""#);
                scope.push((String::new(), String::new()));
            }
        }
    }
    for declared in &element.declarations {
        declare_if_needed(out, declared, scope);
    }

    for attr in &element.attributes {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        out.push_str(&escape(attr.value.as_str()));
        out.push('"');
    }

    if element.text.is_none() && element.children.is_empty() {
        out.push_str("/>");
    } else {
        out.push('>');
        if let Some(text) = &element.text {
            out.push_str(&partial_escape(text.as_str()));
        }
        for child in &element.children {
            write_element(out, child, scope);
        }
        out.push_str("</");
        out.push_str(&name);
        out.push('>');
    }

    scope.truncate(depth);
}

fn declare_if_needed(out: &mut String, ns: &Arc<Namespace>, scope: &mut Vec<(String, String)>) {
    if bound_uri(scope, ns.prefix()) == ns.uri() {
        return;
    }
    out.push(' ');
    out.push_str(&ns.declaration_name());
    out.push_str("=\"");
    out.push_str(&escape(ns.uri()));
    out.push('"');
    scope.push((ns.prefix().to_string(), ns.uri().to_string()));
}
