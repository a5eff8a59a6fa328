//! Mapping runtime
//!
//! Executes a route's field mappings in both directions:
//!
//! - request: inbound JSON/SOAP/XML → canonical XML document
//! - response: canonical XML reply → JSON object or XML for the caller
//!
//! A mapping that fails (bad element name, invalid date pattern, JSON shape
//! conflict) is logged and skipped; the remaining mappings still apply.

use crate::config::{FieldMapping, MappingConfig};
use crate::paths::{self, CONSTANT_PREFIX, SOURCE_PREFIX, TARGET_PREFIX};
use crate::transforms::Transformer;
use crate::{Error, Result};
use msgmap_codec::{InputParser, MessageFormat, XmlSerializer};
use msgmap_ir::{Document, Namespace, ParsedInput};
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Root element of XML replies when no response mapping names one
pub const DEFAULT_REPLY_ROOT: &str = "Response";

/// Applies route configurations to messages
#[derive(Debug, Clone, Default)]
pub struct MappingEngine {
    parser: InputParser,
    transformer: Transformer,
}

impl MappingEngine {
    /// Create an engine using the system clock
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a custom transformer
    #[must_use]
    pub fn with_transformer(transformer: Transformer) -> Self {
        Self {
            parser: InputParser::new(),
            transformer,
        }
    }

    /// Translate an inbound message into the route's canonical XML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] when the route has no inbound format or the
    /// message is malformed for it.
    pub fn transform_to_target(&self, inbound: &str, config: &MappingConfig) -> Result<String> {
        let route = config.route_id.as_str();
        let format = config.inbound_format.ok_or_else(|| {
            Error::parse(route, msgmap_codec::Error::UnsupportedFormat("(none)".to_string()))
        })?;

        let parsed = self
            .parser
            .parse(inbound, format)
            .map_err(|e| Error::parse(route, e))?;

        let mut document = create_target_document(config);
        for (index, mapping) in config.mappings.request.iter().enumerate() {
            if let Err(e) = self.apply_request_mapping(&parsed, &mut document, mapping) {
                log_skipped(route, index, mapping, &e);
            }
        }

        let xml = XmlSerializer::new().serialize(&document);
        debug!(route, mappings = config.mappings.request.len(), "translated request");

        match config.namespace.as_ref() {
            Some(ns) => match (ns.root_element_prefix.as_deref(), ns.uri.as_deref()) {
                (Some(prefix), Some(uri)) if !prefix.is_empty() => {
                    prefix_root(&xml, config.root_element_name(), prefix, uri)
                        .map_err(|message| Error::mapping(route, message))
                }
                _ => Ok(xml),
            },
            None => Ok(xml),
        }
    }

    /// Translate a canonical XML reply into the caller's format.
    ///
    /// A [`MessageFormat::Json`] reply is a JSON object built from the
    /// response mappings (`{}` when there are none); every other format
    /// yields XML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] when `target` is not well-formed XML.
    pub fn transform_from_target(&self, target: &str, config: &MappingConfig, reply_format: MessageFormat) -> Result<String> {
        let route = config.route_id.as_str();
        let parsed = self
            .parser
            .parse(target, MessageFormat::Xml)
            .map_err(|e| Error::parse(route, e))?;

        let reply = match reply_format {
            MessageFormat::Json => self.reply_json(&parsed, config),
            _ => self.reply_xml(&parsed, config),
        };
        debug!(route, %reply_format, mappings = config.mappings.response.len(), "translated response");
        Ok(reply)
    }

    fn apply_request_mapping(&self, parsed: &ParsedInput, document: &mut Document, mapping: &FieldMapping) -> Result<()> {
        let value = mapping
            .from
            .as_deref()
            .and_then(|from| paths::resolve_from_source(parsed, from))
            .or_else(|| mapping.default_value.clone());

        // Transforms run even without a value; now() and constants need none.
        let result = match mapping.transform_expression() {
            Some(expression) => self.transformer.apply(value.as_deref(), expression, Some(parsed))?,
            None => value,
        };

        paths::set_by_path(document, mapping.to.as_deref(), result.as_deref())?;
        Ok(())
    }

    /// Value for a response mapping, after defaulting and transformation
    fn response_value(&self, parsed: &ParsedInput, mapping: &FieldMapping) -> Result<Option<String>> {
        let value = mapping
            .from
            .as_deref()
            .and_then(|from| resolve_reply_source(parsed, from))
            .or_else(|| mapping.default_value.clone());

        match (value, mapping.transform_expression()) {
            (Some(value), Some(expression)) => self.transformer.apply(Some(&value), expression, Some(parsed)),
            (value, _) => Ok(value),
        }
    }

    fn reply_json(&self, parsed: &ParsedInput, config: &MappingConfig) -> String {
        let route = config.route_id.as_str();
        let mut reply = Map::new();

        for (index, mapping) in config.mappings.response.iter().enumerate() {
            let outcome = self.response_value(parsed, mapping).and_then(|value| {
                match (mapping.to.as_deref(), value) {
                    (Some(to), Some(value)) => set_json_value(&mut reply, to, value)
                        .map_err(|message| Error::mapping(route, message)),
                    _ => Ok(()),
                }
            });
            if let Err(e) = outcome {
                log_skipped(route, index, mapping, &e);
            }
        }

        serde_json::to_string(&Value::Object(reply)).unwrap_or_else(|_| "{}".to_string())
    }

    fn reply_xml(&self, parsed: &ParsedInput, config: &MappingConfig) -> String {
        let route = config.route_id.as_str();
        let mut document = Document::with_root(reply_root_name(config));

        for (index, mapping) in config.mappings.response.iter().enumerate() {
            let outcome = self.response_value(parsed, mapping).and_then(|value| {
                paths::set_by_path(&mut document, mapping.to.as_deref(), value.as_deref())
                    .map_err(Error::from)
            });
            if let Err(e) = outcome {
                log_skipped(route, index, mapping, &e);
            }
        }

        XmlSerializer::new().serialize(&document)
    }
}

/// Fresh canonical document: root named per config, qualified when a
/// namespace URI is configured, with an extra declaration for a distinct
/// root prefix.
fn create_target_document(config: &MappingConfig) -> Document {
    let root = config.root_element_name();
    let Some(ns) = config.namespace.as_ref() else {
        return Document::with_root(root);
    };
    let Some(uri) = ns.uri.as_deref() else {
        return Document::with_root(root);
    };

    let prefix = ns.prefix.as_deref().unwrap_or("");
    let mut document = Document::with_qualified_root(root, Namespace::new(prefix, uri));
    if let Some(root_prefix) = ns.root_element_prefix.as_deref() {
        if !root_prefix.is_empty() && root_prefix != prefix {
            document.root_mut().declare_namespace(Namespace::new(root_prefix, uri));
        }
    }
    document
}

/// Response `from` values: constants, slash paths from the reply root, or
/// dot paths resolved by local name.
fn resolve_reply_source(parsed: &ParsedInput, from: &str) -> Option<String> {
    if let Some(literal) = from.strip_prefix(CONSTANT_PREFIX) {
        return Some(literal.to_string());
    }
    let path = from.strip_prefix(TARGET_PREFIX).unwrap_or(from);
    let document = parsed.as_document()?;
    if path.contains('/') || !path.contains('.') {
        paths::resolve_from_document(document, path)
    } else {
        paths::resolve_from_source(parsed, path)
    }
}

/// Root of an XML reply: the first segment after `source.` in the first
/// response mapping's `to`
fn reply_root_name(config: &MappingConfig) -> &str {
    config
        .mappings
        .response
        .first()
        .and_then(|m| m.to.as_deref())
        .and_then(|to| to.strip_prefix(SOURCE_PREFIX))
        .and_then(|rest| rest.split('.').next())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_REPLY_ROOT)
}

/// Insert `value` at a dotted key path, creating nested objects
fn set_json_value(map: &mut Map<String, Value>, path: &str, value: String) -> std::result::Result<(), String> {
    let mut parts: Vec<&str> = path.split('.').collect();
    let last = parts.pop().unwrap_or(path);

    let mut current = map;
    for part in parts {
        let entry = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match entry {
            Value::Object(inner) => inner,
            _ => return Err(format!("'{part}' in '{path}' already holds a non-object value")),
        };
    }
    current.insert(last.to_string(), Value::String(value));
    Ok(())
}

/// Rewrite the serialized root to carry `prefix`.
///
/// The first default declaration of `uri` becomes `xmlns:prefix="uri"` (a
/// duplicate of that declaration on the root is dropped), the root's opening
/// tag gains the prefix, and so does the last closing tag of the root name.
fn prefix_root(xml: &str, root: &str, prefix: &str, uri: &str) -> std::result::Result<String, String> {
    let prefixed_decl = format!(r#"xmlns:{prefix}="{uri}""#);
    let mut xml = xml.to_string();

    let default_decl = format!(r#"xmlns="{uri}""#);
    if let Some(start) = xml.find(&default_decl) {
        xml.replace_range(start..start + default_decl.len(), &prefixed_decl);
        let after = start + prefixed_decl.len();
        let tag_end = xml[after..].find('>').map_or(xml.len(), |i| after + i);
        let duplicate = format!(" {prefixed_decl}");
        if let Some(offset) = xml[after..tag_end].find(&duplicate) {
            let at = after + offset;
            xml.replace_range(at..at + duplicate.len(), "");
        }
    }

    let open = Regex::new(&format!(r"<{}([\s/][^>]*)?>", regex::escape(root)))
        .map_err(|e| format!("cannot match root element '{root}': {e}"))?;
    let xml = open
        .replacen(&xml, 1, |caps: &regex::Captures<'_>| {
            format!("<{prefix}:{root}{}>", caps.get(1).map_or("", |m| m.as_str()))
        })
        .into_owned();

    let close = format!("</{root}>");
    Ok(match xml.rfind(&close) {
        Some(at) => format!("{}</{prefix}:{root}>{}", &xml[..at], &xml[at + close.len()..]),
        None => xml,
    })
}

fn log_skipped(route: &str, index: usize, mapping: &FieldMapping, error: &Error) {
    warn!(
        route,
        index,
        from = mapping.from.as_deref().unwrap_or(""),
        to = mapping.to.as_deref().unwrap_or(""),
        error = %error,
        "skipping field mapping"
    );
}
