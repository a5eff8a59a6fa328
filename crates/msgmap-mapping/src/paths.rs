//! Path resolution over parsed messages and target documents
//!
//! Two notations are in use:
//!
//! - dot paths (`source.debtor.name`, `GrpHdr.MsgId`) read keyed JSON or,
//!   for XML sources, walk elements below the root by local name
//! - slash paths (`target:GrpHdr/MsgId`) address the target document from
//!   its root by exact name
//!
//! `constant:<literal>` yields the literal itself.

use msgmap_ir::{json, Document, Element, ParsedInput};
use tracing::trace;

/// Marks a literal in a `from` path
pub const CONSTANT_PREFIX: &str = "constant:";
/// Optional marker on slash paths
pub const TARGET_PREFIX: &str = "target:";
/// Optional marker on dot paths
pub const SOURCE_PREFIX: &str = "source.";

/// Read a scalar from a parsed inbound message.
///
/// For JSON the dot segments walk nested objects, with numeric segments
/// indexing arrays. When the path with `source.` removed finds nothing, the
/// full path is tried too, so payloads that nest fields under a literal
/// `source` key still resolve. For XML the path is resolved with
/// [`resolve_dot_path`].
#[must_use]
pub fn resolve_from_source(source: &ParsedInput, path: &str) -> Option<String> {
    if let Some(literal) = path.strip_prefix(CONSTANT_PREFIX) {
        return Some(literal.to_string());
    }

    let stripped = path.strip_prefix(SOURCE_PREFIX).unwrap_or(path);
    match source {
        ParsedInput::Json(value) => resolve_json(value, stripped).or_else(|| {
            if stripped.len() == path.len() {
                None
            } else {
                trace!(path, "retrying JSON lookup with the full path");
                resolve_json(value, path)
            }
        }),
        ParsedInput::Xml(document) => resolve_dot_path(document, stripped),
    }
}

fn resolve_json(value: &serde_json::Value, path: &str) -> Option<String> {
    json::lookup(value, path.split('.')).and_then(json::scalar_text)
}

/// Read the trimmed text of an element addressed by a dot path relative to
/// the document root.
///
/// Each segment selects the first child whose local name matches, ignoring
/// namespaces. A leading segment naming the root itself is skipped unless
/// the root has a child of that name.
#[must_use]
pub fn resolve_dot_path(document: &Document, path: &str) -> Option<String> {
    let segments: Vec<&str> = path
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let root = document.root();
    let segments = skip_root_segment(root, &segments);
    if segments.is_empty() {
        return None;
    }

    let mut current = root;
    for segment in segments {
        current = current.child_by_local_name(segment)?;
    }
    Some(current.trimmed_text())
}

fn skip_root_segment<'s>(root: &Element, segments: &'s [&'s str]) -> &'s [&'s str] {
    match segments.split_first() {
        Some((first, rest))
            if !rest.is_empty() && root.matches_local(first) && root.child_by_local_name(first).is_none() =>
        {
            rest
        }
        _ => segments,
    }
}

/// Read the trimmed text of an element addressed by a slash path from the
/// document root.
///
/// Each segment matches a child by exact name first, then by local name, so
/// `GrpHdr/MsgId` also reads a reply written with prefixed elements. An
/// element without text yields an empty string.
#[must_use]
pub fn resolve_from_document(document: &Document, path: &str) -> Option<String> {
    let path = path.strip_prefix(TARGET_PREFIX).unwrap_or(path);
    if path.split('/').all(|s| s.trim().is_empty()) {
        return None;
    }

    document
        .cursor()
        .navigate(path)
        .ok()
        .map(|cursor| cursor.element().trimmed_text())
}

/// Locate or create the element addressed by `path` and set its text.
///
/// Accepts `target:A/B`, `A/B` and `source.Root.A.B` (rewritten to
/// `Root/A/B`). A leading segment equal to the root name is skipped when
/// more segments follow. Missing elements are appended after existing
/// children and inherit their parent's namespace. Does nothing when either
/// `path` or `value` is absent.
///
/// # Errors
///
/// Returns [`msgmap_ir::Error::InvalidName`] when a segment that has to be
/// created is not a valid element name.
pub fn set_by_path(document: &mut Document, path: Option<&str>, value: Option<&str>) -> msgmap_ir::Result<()> {
    let (Some(path), Some(value)) = (path, value) else {
        return Ok(());
    };

    let path = path.strip_prefix(TARGET_PREFIX).unwrap_or(path);
    let rewritten;
    let path = match path.strip_prefix(SOURCE_PREFIX) {
        Some(dotted) => {
            rewritten = dotted.replace('.', "/");
            rewritten.as_str()
        }
        None => path,
    };

    let segments: Vec<&str> = path
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if segments.is_empty() {
        return Ok(());
    }

    let root = document.root_mut();
    let segments = match segments.split_first() {
        Some((first, rest)) if !rest.is_empty() && *first == root.name => rest,
        _ => &segments[..],
    };

    let mut current = root;
    for segment in segments {
        current = current.child_or_insert(segment)?;
    }
    current.set_text(value);
    Ok(())
}
