//! Namespace handles

use std::fmt;
use std::sync::Arc;

/// An XML namespace binding: a prefix (empty for the default namespace) and a URI.
///
/// Elements hold namespaces behind an [`Arc`], so a namespace declared once on
/// a root is shared by every descendant created under it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    prefix: String,
    uri: String,
}

impl Namespace {
    /// Create a shared namespace handle
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            prefix: prefix.into(),
            uri: uri.into(),
        })
    }

    /// Namespace prefix, empty for the default namespace
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Namespace URI
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// True when this binding is the default (unprefixed) namespace
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.prefix.is_empty()
    }

    /// Attribute name used to declare this binding (`xmlns` or `xmlns:prefix`)
    #[must_use]
    pub fn declaration_name(&self) -> String {
        if self.is_default() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{}", self.prefix)
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=\"{}\"", self.declaration_name(), self.uri)
    }
}
