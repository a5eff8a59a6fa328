//! Document container for the element tree

use crate::element::Element;
use crate::namespace::Namespace;
use crate::traversal::Cursor;
use std::sync::Arc;

/// A document with exactly one root element
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Create a document around an existing root element
    #[must_use]
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// Create a document whose root is in no namespace
    pub fn with_root(name: impl Into<String>) -> Self {
        Self::new(Element::new(name))
    }

    /// Create a document whose root is namespace-qualified
    pub fn with_qualified_root(name: impl Into<String>, namespace: Arc<Namespace>) -> Self {
        Self::new(Element::qualified(name, namespace))
    }

    /// Root element
    #[must_use]
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Mutable root element. The root itself is never replaced.
    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Cursor positioned at the root
    #[must_use]
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(&self.root)
    }
}
