//! Element nodes for the document model

use crate::namespace::Namespace;
use crate::{Error, Result};
use std::borrow::Cow;
use std::sync::Arc;

/// An element in the document tree
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Local name (without prefix)
    pub name: String,

    /// Namespace the element belongs to, if any
    pub namespace: Option<Arc<Namespace>>,

    /// Extra namespace declarations carried on this element
    pub declarations: Vec<Arc<Namespace>>,

    /// Non-namespace attributes, in document order
    pub attributes: Vec<Attribute>,

    /// Child elements, in document order
    pub children: Vec<Element>,

    /// Text content
    pub text: Option<String>,
}

/// An attribute as written in the source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name, including any prefix
    pub name: String,

    /// Unescaped attribute value
    pub value: String,
}

impl Attribute {
    /// Create a new attribute
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Element {
    /// Create an element in no namespace
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            declarations: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Create a namespace-qualified element
    pub fn qualified(name: impl Into<String>, namespace: Arc<Namespace>) -> Self {
        let mut element = Self::new(name);
        element.namespace = Some(namespace);
        element
    }

    /// Create an element with text content
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.text = Some(text.into());
        element
    }

    /// Namespace prefix, empty when unprefixed or in no namespace
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.namespace.as_deref().map_or("", Namespace::prefix)
    }

    /// Name as it appears in markup (`prefix:name` or `name`)
    #[must_use]
    pub fn qualified_name(&self) -> Cow<'_, str> {
        match self.prefix() {
            "" => Cow::Borrowed(self.name.as_str()),
            prefix => Cow::Owned(format!("{prefix}:{}", self.name)),
        }
    }

    /// True when the element carries a namespace
    #[must_use]
    pub fn is_namespaced(&self) -> bool {
        self.namespace.is_some()
    }

    /// Add a namespace declaration to this element
    pub fn declare_namespace(&mut self, namespace: Arc<Namespace>) -> &mut Self {
        if !self.declarations.contains(&namespace) {
            self.declarations.push(namespace);
        }
        self
    }

    /// Set an attribute, replacing any previous value
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
        self
    }

    /// Get an attribute value by name
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Replace the text content
    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(text.into());
        self
    }

    /// Append text content (used while parsing mixed text/CDATA runs)
    pub fn append_text(&mut self, text: &str) {
        match self.text.as_mut() {
            Some(existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }

    /// Text with leading/trailing whitespace removed and inner runs collapsed.
    ///
    /// Returns an empty string for elements without text.
    #[must_use]
    pub fn trimmed_text(&self) -> String {
        self.text
            .as_deref()
            .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default()
    }

    /// Append a child and return a mutable reference to it
    pub fn add_child(&mut self, child: Element) -> &mut Element {
        let index = self.children.len();
        self.children.push(child);
        &mut self.children[index]
    }

    /// True when `name` addresses this element exactly.
    ///
    /// A prefixed name must match the qualified name. An unprefixed name
    /// matches elements with no prefix, that is in no namespace or in the
    /// default namespace.
    #[must_use]
    pub fn matches_exact(&self, name: &str) -> bool {
        if name.contains(':') {
            self.qualified_name() == name
        } else {
            self.prefix().is_empty() && self.name == name
        }
    }

    /// True when the local part of `name` equals this element's local name
    #[must_use]
    pub fn matches_local(&self, name: &str) -> bool {
        let local = name.rsplit_once(':').map_or(name, |(_, local)| local);
        self.name == local
    }

    /// First child matching `name` exactly
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.matches_exact(name))
    }

    /// First child whose local name matches, ignoring namespaces
    #[must_use]
    pub fn child_by_local_name(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.matches_local(name))
    }

    /// First child matching exactly, falling back to local-name matching
    #[must_use]
    pub fn find_child(&self, name: &str) -> Option<&Element> {
        self.child(name).or_else(|| self.child_by_local_name(name))
    }

    /// Index of the child [`Element::find_child`] would return
    #[must_use]
    pub fn find_child_index(&self, name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|c| c.matches_exact(name))
            .or_else(|| self.children.iter().position(|c| c.matches_local(name)))
    }

    /// Locate a child by name or append a new one.
    ///
    /// New children inherit this element's namespace when it has one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] when `name` is not a valid XML name.
    pub fn child_or_insert(&mut self, name: &str) -> Result<&mut Element> {
        if let Some(index) = self.find_child_index(name) {
            return Ok(&mut self.children[index]);
        }
        if !is_valid_name(name) {
            return Err(Error::invalid_name(name));
        }
        let child = match &self.namespace {
            Some(ns) => Element::qualified(name, Arc::clone(ns)),
            None => Element::new(name),
        };
        Ok(self.add_child(child))
    }
}

/// Check that `name` is a valid unprefixed XML element name
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        }
        _ => false,
    }
}
