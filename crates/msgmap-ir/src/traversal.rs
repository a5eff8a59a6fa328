//! Cursor for navigating the element tree by slash path

use crate::element::Element;
use crate::Error;
use crate::Result;

/// A cursor positioned on one element of a tree
pub struct Cursor<'a> {
    /// Current element
    element: &'a Element,

    /// Names walked so far (for error reporting)
    path: Vec<String>,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the given element
    pub fn new(element: &'a Element) -> Self {
        Self {
            element,
            path: vec![element.qualified_name().into_owned()],
        }
    }

    /// Get the current element
    pub fn element(&self) -> &'a Element {
        self.element
    }

    /// Navigate using a slash path (e.g., "GrpHdr/MsgId").
    ///
    /// Each segment selects the first child with that exact name, or failing
    /// that the first child with that local name. Empty segments are skipped
    /// and each segment is trimmed.
    pub fn navigate(&self, path: &str) -> Result<Cursor<'a>> {
        let mut current = self.element;
        let mut current_path = self.path.clone();

        for raw in path.split('/') {
            let segment = raw.trim();
            if segment.is_empty() {
                continue;
            }

            current = current.find_child(segment).ok_or_else(|| {
                Error::node_not_found(format!("{}/{}", current_path.join("/"), segment))
            })?;
            current_path.push(segment.to_string());
        }

        Ok(Cursor {
            element: current,
            path: current_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::Namespace;

    fn sample_tree() -> Element {
        let mut root = Element::new("Document");
        let mut hdr = Element::new("GrpHdr");
        hdr.add_child(Element::with_text("MsgId", "MSG-1"));
        root.add_child(hdr);
        root.add_child(Element::with_text("Tx", "first"));
        root.add_child(Element::with_text("Tx", "second"));
        root
    }

    #[test]
    fn test_cursor_creation() {
        let root = Element::new("Document");
        let cursor = Cursor::new(&root);

        assert_eq!(cursor.element().name, "Document");
    }

    #[test]
    fn test_cursor_navigate() {
        let root = sample_tree();
        let cursor = Cursor::new(&root);
        let msg_id = cursor.navigate("GrpHdr/MsgId").unwrap();

        assert_eq!(msg_id.element().trimmed_text(), "MSG-1");
        assert_eq!(cursor.navigate("Tx").unwrap().element().trimmed_text(), "first");
    }

    #[test]
    fn test_cursor_navigate_not_found() {
        let root = sample_tree();
        let cursor = Cursor::new(&root);

        match cursor.navigate("GrpHdr/Missing") {
            Err(Error::NodeNotFound { path }) => assert_eq!(path, "Document/GrpHdr/Missing"),
            _ => panic!("Expected NodeNotFound error"),
        }
    }

    #[test]
    fn test_cursor_navigate_prefixed_by_local_name() {
        let ns = Namespace::new("ns", "urn:x");
        let mut root = Element::qualified("Document", Namespace::new("ns", "urn:x"));
        let hdr = root.add_child(Element::qualified("GrpHdr", ns));
        hdr.add_child(Element::with_text("MsgId", "M1"));
        let cursor = Cursor::new(&root);

        assert_eq!(cursor.navigate("GrpHdr/MsgId").unwrap().element().trimmed_text(), "M1");
        assert_eq!(cursor.navigate("ns:GrpHdr/MsgId").unwrap().element().trimmed_text(), "M1");
    }

    #[test]
    fn test_cursor_navigate_prefers_exact_match() {
        let mut root = Element::new("Root");
        root.add_child(Element::qualified("Amt", Namespace::new("p", "urn:p")))
            .set_text("prefixed");
        root.add_child(Element::with_text("Amt", "plain"));
        let cursor = Cursor::new(&root);

        assert_eq!(cursor.navigate("Amt").unwrap().element().trimmed_text(), "plain");
        assert_eq!(cursor.navigate("p:Amt").unwrap().element().trimmed_text(), "prefixed");
    }

    #[test]
    fn test_cursor_navigate_empty_segments() {
        let root = sample_tree();
        let cursor = Cursor::new(&root);

        let hdr = cursor.navigate("//GrpHdr//").unwrap();
        assert_eq!(hdr.element().name, "GrpHdr");
    }
}
