use crate::persist::markup::{Document, ElementId};

/// A pre-order position in a [`Document`].
///
/// The cursor holds no borrow of the document, every move takes it as an argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    current: Option<ElementId>,
}

impl Cursor {
    #[inline]
    pub const fn new(at: Option<ElementId>) -> Self {
        Self { current: at }
    }

    /// The element under the cursor, `None` past the end of the document.
    #[inline]
    pub const fn current(&self) -> Option<ElementId> {
        self.current
    }

    #[inline]
    pub fn set_current(&mut self, at: Option<ElementId>) {
        self.current = at;
    }

    /// Moves to the next element in document order.
    ///
    /// With `skip_children` the subtree of the current element is stepped over.
    pub fn advance(&mut self, document: &Document, skip_children: bool) {
        let Some(id) = self.current else {
            return;
        };
        if !skip_children && let Some(child) = document[id].first_child() {
            self.current = Some(child);
            return;
        }
        self.current = document.skip_subtree(id);
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::Cursor;
    use crate::persist::markup::{Document, DocumentBuilder};

    fn parse(text: &str) -> Document {
        DocumentBuilder::new().parse(text.as_bytes()).unwrap()
    }

    fn walk(document: &Document, skip: impl Fn(&str) -> bool) -> Vec<&str> {
        let mut cursor = Cursor::new(document.root());
        let mut tags = Vec::new();
        while let Some(id) = cursor.current() {
            let tag = document[id].tag();
            tags.push(tag);
            cursor.advance(document, skip(tag));
        }
        tags
    }

    #[test]
    fn pre_order() {
        let document = parse("<a><b><c/><d/></b><e><f/></e></a>");
        assert_eq!(walk(&document, |_| false), ["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn skip_children() {
        let document = parse("<a><b><c/><d/></b><e><f/></e></a>");
        assert_eq!(walk(&document, |tag| tag == "b"), ["a", "b", "e", "f"]);
        assert_eq!(walk(&document, |tag| tag == "a"), ["a"]);
    }

    #[test]
    fn end_is_sticky() {
        let document = parse("<a/>");
        let mut cursor = Cursor::new(document.root());
        cursor.advance(&document, false);
        assert_eq!(cursor.current(), None);
        cursor.advance(&document, false);
        assert_eq!(cursor.current(), None);
    }
}
