use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Index;

// -----------------------------------------------------------------------------
// ElementId

/// The position of an [`Element`] in its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(u32);

impl ElementId {
    #[inline]
    const fn index(self) -> usize {
        self.0 as usize
    }
}

// -----------------------------------------------------------------------------
// Element

/// A name-value pair of a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// One element of a parsed [`Document`].
///
/// The body is the concatenation of the element's character data and CDATA
/// sections, entities decoded. Whitespace-only character data is not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub(super) tag: String,
    pub(super) attributes: Vec<Attribute>,
    pub(super) body: String,
    pub(super) parent: Option<ElementId>,
    pub(super) first_child: Option<ElementId>,
    pub(super) last_child: Option<ElementId>,
    pub(super) next_sibling: Option<ElementId>,
    pub(super) child_count: usize,
}

impl Element {
    pub(super) fn new(tag: String, attributes: Vec<Attribute>, parent: Option<ElementId>) -> Self {
        Self {
            tag,
            attributes,
            body: String::new(),
            parent,
            first_child: None,
            last_child: None,
            next_sibling: None,
            child_count: 0,
        }
    }

    #[inline]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the value of the attribute `name`.
    #[inline]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == name)
            .map(|attribute| attribute.value.as_str())
    }

    #[inline]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    #[inline]
    pub fn body(&self) -> &str {
        &self.body
    }

    #[inline]
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    #[inline]
    pub fn first_child(&self) -> Option<ElementId> {
        self.first_child
    }

    #[inline]
    pub fn next_sibling(&self) -> Option<ElementId> {
        self.next_sibling
    }

    #[inline]
    pub fn child_count(&self) -> usize {
        self.child_count
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }
}

// -----------------------------------------------------------------------------
// Document

/// A parsed markup document, elements stored in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    /// Returns the root element, `None` for an empty document.
    #[inline]
    pub fn root(&self) -> Option<ElementId> {
        (!self.elements.is_empty()).then_some(ElementId(0))
    }

    #[inline]
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.index())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns an iterator over the children of `id`.
    pub fn children(&self, id: ElementId) -> Children<'_> {
        Children {
            document: self,
            next: self.get(id).and_then(Element::first_child),
        }
    }

    /// Returns the element following the subtree of `id` in document order.
    pub fn skip_subtree(&self, id: ElementId) -> Option<ElementId> {
        let mut node = Some(id);
        while let Some(current) = node {
            let element = &self[current];
            if element.next_sibling.is_some() {
                return element.next_sibling;
            }
            node = element.parent;
        }
        None
    }

    pub(super) fn push(&mut self, element: Element) -> ElementId {
        let id = ElementId(self.elements.len() as u32);
        let parent = element.parent;
        self.elements.push(element);

        if let Some(parent) = parent {
            match self.elements[parent.index()].last_child {
                Some(last) => self.elements[last.index()].next_sibling = Some(id),
                None => self.elements[parent.index()].first_child = Some(id),
            }
            let parent = &mut self.elements[parent.index()];
            parent.last_child = Some(id);
            parent.child_count += 1;
        }
        id
    }

    #[inline]
    pub(super) fn element_mut(&mut self, id: ElementId) -> &mut Element {
        &mut self.elements[id.index()]
    }
}

impl Index<ElementId> for Document {
    type Output = Element;

    #[inline]
    fn index(&self, id: ElementId) -> &Element {
        &self.elements[id.index()]
    }
}

/// Iterator over the children of an element, see [`Document::children`].
pub struct Children<'a> {
    document: &'a Document,
    next: Option<ElementId>,
}

impl<'a> Iterator for Children<'a> {
    type Item = (ElementId, &'a Element);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let element = &self.document[id];
        self.next = element.next_sibling;
        Some((id, element))
    }
}
