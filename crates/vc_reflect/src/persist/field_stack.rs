use alloc::vec::Vec;
use core::fmt::{Debug, Formatter};
use core::slice::Iter;

use crate::info::{Class, Field};

// -----------------------------------------------------------------------------
// FieldFrame

/// The owner class and the field being read at one nesting level.
#[derive(Clone, Copy)]
pub struct FieldFrame {
    owner: &'static Class,
    field: Option<&'static Field>,
}

impl FieldFrame {
    /// Returns the class whose fields are being read.
    #[inline]
    pub const fn owner(&self) -> &'static Class {
        self.owner
    }

    /// Returns the field being read, `None` between fields or for an unknown name.
    #[inline]
    pub const fn field(&self) -> Option<&'static Field> {
        self.field
    }
}

impl Debug for FieldFrame {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self.field {
            Some(field) => write!(f, "`{}`.{}", self.owner.name(), field.name()),
            None => write!(f, "`{}`", self.owner.name()),
        }
    }
}

// -----------------------------------------------------------------------------
// FieldContextStack

/// Helper struct for managing the stack of [`FieldFrame`]s while reading.
///
/// One frame is pushed when the reader steps into the field children of an
/// element and popped when it leaves them, on success or failure.
#[derive(Default, Clone)]
pub(crate) struct FieldContextStack {
    stack: Vec<FieldFrame>,
}

impl FieldContextStack {
    /// Create a new empty [`FieldContextStack`].
    pub const fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Push a frame for `owner`, with no current field.
    pub fn push(&mut self, owner: &'static Class) {
        self.stack.push(FieldFrame { owner, field: None });
    }

    /// Pop the last frame off the stack.
    pub fn pop(&mut self) {
        self.stack.pop();
    }

    /// Set the current field of the innermost frame.
    pub fn set_field(&mut self, field: Option<&'static Field>) {
        if let Some(frame) = self.stack.last_mut() {
            frame.field = field;
        }
    }

    /// The innermost frame.
    pub fn top(&self) -> Option<&FieldFrame> {
        self.stack.last()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Get an iterator over the stack in the order they were pushed.
    pub fn iter(&self) -> Iter<'_, FieldFrame> {
        self.stack.iter()
    }
}

impl Debug for FieldContextStack {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let mut iter = self.iter();

        if let Some(first) = iter.next() {
            writeln!(f, "{first:?}")?;
        }

        for frame in iter {
            writeln!(f, " -> {frame:?}")?;
        }

        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::FieldContextStack;
    use crate::info::Typed;
    use crate::{Object, impl_reflect_object};

    #[derive(Default)]
    struct Frame {
        depth: u8,
    }

    impl_reflect_object!(Frame, "Frame", [depth]);
    impl Object for Frame {}

    #[test]
    fn push_set_pop() {
        let class = Frame::static_class();
        let mut stack = FieldContextStack::new();
        assert!(stack.top().is_none());

        stack.push(class);
        assert!(stack.top().unwrap().field().is_none());
        stack.set_field(class.field("depth"));
        assert_eq!(stack.top().unwrap().field().map(|f| f.name()), Some("depth"));

        stack.push(class);
        assert_eq!(stack.depth(), 2);
        assert_eq!(format!("{stack:?}"), "`Frame`.depth\n -> `Frame`\n");

        stack.pop();
        stack.pop();
        assert_eq!(stack.depth(), 0);
        assert!(stack.top().is_none());
    }
}
