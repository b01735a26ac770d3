//! The markup tree archives are read from.
//!
//! A stream is parsed into a [`Document`] by a [`DocumentBuilder`], then walked in
//! pre-order with a [`Cursor`].

// -----------------------------------------------------------------------------
// Modules

mod builder;
mod cursor;
mod document;

// -----------------------------------------------------------------------------
// Exports

pub use builder::DocumentBuilder;
pub use cursor::Cursor;
pub use document::{Attribute, Children, Document, Element, ElementId};
