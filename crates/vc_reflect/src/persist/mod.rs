//! Reading and writing object graphs as markup archives.
//!
//! # Overview
//!
//! An archive is a markup document with one root element holding the file format
//! version, and one child element per root object:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <Reflect FileFormatVersion="4">
//!   <Object Type="Mesh">
//!     <Object Type="String" Name="name"><![CDATA[cube]]></Object>
//!     <Object Type="ObjectPtr" Name="material">
//!       <Object Type="Material">
//!         <Object Type="f32" Name="roughness"><![CDATA[0.5]]></Object>
//!       </Object>
//!     </Object>
//!   </Object>
//! </Reflect>
//! ```
//!
//! Every element carries a `Type` attribute, the registered class or data class
//! name, and field elements carry a `Name` attribute. An empty `Type` is a null
//! reference.
//!
//! ## Writing
//!
//! [`Archive::write`] walks the root objects and their reflected fields, each field
//! value being written by its [`Data`](crate::data::Data) codec. The convenience
//! functions [`to_string`] and [`objects_to_string`] write into a `String`.
//!
//! ## Reading
//!
//! [`Archive::read`] parses the whole stream into a [`Document`](markup::Document)
//! first (in chunks, see [`ArchiveConfig::chunk_size`]), then walks it with a
//! [`Cursor`](markup::Cursor), constructing objects through a
//! [`TypeRegistry`](crate::registry::TypeRegistry).
//!
//! Reading is tolerant: an unregistered type, an undeclared field or a field whose
//! type changed is skipped with an [`ArchiveWarning`]. Only malformed markup, stream
//! failures and unreadable values of declared fields fail the read.
//!
//! Objects can also be pulled one by one, see
//! [`Archive::begin_reading_single_objects`], which is how [`from_str`] finds the
//! first object of a class.
//!
//! ## Progress
//!
//! An observer set with [`Archive::set_observer`] receives [`ArchiveStatus`] events
//! and may cancel the walk, as can any clone of the [`AbortHandle`].

// -----------------------------------------------------------------------------
// Modules

mod archive;
mod convert;
mod de;
mod error;
mod field_stack;
mod parser;
mod ser;
mod status;

pub mod markup;

#[cfg(test)]
mod tests;

// -----------------------------------------------------------------------------
// Constants

/// The file format version this crate writes.
pub const CURRENT_VERSION: u32 = 4;

pub(crate) const ROOT_TAG: &str = "Reflect";
pub(crate) const OBJECT_TAG: &str = "Object";
pub(crate) const VERSION_ATTRIBUTE: &str = "FileFormatVersion";
pub(crate) const TYPE_ATTRIBUTE: &str = "Type";
pub(crate) const NAME_ATTRIBUTE: &str = "Name";

// -----------------------------------------------------------------------------
// Exports

pub use archive::Archive;
pub use convert::{from_str, from_str_as, objects_from_str, objects_to_string, to_string};
pub use error::{ArchiveError, ArchiveWarning, ParseError, ParseErrorKind, StreamError};
pub use field_stack::FieldFrame;
pub use parser::DEFAULT_CHUNK_SIZE;
pub use status::{AbortHandle, ArchiveConfig, ArchiveFlags, ArchiveState, ArchiveStatus};
pub use status::{Outcome, StatusObserver};
