//! Per-type value codecs.
//!
//! Every reflected field value implements [`Data`]: it knows the data class name it
//! is written under and how to write itself into an [`ArchiveWriter`] or read itself
//! back from an [`ArchiveReader`].
//!
//! ## Built-in codecs
//!
//! | Rust type                  | data class  | markup                                     |
//! |----------------------------|-------------|--------------------------------------------|
//! | `bool`, integers, floats   | `u32`, ...  | compact, text in a CDATA section           |
//! | `char`, `String`           | same        | compact, text in a CDATA section           |
//! | `Option<Box<dyn Object>>`  | `ObjectPtr` | one child element, empty `Type` for `None` |
//! | `Vec<T: ArrayItem>`        | `Array`     | one child element per item                 |
//! | reflected struct           | class name  | the struct fields as children              |
//!
//! Element attributes, tags and indentation are the archive's business, a codec only
//! produces or consumes the element body.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::info::Class;
use crate::persist::{ArchiveError, FieldFrame};
use crate::registry::TypeRegistry;
use crate::{Object, Struct};

// -----------------------------------------------------------------------------
// Modules

mod array;
mod pointer;
mod simple;

// -----------------------------------------------------------------------------
// Exports

pub use array::{ARRAY_DATA_CLASS, ArrayItem};
#[doc(hidden)]
pub use array::allocate_struct_item;
pub use pointer::OBJECT_PTR_DATA_CLASS;
pub use simple::SIMPLE_DATA_CLASSES;

// -----------------------------------------------------------------------------
// Advance

/// Tells the archive whether a codec moved the read cursor itself.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The codec only read the element text, the archive steps past the element.
    Pending,
    /// The codec walked the element (and its children) through the reader.
    Consumed,
}

// -----------------------------------------------------------------------------
// Data

/// A value codec.
///
/// # Examples
///
/// A leaf codec that stores an RGB color as `#rrggbb`:
///
/// ```
/// use vc_reflect::data::{Advance, ArchiveReader, ArchiveWriter, Data, DataKind};
/// use vc_reflect::persist::ArchiveError;
///
/// #[derive(Default)]
/// struct Rgb(u8, u8, u8);
///
/// impl Data for Rgb {
///     fn data_class(&self) -> &'static str {
///         Self::DATA_CLASS
///     }
///
///     fn serialize(&self, writer: &mut dyn ArchiveWriter) -> Result<(), ArchiveError> {
///         writer.write_text(&format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2))
///     }
///
///     fn deserialize(&mut self, reader: &mut dyn ArchiveReader) -> Result<Advance, ArchiveError> {
///         let text = reader.read_text()?;
///         let parse = |i: usize| {
///             text.get(i..i + 2)
///                 .and_then(|hex| u8::from_str_radix(hex, 16).ok())
///                 .ok_or_else(|| ArchiveError::data(Self::DATA_CLASS, text, "expected `#rrggbb`"))
///         };
///         *self = Rgb(parse(1)?, parse(3)?, parse(5)?);
///         Ok(Advance::Pending)
///     }
/// }
///
/// impl DataKind for Rgb {
///     const DATA_CLASS: &'static str = "Rgb";
/// }
/// ```
pub trait Data: Send + Sync + 'static {
    /// Returns the data class name written in the `Type` attribute.
    fn data_class(&self) -> &'static str;

    /// Returns `true` if the value is written on a single line.
    #[inline]
    fn is_compact(&self) -> bool {
        true
    }

    /// Writes the element body.
    fn serialize(&self, writer: &mut dyn ArchiveWriter) -> Result<(), ArchiveError>;

    /// Reads the element body under the reader's cursor.
    fn deserialize(&mut self, reader: &mut dyn ArchiveReader) -> Result<Advance, ArchiveError>;
}

/// A [`Data`] type with a static data class name.
pub trait DataKind: Data + Sized {
    /// The data class name.
    const DATA_CLASS: &'static str;

    /// Registers the data class, and the classes the value can hold, in `registry`.
    #[inline]
    fn register(registry: &mut TypeRegistry) {
        registry.register_data_class(Self::DATA_CLASS);
    }
}

// -----------------------------------------------------------------------------
// ArchiveWriter

/// The write side of an archive, as seen by a [`Data`] codec.
pub trait ArchiveWriter {
    /// Writes `text` as the element body.
    fn write_text(&mut self, text: &str) -> Result<(), ArchiveError>;

    /// Writes a nested object element, an empty `Type` for `None`.
    fn write_object(&mut self, object: Option<&dyn Object>) -> Result<(), ArchiveError>;

    /// Writes a nested struct element.
    fn write_struct(&mut self, value: &dyn Struct) -> Result<(), ArchiveError>;

    /// Writes the fields of `value` as children of the current element.
    fn write_fields(&mut self, value: &dyn Struct) -> Result<(), ArchiveError>;

    /// Writes a nested, unnamed element for `data`.
    fn write_data(&mut self, data: &dyn Data) -> Result<(), ArchiveError>;
}

// -----------------------------------------------------------------------------
// ArchiveReader

/// The read side of an archive, as seen by a [`Data`] codec.
///
/// Methods other than [`ArchiveReader::read_text`] walk the element under the
/// cursor, a codec calling them answers [`Advance::Consumed`].
pub trait ArchiveReader {
    /// Returns the file format version of the archive.
    fn version(&self) -> u32;

    /// Returns the innermost field frame, the owner class and field being read.
    fn field_context(&self) -> Option<&FieldFrame>;

    /// Returns the text of the element under the cursor.
    fn read_text(&self) -> Result<&str, ArchiveError>;

    /// Reads the single nested object element, `None` for a null reference.
    fn read_object(&mut self) -> Result<Option<Box<dyn Object>>, ArchiveError>;

    /// Reads the field children of the current element into `value`.
    fn read_fields(&mut self, value: &mut dyn Struct) -> Result<(), ArchiveError>;

    /// Reads every child of the current element into `sink`.
    fn read_array(&mut self, sink: &mut dyn ArraySink) -> Result<(), ArchiveError>;
}

// -----------------------------------------------------------------------------
// ArraySink

/// A growable container the array walk reads elements into.
///
/// The methods that are not overridden reject the element, which is then skipped
/// with a warning.
pub trait ArraySink {
    /// Takes a read object (`None` for a null reference).
    ///
    /// Returns `false` if the container does not hold objects.
    #[inline]
    fn push_object(&mut self, _object: Option<Box<dyn Object>>) -> bool {
        false
    }

    /// Appends a default value of struct `class` and returns it for reading.
    #[inline]
    fn allocate_struct(
        &mut self,
        _class: &'static Class,
        _context: Option<&FieldFrame>,
    ) -> Option<&mut dyn Struct> {
        None
    }

    /// Appends a default value of `data_class` and returns it for reading.
    #[inline]
    fn allocate_data(
        &mut self,
        _data_class: &str,
        _context: Option<&FieldFrame>,
    ) -> Option<&mut dyn Data> {
        None
    }
}

impl<T: ArrayItem> ArraySink for Vec<T> {
    #[inline]
    fn push_object(&mut self, object: Option<Box<dyn Object>>) -> bool {
        T::push_object(self, object)
    }

    #[inline]
    fn allocate_struct(
        &mut self,
        class: &'static Class,
        _context: Option<&FieldFrame>,
    ) -> Option<&mut dyn Struct> {
        T::allocate_struct(self, class)
    }

    #[inline]
    fn allocate_data(
        &mut self,
        data_class: &str,
        _context: Option<&FieldFrame>,
    ) -> Option<&mut dyn Data> {
        T::allocate_data(self, data_class)
    }
}
