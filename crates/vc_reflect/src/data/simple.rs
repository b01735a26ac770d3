use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::data::{Advance, ArchiveReader, ArchiveWriter, ArrayItem, Data, DataKind};
use crate::persist::ArchiveError;

/// The data classes of the built-in leaf codecs.
pub const SIMPLE_DATA_CLASSES: &[&str] = &[
    "bool", "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32", "i64", "i128",
    "isize", "f32", "f64", "char", "String",
];

// Leaf codecs for `Display + FromStr` values.
//
// Numbers and `bool` tolerate surrounding whitespace, `char` does not (a space is a
// valid value) and `String` keeps its text untouched.
macro_rules! impl_simple_data {
    ($trim:expr => $($ty:ty),* $(,)?) => {$(
        impl Data for $ty {
            #[inline]
            fn data_class(&self) -> &'static str {
                <Self as DataKind>::DATA_CLASS
            }

            fn serialize(&self, writer: &mut dyn ArchiveWriter) -> Result<(), ArchiveError> {
                writer.write_text(&self.to_string())
            }

            fn deserialize(&mut self, reader: &mut dyn ArchiveReader) -> Result<Advance, ArchiveError> {
                let text = reader.read_text()?;
                let source = if $trim { text.trim() } else { text };
                *self = source.parse::<$ty>().map_err(|e| {
                    ArchiveError::data(<Self as DataKind>::DATA_CLASS, text, e)
                })?;
                Ok(Advance::Pending)
            }
        }

        impl DataKind for $ty {
            const DATA_CLASS: &'static str = stringify!($ty);
        }

        impl ArrayItem for $ty {
            #[inline]
            fn write_item(&self, writer: &mut dyn ArchiveWriter) -> Result<(), ArchiveError> {
                writer.write_data(self)
            }

            #[inline]
            fn allocate_data<'a>(items: &'a mut Vec<Self>, data_class: &str) -> Option<&'a mut dyn Data> {
                super::array::allocate_default(items, data_class)
            }

            #[inline]
            fn register_item(registry: &mut crate::registry::TypeRegistry) {
                <Self as DataKind>::register(registry);
            }
        }
    )*};
}

impl_simple_data!(true => bool, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);
impl_simple_data!(false => char);

impl Data for String {
    #[inline]
    fn data_class(&self) -> &'static str {
        <Self as DataKind>::DATA_CLASS
    }

    #[inline]
    fn serialize(&self, writer: &mut dyn ArchiveWriter) -> Result<(), ArchiveError> {
        writer.write_text(self)
    }

    fn deserialize(&mut self, reader: &mut dyn ArchiveReader) -> Result<Advance, ArchiveError> {
        let text = reader.read_text()?;
        self.clear();
        self.push_str(text);
        Ok(Advance::Pending)
    }
}

impl DataKind for String {
    const DATA_CLASS: &'static str = "String";
}

impl ArrayItem for String {
    #[inline]
    fn write_item(&self, writer: &mut dyn ArchiveWriter) -> Result<(), ArchiveError> {
        writer.write_data(self)
    }

    #[inline]
    fn allocate_data<'a>(items: &'a mut Vec<Self>, data_class: &str) -> Option<&'a mut dyn Data> {
        super::array::allocate_default(items, data_class)
    }

    #[inline]
    fn register_item(registry: &mut crate::registry::TypeRegistry) {
        <Self as DataKind>::register(registry);
    }
}

// -----------------------------------------------------------------------------
// Tests
