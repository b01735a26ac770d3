use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::TypeId;

use crate::data::{Advance, ArchiveReader, ArchiveWriter, Data, DataKind};
use crate::info::{Class, Typed};
use crate::persist::ArchiveError;
use crate::registry::TypeRegistry;
use crate::{Object, Struct};

/// The data class of `Vec<T>`.
pub const ARRAY_DATA_CLASS: &str = "Array";

// -----------------------------------------------------------------------------
// ArrayItem

/// An element type of a reflected `Vec<T>`.
///
/// Implemented for the leaf codecs, for reflected structs, for `Box<dyn Object>`
/// (nulls are dropped on read) and for `Option<Box<dyn Object>>` (nulls are kept).
pub trait ArrayItem: Send + Sync + Sized + 'static {
    /// Writes one item as a nested element.
    fn write_item(&self, writer: &mut dyn ArchiveWriter) -> Result<(), ArchiveError>;

    /// Appends a read object, returns `false` if the item type does not take it.
    #[inline]
    fn push_object(_items: &mut Vec<Self>, _object: Option<Box<dyn Object>>) -> bool {
        false
    }

    /// Appends a default struct of `class` and returns it for reading.
    #[inline]
    fn allocate_struct<'a>(
        _items: &'a mut Vec<Self>,
        _class: &'static Class,
    ) -> Option<&'a mut dyn Struct> {
        None
    }

    /// Appends a default value of `data_class` and returns it for reading.
    #[inline]
    fn allocate_data<'a>(_items: &'a mut Vec<Self>, _data_class: &str) -> Option<&'a mut dyn Data> {
        None
    }

    /// Registers the classes an item can hold.
    #[inline]
    fn register_item(_registry: &mut TypeRegistry) {}
}

pub(super) fn allocate_default<'a, T>(items: &'a mut Vec<T>, data_class: &str) -> Option<&'a mut dyn Data>
where
    T: ArrayItem + DataKind + Default,
{
    if data_class != T::DATA_CLASS {
        return None;
    }
    items.push(T::default());
    items.last_mut().map(|item| item as &mut dyn Data)
}

#[doc(hidden)]
pub fn allocate_struct_item<'a, T>(items: &'a mut Vec<T>, class: &'static Class) -> Option<&'a mut dyn Struct>
where
    T: ArrayItem + Struct + Typed + Default,
{
    if class.type_id() != TypeId::of::<T>() {
        return None;
    }
    items.push(T::default());
    items.last_mut().map(|item| item as &mut dyn Struct)
}

impl ArrayItem for Box<dyn Object> {
    #[inline]
    fn write_item(&self, writer: &mut dyn ArchiveWriter) -> Result<(), ArchiveError> {
        writer.write_object(Some(&**self))
    }

    #[inline]
    fn push_object(items: &mut Vec<Self>, object: Option<Box<dyn Object>>) -> bool {
        match object {
            Some(object) => {
                items.push(object);
                true
            }
            None => false,
        }
    }
}

impl ArrayItem for Option<Box<dyn Object>> {
    #[inline]
    fn write_item(&self, writer: &mut dyn ArchiveWriter) -> Result<(), ArchiveError> {
        writer.write_object(self.as_deref())
    }

    #[inline]
    fn push_object(items: &mut Vec<Self>, object: Option<Box<dyn Object>>) -> bool {
        items.push(object);
        true
    }
}

// -----------------------------------------------------------------------------
// Vec

impl<T: ArrayItem> Data for Vec<T> {
    #[inline]
    fn data_class(&self) -> &'static str {
        ARRAY_DATA_CLASS
    }

    #[inline]
    fn is_compact(&self) -> bool {
        false
    }

    fn serialize(&self, writer: &mut dyn ArchiveWriter) -> Result<(), ArchiveError> {
        for item in self {
            item.write_item(writer)?;
        }
        Ok(())
    }

    fn deserialize(&mut self, reader: &mut dyn ArchiveReader) -> Result<Advance, ArchiveError> {
        self.clear();
        reader.read_array(self)?;
        Ok(Advance::Consumed)
    }
}

impl<T: ArrayItem> DataKind for Vec<T> {
    const DATA_CLASS: &'static str = ARRAY_DATA_CLASS;

    fn register(registry: &mut TypeRegistry) {
        registry.register_data_class(ARRAY_DATA_CLASS);
        T::register_item(registry);
    }
}
