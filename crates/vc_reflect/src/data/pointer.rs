use alloc::boxed::Box;

use crate::Object;
use crate::data::{Advance, ArchiveReader, ArchiveWriter, Data, DataKind};
use crate::persist::ArchiveError;

/// The data class of `Option<Box<dyn Object>>`.
pub const OBJECT_PTR_DATA_CLASS: &str = "ObjectPtr";

impl Data for Option<Box<dyn Object>> {
    #[inline]
    fn data_class(&self) -> &'static str {
        OBJECT_PTR_DATA_CLASS
    }

    #[inline]
    fn is_compact(&self) -> bool {
        false
    }

    #[inline]
    fn serialize(&self, writer: &mut dyn ArchiveWriter) -> Result<(), ArchiveError> {
        writer.write_object(self.as_deref())
    }

    fn deserialize(&mut self, reader: &mut dyn ArchiveReader) -> Result<Advance, ArchiveError> {
        *self = reader.read_object()?;
        Ok(Advance::Consumed)
    }
}

impl DataKind for Option<Box<dyn Object>> {
    const DATA_CLASS: &'static str = OBJECT_PTR_DATA_CLASS;
}
