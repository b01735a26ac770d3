use alloc::boxed::Box;
use core::any::Any;
use std::io::Write;

use quick_xml::escape::escape;

use crate::data::{ArchiveWriter, Data};
use crate::info::Field;
use crate::persist::status::StatusReporter;
use crate::persist::{ArchiveError, NAME_ATTRIBUTE, OBJECT_TAG, Outcome, ROOT_TAG};
use crate::persist::{TYPE_ATTRIBUTE, VERSION_ATTRIBUTE};
use crate::{Object, Struct};

const INDENT: &[u8] = b"  ";

// -----------------------------------------------------------------------------
// Serializer

/// The write engine.
///
/// Every element is written on its own line, indented two spaces per nesting
/// level. A compact element keeps its body on the same line.
pub(crate) struct Serializer<'w> {
    out: &'w mut dyn Write,
    depth: usize,
}

impl<'w> Serializer<'w> {
    pub fn new(out: &'w mut dyn Write) -> Self {
        Self { out, depth: 0 }
    }

    pub fn write_header(&mut self, version: u32) -> Result<(), ArchiveError> {
        writeln!(self.out, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        writeln!(self.out, "<{ROOT_TAG} {VERSION_ATTRIBUTE}=\"{version}\">")?;
        Ok(())
    }

    pub fn write_footer(&mut self) -> Result<(), ArchiveError> {
        writeln!(self.out, "</{ROOT_TAG}>")?;
        Ok(())
    }

    /// Writes the root objects, checking for an abort between them.
    pub fn serialize_array(
        &mut self,
        objects: &[Box<dyn Object>],
        reporter: &mut StatusReporter<'_, '_>,
    ) -> Result<Outcome, ArchiveError> {
        let count = objects.len();
        for (index, object) in objects.iter().enumerate() {
            self.serialize_instance(Some(&**object), None)?;
            if reporter.object_processed(index, count) {
                log::debug!("write cancelled after {} of {count} objects", index + 1);
                return Ok(Outcome::Cancelled);
            }
        }
        reporter.finished();
        Ok(Outcome::Complete)
    }

    fn indent(&mut self) -> Result<(), ArchiveError> {
        for _ in 0..self.depth {
            self.out.write_all(INDENT)?;
        }
        Ok(())
    }

    fn open_tag(&mut self, type_name: &str, name: Option<&str>) -> Result<(), ArchiveError> {
        self.indent()?;
        write!(self.out, "<{OBJECT_TAG} {TYPE_ATTRIBUTE}=\"")?;
        write_escaped(self.out, type_name)?;
        if let Some(name) = name {
            write!(self.out, "\" {NAME_ATTRIBUTE}=\"")?;
            write_escaped(self.out, name)?;
        }
        self.out.write_all(b"\">")?;
        Ok(())
    }

    fn close_tag(&mut self, compact: bool) -> Result<(), ArchiveError> {
        if !compact {
            self.indent()?;
        }
        writeln!(self.out, "</{OBJECT_TAG}>")?;
        Ok(())
    }

    // Writes one element, `body` fills it between the tags.
    fn element(
        &mut self,
        type_name: &str,
        name: Option<&str>,
        compact: bool,
        body: impl FnOnce(&mut Self) -> Result<(), ArchiveError>,
    ) -> Result<(), ArchiveError> {
        self.depth += 1;
        self.open_tag(type_name, name)?;
        if !compact {
            self.out.write_all(b"\n")?;
        }
        body(self)?;
        self.close_tag(compact)?;
        self.depth -= 1;
        Ok(())
    }

    /// Writes `object` as one element, an empty `Type` for `None`.
    pub fn serialize_instance(
        &mut self,
        object: Option<&dyn Object>,
        name: Option<&str>,
    ) -> Result<(), ArchiveError> {
        let Some(object) = object else {
            return self.element("", name, true, |_| Ok(()));
        };

        object.pre_serialize(None);
        let class = object.class();
        self.element(class.name(), name, object.is_compact(), |this| {
            match object.as_data() {
                Some(data) => data.serialize(this),
                None => this.serialize_object_fields(object),
            }
        })?;
        object.post_serialize(None);
        Ok(())
    }

    fn serialize_object_fields(&mut self, object: &dyn Object) -> Result<(), ArchiveError> {
        let owner: &dyn Any = object;
        for field in object.class().fields() {
            if !object.should_serialize(field) {
                continue;
            }
            let data = field_data(field, owner, object.class().name())?;
            object.pre_serialize(Some(field));
            self.serialize_data(data, Some(field.name()))?;
            object.post_serialize(Some(field));
        }
        Ok(())
    }

    fn serialize_struct_fields(&mut self, value: &dyn Struct) -> Result<(), ArchiveError> {
        let owner: &dyn Any = value;
        let class = value.class();
        for field in class.fields() {
            let data = field_data(field, owner, class.name())?;
            self.serialize_data(data, Some(field.name()))?;
        }
        Ok(())
    }

    fn serialize_data(&mut self, data: &dyn Data, name: Option<&str>) -> Result<(), ArchiveError> {
        self.element(data.data_class(), name, data.is_compact(), |this| {
            data.serialize(this)
        })
    }
}

fn field_data<'a>(
    field: &Field,
    owner: &'a dyn Any,
    owner_name: &'static str,
) -> Result<&'a dyn Data, ArchiveError> {
    field.get(owner).ok_or(ArchiveError::FieldAccess {
        owner: owner_name,
        field: field.name(),
    })
}

impl ArchiveWriter for Serializer<'_> {
    fn write_text(&mut self, text: &str) -> Result<(), ArchiveError> {
        self.out.write_all(b"<![CDATA[")?;
        let mut parts = text.split("]]>");
        if let Some(first) = parts.next() {
            self.out.write_all(first.as_bytes())?;
        }
        // `]]>` cannot appear in a section, it is split across two.
        for part in parts {
            self.out.write_all(b"]]]]><![CDATA[>")?;
            self.out.write_all(part.as_bytes())?;
        }
        self.out.write_all(b"]]>")?;
        Ok(())
    }

    #[inline]
    fn write_object(&mut self, object: Option<&dyn Object>) -> Result<(), ArchiveError> {
        self.serialize_instance(object, None)
    }

    fn write_struct(&mut self, value: &dyn Struct) -> Result<(), ArchiveError> {
        self.element(value.class().name(), None, false, |this| {
            this.serialize_struct_fields(value)
        })
    }

    #[inline]
    fn write_fields(&mut self, value: &dyn Struct) -> Result<(), ArchiveError> {
        self.serialize_struct_fields(value)
    }

    #[inline]
    fn write_data(&mut self, data: &dyn Data) -> Result<(), ArchiveError> {
        self.serialize_data(data, None)
    }
}

#[inline]
fn write_escaped(out: &mut dyn Write, text: &str) -> Result<(), ArchiveError> {
    out.write_all(escape(text).as_bytes())?;
    Ok(())
}

// -----------------------------------------------------------------------------
// Tests
