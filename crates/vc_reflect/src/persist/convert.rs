use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use std::io::{self, Cursor};

use crate::Object;
use crate::info::{Class, Typed};
use crate::persist::{Archive, ArchiveError, Outcome};
use crate::registry::TypeRegistry;

/// Writes `object` as a whole archive into a `String`.
///
/// # Examples
///
/// ```
/// use vc_reflect::{Object, impl_reflect_object, persist};
///
/// #[derive(Default)]
/// struct Tag {
///     id: u32,
/// }
///
/// impl_reflect_object!(Tag, "Tag", [id]);
/// impl Object for Tag {}
///
/// let text = persist::to_string(&Tag { id: 7 }).unwrap();
/// assert!(text.contains("<Object Type=\"u32\" Name=\"id\"><![CDATA[7]]></Object>"));
/// ```
pub fn to_string(object: &dyn Object) -> Result<String, ArchiveError> {
    let mut archive = Archive::writer(Vec::new());
    archive.write_file_header()?;
    archive.write_single_object(object)?;
    archive.write_file_footer()?;
    into_string(archive.into_inner())
}

/// Writes `objects` as a whole archive into a `String`.
///
/// A cancelled write yields an empty string rather than an unterminated archive.
pub fn objects_to_string(objects: &[Box<dyn Object>]) -> Result<String, ArchiveError> {
    let mut archive = Archive::writer(Vec::new());
    match archive.write_objects(objects)? {
        Outcome::Complete => into_string(archive.into_inner()),
        Outcome::Cancelled => Ok(String::new()),
    }
}

fn into_string(bytes: Vec<u8>) -> Result<String, ArchiveError> {
    String::from_utf8(bytes).map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error).into())
}

/// Reads the first root object of `search_class` from `text`.
///
/// Without a search class, the first root object that could be read is returned.
/// Root objects are read one by one, reading stops at the match.
pub fn from_str(
    text: &str,
    registry: &TypeRegistry,
    search_class: Option<&'static Class>,
) -> Result<Option<Box<dyn Object>>, ArchiveError> {
    let mut archive = Archive::reader(Cursor::new(text.as_bytes()), registry);
    archive.set_search_class(search_class);
    if !archive.begin_reading_single_objects()? {
        return Ok(None);
    }

    loop {
        let (object, has_more) = archive.read_single_object()?;
        if let Some(object) = object
            && search_class.is_none_or(|class| object.is_class(class))
        {
            return Ok(Some(object));
        }
        if !has_more {
            return Ok(None);
        }
    }
}

/// Reads the first root object of type `T` from `text`.
///
/// # Examples
///
/// ```
/// use vc_reflect::{Object, impl_reflect_object, persist, registry::TypeRegistry};
///
/// #[derive(Default)]
/// struct Marker {
///     label: String,
/// }
///
/// impl_reflect_object!(Marker, "Marker", [label]);
/// impl Object for Marker {}
///
/// let mut registry = TypeRegistry::new();
/// registry.register::<Marker>();
///
/// let text = persist::to_string(&Marker { label: "start".into() }).unwrap();
/// let marker = persist::from_str_as::<Marker>(&text, &registry).unwrap().unwrap();
/// assert_eq!(marker.label, "start");
/// ```
pub fn from_str_as<T: Object + Typed>(
    text: &str,
    registry: &TypeRegistry,
) -> Result<Option<Box<T>>, ArchiveError> {
    let object = from_str(text, registry, Some(T::static_class()))?;
    Ok(object.and_then(|object| object.downcast::<T>().ok()))
}

/// Reads every root object of `text`.
///
/// Warnings are logged and otherwise dropped, use an [`Archive`] to inspect them.
pub fn objects_from_str(text: &str, registry: &TypeRegistry) -> Result<Vec<Box<dyn Object>>, ArchiveError> {
    let mut archive = Archive::reader(Cursor::new(text.as_bytes()), registry);
    match archive.read()? {
        Outcome::Complete => Ok(archive.take_objects()),
        Outcome::Cancelled => Ok(Vec::new()),
    }
}
