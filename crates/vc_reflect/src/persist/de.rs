use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::vec::Vec;
use core::any::Any;

use crate::data::{Advance, ArchiveReader, ArraySink, Data};
use crate::fingerprint::Fingerprint;
use crate::info::{Class, Field};
use crate::persist::field_stack::{FieldContextStack, FieldFrame};
use crate::persist::markup::{Cursor, Document, Element, ElementId};
use crate::persist::status::StatusReporter;
use crate::persist::{ArchiveError, ArchiveWarning, NAME_ATTRIBUTE, Outcome, TYPE_ATTRIBUTE};
use crate::registry::{Registration, TypeRegistry};
use crate::{Object, Struct, UnknownValue};

// -----------------------------------------------------------------------------
// ReadState

/// The walk state of a read, kept between pull calls.
#[derive(Debug, Default)]
pub(crate) struct ReadState {
    pub cursor: Cursor,
    pub stack: FieldContextStack,
    pub found: bool,
    pub warnings: Vec<ArchiveWarning>,
}

impl ReadState {
    pub fn new(at: Option<ElementId>) -> Self {
        Self {
            cursor: Cursor::new(at),
            ..Self::default()
        }
    }
}

// -----------------------------------------------------------------------------
// Helpers

enum Allocation {
    /// An empty `Type`, the subtree was skipped.
    Null,
    /// An unregistered `Type`, the subtree was skipped.
    Skipped,
    Object(Box<dyn Object>),
    Struct(&'static Class),
    Data(&'static str),
}

/// The value of an undeclared field.
enum Scratch {
    Value(UnknownValue),
    /// Null, or nothing could be constructed.
    Empty,
    /// An unregistered `Type`, already reported as [`ArchiveWarning::Unallocated`].
    Unallocated,
}

enum Owner<'o> {
    Object(&'o mut dyn Object),
    Struct(&'o mut dyn Struct),
}

impl Owner<'_> {
    fn class(&self) -> &'static Class {
        match self {
            Self::Object(object) => object.class(),
            Self::Struct(value) => value.class(),
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        match self {
            Self::Object(object) => &mut **object,
            Self::Struct(value) => &mut **value,
        }
    }

    fn pre_deserialize(&mut self, field: Option<&Field>) {
        if let Self::Object(object) = self {
            object.pre_deserialize(field);
        }
    }

    fn post_deserialize(&mut self, field: Option<&Field>) {
        if let Self::Object(object) = self {
            object.post_deserialize(field);
        }
    }

    fn process_unknown(&mut self, value: UnknownValue, field: Fingerprint) -> bool {
        match self {
            Self::Object(object) => object.process_unknown(value, field),
            Self::Struct(_) => false,
        }
    }
}

// -----------------------------------------------------------------------------
// Deserializer

/// The read engine, walking a parsed [`Document`] with the cursor of a [`ReadState`].
///
/// Every method starts with the cursor on the element it reads and leaves it on
/// the element that follows that element's subtree.
pub(crate) struct Deserializer<'a> {
    document: &'a Document,
    registry: &'a TypeRegistry,
    state: &'a mut ReadState,
    search_class: Option<&'static Class>,
    version: u32,
}

impl<'a> Deserializer<'a> {
    pub fn new(
        document: &'a Document,
        registry: &'a TypeRegistry,
        state: &'a mut ReadState,
        search_class: Option<&'static Class>,
        version: u32,
    ) -> Self {
        Self {
            document,
            registry,
            state,
            search_class,
            version,
        }
    }

    fn current(&self) -> Result<(ElementId, &'a Element), ArchiveError> {
        let document = self.document;
        let id = self
            .state
            .cursor
            .current()
            .ok_or(ArchiveError::UnexpectedEnd)?;
        Ok((id, &document[id]))
    }

    #[inline]
    fn advance(&mut self, skip_children: bool) {
        self.state.cursor.advance(self.document, skip_children);
    }

    // Moves the cursor past the subtree of `id`, whatever a codec did with it.
    fn resync_past(&mut self, id: ElementId) {
        let expected = self.document.skip_subtree(id);
        if self.state.cursor.current() != expected {
            log::debug!(
                "cursor re-synchronized past `{}`",
                self.document[id].attribute(TYPE_ATTRIBUTE).unwrap_or_default(),
            );
            self.state.cursor.set_current(expected);
        }
    }

    fn warn(&mut self, warning: ArchiveWarning) {
        log::warn!("{warning}");
        self.state.warnings.push(warning);
    }

    fn reject(&mut self, type_name: &'static str) {
        self.warn(ArchiveWarning::Rejected { type_name });
        self.advance(true);
    }

    fn allocate(&mut self) -> Result<Allocation, ArchiveError> {
        let (_, element) = self.current()?;
        let type_name = element.attribute(TYPE_ATTRIBUTE).unwrap_or_default();
        if type_name.is_empty() {
            self.advance(true);
            return Ok(Allocation::Null);
        }

        let Some(registration) = self.registry.resolve(type_name) else {
            self.warn(ArchiveWarning::Unallocated {
                type_name: type_name.to_string(),
            });
            self.advance(true);
            return Ok(Allocation::Skipped);
        };

        Ok(match registration {
            Registration::Class(class) => match class.construct_object() {
                Some(object) => Allocation::Object(object),
                None => Allocation::Struct(class),
            },
            Registration::Data(name) => Allocation::Data(name),
        })
    }

    // -------------------------------------------------------------------------
    // Objects

    /// Reads the object element under the cursor into `existing`, or into a newly
    /// constructed instance of its `Type`.
    ///
    /// Returns `None` for a null reference and for an element that could not be
    /// allocated.
    pub fn deserialize_instance(
        &mut self,
        existing: Option<Box<dyn Object>>,
    ) -> Result<Option<Box<dyn Object>>, ArchiveError> {
        let mut object = match existing {
            Some(object) => object,
            None => match self.allocate()? {
                Allocation::Object(object) => object,
                Allocation::Null | Allocation::Skipped => return Ok(None),
                Allocation::Struct(class) => {
                    self.reject(class.name());
                    return Ok(None);
                }
                Allocation::Data(name) => {
                    self.reject(name);
                    return Ok(None);
                }
            },
        };

        log::trace!("reading object `{}`", object.class().name());
        object.pre_deserialize(None);
        match object.as_data_mut() {
            Some(data) => self.deserialize_data(data)?,
            None => self.deserialize_fields(Owner::Object(&mut *object))?,
        }
        object.post_deserialize(None);
        Ok(Some(object))
    }

    fn deserialize_data(&mut self, data: &mut dyn Data) -> Result<(), ArchiveError> {
        if data.deserialize(self)? == Advance::Pending {
            self.advance(true);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Fields

    fn deserialize_fields(&mut self, mut owner: Owner<'_>) -> Result<(), ArchiveError> {
        let (id, element) = self.current()?;
        self.advance(false);
        if !element.has_children() {
            return Ok(());
        }

        let class = owner.class();
        self.state.stack.push(class);
        let result = self.walk_fields(&mut owner, class);
        self.state.stack.pop();
        result?;

        self.resync_past(id);
        Ok(())
    }

    fn walk_fields(&mut self, owner: &mut Owner<'_>, class: &'static Class) -> Result<(), ArchiveError> {
        let document = self.document;
        let mut sibling = self.state.cursor.current();
        while let Some(id) = sibling {
            let element = &document[id];
            let name = element.attribute(NAME_ATTRIBUTE).unwrap_or_default();
            let field = class.field(name);
            self.state.stack.set_field(field);

            match field {
                Some(field) => self.deserialize_field(owner, class, field)?,
                None => self.deserialize_unknown(owner, class, name)?,
            }

            self.resync_past(id);
            sibling = element.next_sibling();
        }
        Ok(())
    }

    fn deserialize_field(
        &mut self,
        owner: &mut Owner<'_>,
        class: &'static Class,
        field: &'static Field,
    ) -> Result<(), ArchiveError> {
        let (_, element) = self.current()?;
        let type_name = element.attribute(TYPE_ATTRIBUTE).unwrap_or_default();
        let Some(data_class) = self.registry.resolve(type_name).and_then(|r| r.data_class()) else {
            return Err(ArchiveError::TypeInformation {
                owner: class.name(),
                field: field.name(),
                data_class: type_name.to_string(),
            });
        };

        if data_class != field.data_class() {
            self.warn(ArchiveWarning::DataClassMismatch {
                owner: class.name(),
                field: field.name(),
                expected: field.data_class(),
                found: data_class,
            });
            self.advance(true);
            return Ok(());
        }

        log::trace!("reading field `{}::{}`", class.name(), field.name());
        owner.pre_deserialize(Some(field));
        let Some(data) = field.get_mut(owner.as_any_mut()) else {
            return Err(ArchiveError::FieldAccess {
                owner: class.name(),
                field: field.name(),
            });
        };
        self.deserialize_data(data)?;
        owner.post_deserialize(Some(field));
        Ok(())
    }

    fn deserialize_unknown(
        &mut self,
        owner: &mut Owner<'_>,
        class: &'static Class,
        name: &str,
    ) -> Result<(), ArchiveError> {
        log::debug!("`{}` has no field `{name}`", class.name());
        match self.read_scratch() {
            Ok(Scratch::Value(value)) => {
                if !owner.process_unknown(value, Fingerprint::of(name)) {
                    self.warn(ArchiveWarning::UnknownField {
                        owner: class.name(),
                        field: name.to_string(),
                    });
                }
            }
            Ok(Scratch::Empty) => self.warn(ArchiveWarning::UnknownField {
                owner: class.name(),
                field: name.to_string(),
            }),
            Ok(Scratch::Unallocated) => {}
            Err(error) if error.is_recoverable() => self.warn(ArchiveWarning::DiscardedField {
                owner: class.name(),
                field: name.to_string(),
                reason: error.to_string(),
            }),
            Err(error) => return Err(error),
        }
        Ok(())
    }

    // Reconstructs an undeclared field value as far as the registry allows.
    fn read_scratch(&mut self) -> Result<Scratch, ArchiveError> {
        Ok(match self.allocate()? {
            Allocation::Null => Scratch::Empty,
            Allocation::Skipped => Scratch::Unallocated,
            Allocation::Object(object) => match self.deserialize_instance(Some(object))? {
                Some(object) => Scratch::Value(UnknownValue::Object(object)),
                None => Scratch::Empty,
            },
            Allocation::Struct(class) => match class.construct_struct() {
                Some(mut value) => {
                    self.deserialize_fields(Owner::Struct(&mut *value))?;
                    Scratch::Value(UnknownValue::Struct(value))
                }
                None => {
                    self.advance(true);
                    Scratch::Empty
                }
            },
            Allocation::Data(data_class) => {
                let (_, element) = self.current()?;
                self.advance(true);
                Scratch::Value(UnknownValue::Text {
                    data_class,
                    text: element.body().to_string(),
                })
            }
        })
    }

    // -------------------------------------------------------------------------
    // Arrays

    /// Reads every child of the element under the cursor into `sink`.
    ///
    /// With a `reporter`, a status event is raised per element and an abort request
    /// stops the walk between elements.
    pub fn deserialize_array(
        &mut self,
        sink: &mut dyn ArraySink,
        mut reporter: Option<&mut StatusReporter<'_, '_>>,
    ) -> Result<Outcome, ArchiveError> {
        let document = self.document;
        let (id, element) = self.current()?;
        let count = element.child_count();
        let context = self.state.stack.top().copied();
        self.advance(false);

        for (index, (child, _)) in document.children(id).enumerate() {
            self.state.cursor.set_current(Some(child));
            self.deserialize_element(sink, context.as_ref())?;
            self.resync_past(child);

            if let Some(reporter) = reporter.as_deref_mut()
                && reporter.object_processed(index, count)
            {
                log::debug!("read cancelled after {} of {count} elements", index + 1);
                return Ok(Outcome::Cancelled);
            }
        }

        if let Some(reporter) = reporter {
            reporter.finished();
        }
        Ok(Outcome::Complete)
    }

    fn deserialize_element(
        &mut self,
        sink: &mut dyn ArraySink,
        context: Option<&FieldFrame>,
    ) -> Result<(), ArchiveError> {
        match self.allocate()? {
            Allocation::Skipped => {}
            Allocation::Null => {
                if !sink.push_object(None) {
                    log::trace!("null element dropped");
                }
            }
            Allocation::Object(object) => {
                if let Some(object) = self.deserialize_instance(Some(object))? {
                    self.note_found(&*object);
                    let type_name = object.class().name();
                    if !sink.push_object(Some(object)) {
                        self.warn(ArchiveWarning::Rejected { type_name });
                    }
                }
            }
            Allocation::Struct(class) => match sink.allocate_struct(class, context) {
                Some(value) => self.deserialize_fields(Owner::Struct(value))?,
                None => self.reject(class.name()),
            },
            Allocation::Data(name) => match sink.allocate_data(name, context) {
                Some(data) => self.deserialize_data(data)?,
                None => self.reject(name),
            },
        }
        Ok(())
    }

    fn note_found(&mut self, object: &dyn Object) {
        if self.search_class.is_some_and(|class| object.is_class(class)) {
            self.state.found = true;
        }
    }

    // -------------------------------------------------------------------------
    // Pull reading

    /// Steps into the root element, returns `true` if it has children.
    pub fn begin_reading(&mut self) -> Result<bool, ArchiveError> {
        let (_, element) = self.current()?;
        self.advance(false);
        Ok(element.has_children())
    }

    /// Reads the root child under the cursor, returns whether another one follows.
    pub fn read_single(&mut self) -> Result<(Option<Box<dyn Object>>, bool), ArchiveError> {
        let (id, element) = self.current()?;
        let has_more = element.next_sibling().is_some();
        let object = self.deserialize_instance(None)?;
        self.resync_past(id);
        if let Some(object) = &object {
            self.note_found(&**object);
        }
        Ok((object, has_more))
    }
}

impl ArchiveReader for Deserializer<'_> {
    #[inline]
    fn version(&self) -> u32 {
        self.version
    }

    #[inline]
    fn field_context(&self) -> Option<&FieldFrame> {
        self.state.stack.top()
    }

    fn read_text(&self) -> Result<&str, ArchiveError> {
        let (_, element) = self.current()?;
        Ok(element.body())
    }

    fn read_object(&mut self) -> Result<Option<Box<dyn Object>>, ArchiveError> {
        let (id, element) = self.current()?;
        self.advance(false);
        if !element.has_children() {
            return Ok(None);
        }
        if element.child_count() > 1 {
            log::debug!("reference holds {} elements, reading the first", element.child_count());
        }
        let object = self.deserialize_instance(None)?;
        self.resync_past(id);
        Ok(object)
    }

    #[inline]
    fn read_fields(&mut self, value: &mut dyn Struct) -> Result<(), ArchiveError> {
        self.deserialize_fields(Owner::Struct(value))
    }

    #[inline]
    fn read_array(&mut self, sink: &mut dyn ArraySink) -> Result<(), ArchiveError> {
        self.deserialize_array(sink, None).map(|_| ())
    }
}
