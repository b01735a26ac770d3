use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;

use crate::fingerprint::{Fingerprint, FingerprintMap, fingerprint_map};
use crate::info::Field;
use crate::{Object, Struct};

// -----------------------------------------------------------------------------
// ClassKind

/// The kind of a [`Class`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// A polymorphic, heap-allocated [`Object`] with lifecycle hooks.
    Object,
    /// A value-like [`Struct`] without identity or hooks.
    Struct,
}

#[derive(Clone, Copy)]
enum Constructor {
    Object(fn() -> Box<dyn Object>),
    Struct(fn() -> Box<dyn Struct>),
}

fn construct_object<T: Object + Default>() -> Box<dyn Object> {
    Box::new(T::default())
}

fn construct_struct<T: Struct + Default>() -> Box<dyn Struct> {
    Box::new(T::default())
}

// -----------------------------------------------------------------------------
// Class

/// The runtime description of one reflected type.
///
/// A class is built once per type (see [`Typed`](crate::info::Typed)) and lives for
/// the rest of the program. Fields keep their declaration order, which is also the
/// order they are written in.
///
/// # Examples
///
/// ```
/// use vc_reflect::{Object, impl_reflect_object, info::{ClassKind, Typed}};
///
/// #[derive(Default)]
/// struct Door {
///     open: bool,
///     width: f32,
/// }
///
/// impl_reflect_object!(Door, "Door", [open, width]);
/// impl Object for Door {}
///
/// let class = Door::static_class();
/// assert_eq!(class.kind(), ClassKind::Object);
/// assert_eq!(class.field("width").map(|f| f.index()), Some(1));
/// assert!(class.field("height").is_none());
///
/// let door = class.construct_object().unwrap();
/// assert!(door.is::<Door>());
/// ```
pub struct Class {
    name: &'static str,
    fingerprint: Fingerprint,
    type_id: TypeId,
    constructor: Constructor,
    fields: Vec<Field>,
    field_table: FingerprintMap<usize>,
}

impl Class {
    fn with_constructor(name: &'static str, type_id: TypeId, constructor: Constructor) -> Self {
        Self {
            name,
            fingerprint: Fingerprint::of(name),
            type_id,
            constructor,
            fields: Vec::new(),
            field_table: fingerprint_map(),
        }
    }

    /// Creates the class of an [`Object`] type.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty, the empty name is reserved for null references.
    pub fn object<T: Object + Default>(name: &'static str) -> Self {
        assert!(!name.is_empty(), "class name cannot be empty");
        Self::with_constructor(
            name,
            TypeId::of::<T>(),
            Constructor::Object(construct_object::<T>),
        )
    }

    /// Creates the class of a [`Struct`] type.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty, the empty name is reserved for null references.
    pub fn structure<T: Struct + Default>(name: &'static str) -> Self {
        assert!(!name.is_empty(), "class name cannot be empty");
        Self::with_constructor(
            name,
            TypeId::of::<T>(),
            Constructor::Struct(construct_struct::<T>),
        )
    }

    /// Appends a field.
    ///
    /// # Panics
    ///
    /// - The field was created for another owner type.
    /// - A field with the same name, or the same name fingerprint, already exists.
    pub fn with_field(mut self, mut field: Field) -> Self {
        assert!(
            field.owner_type_id() == self.type_id,
            "field `{}` does not belong to class `{}`",
            field.name(),
            self.name,
        );
        let index = self.fields.len();
        if let Some(old) = self.field_table.insert(field.fingerprint(), index) {
            panic!(
                "field `{}` of class `{}` collides with field `{}`",
                field.name(),
                self.name,
                self.fields[old].name(),
            );
        }
        field.set_index(index);
        self.fields.push(field);
        self
    }

    /// Returns the registered class name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the fingerprint of the class name.
    #[inline]
    pub const fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Returns the `TypeId` of the described type.
    #[inline]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns `true` if this class describes `T`.
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Returns the class kind.
    #[inline]
    pub const fn kind(&self) -> ClassKind {
        match self.constructor {
            Constructor::Object(_) => ClassKind::Object,
            Constructor::Struct(_) => ClassKind::Struct,
        }
    }

    /// Returns `true` for [`ClassKind::Object`].
    #[inline]
    pub const fn is_object(&self) -> bool {
        matches!(self.constructor, Constructor::Object(_))
    }

    /// Returns `true` for [`ClassKind::Struct`].
    #[inline]
    pub const fn is_struct(&self) -> bool {
        matches!(self.constructor, Constructor::Struct(_))
    }

    /// Returns the fields in declaration order.
    #[inline]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the field at `index`.
    #[inline]
    pub fn field_at(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Finds a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        let field = self.field_by_fingerprint(Fingerprint::of(name))?;
        (field.name() == name).then_some(field)
    }

    /// Finds a field by the fingerprint of its name.
    ///
    /// Unlike [`Class::field`], the literal name cannot be verified here.
    #[inline]
    pub fn field_by_fingerprint(&self, fingerprint: Fingerprint) -> Option<&Field> {
        let index = *self.field_table.get(&fingerprint)?;
        self.fields.get(index)
    }

    /// Constructs a default instance, `None` for struct classes.
    #[inline]
    pub fn construct_object(&self) -> Option<Box<dyn Object>> {
        match self.constructor {
            Constructor::Object(construct) => Some(construct()),
            Constructor::Struct(_) => None,
        }
    }

    /// Constructs a default value, `None` for object classes.
    #[inline]
    pub fn construct_struct(&self) -> Option<Box<dyn Struct>> {
        match self.constructor {
            Constructor::Struct(construct) => Some(construct()),
            Constructor::Object(_) => None,
        }
    }
}

impl PartialEq for Class {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for Class {}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("fields", &self.fields)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
