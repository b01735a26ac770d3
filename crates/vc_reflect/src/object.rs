use alloc::boxed::Box;
use alloc::string::String;
use core::any::Any;
use core::fmt;

use crate::data::Data;
use crate::fingerprint::Fingerprint;
use crate::info::{Class, DynamicClass, Field};

// -----------------------------------------------------------------------------
// Object

/// A polymorphic, reflectable value with serialization hooks.
///
/// Implement it after [`impl_reflect_object!`](crate::impl_reflect_object), every
/// method has a default.
///
/// The `pre_*`/`post_*` hooks bracket every reflected field (with `Some(field)`) and
/// the whole object body (with `None`). Hooks are not fallible: anything an
/// object needs to report afterwards belongs in its own state.
///
/// # Examples
///
/// ```
/// use vc_reflect::{Object, impl_reflect_object, info::Field};
///
/// #[derive(Default)]
/// struct Cache {
///     key: String,
///     dirty: bool,
/// }
///
/// impl_reflect_object!(Cache, "Cache", [key, dirty]);
///
/// impl Object for Cache {
///     fn should_serialize(&self, field: &Field) -> bool {
///         field.name() != "dirty"
///     }
///
///     fn post_deserialize(&mut self, field: Option<&Field>) {
///         if field.is_none() {
///             self.dirty = false;
///         }
///     }
/// }
/// ```
pub trait Object: DynamicClass + Any + Send + Sync {
    /// Returns `true` if the object is written on a single line.
    #[inline]
    fn is_compact(&self) -> bool {
        false
    }

    /// Returns `false` to leave `field` out of the written markup.
    #[inline]
    fn should_serialize(&self, _field: &Field) -> bool {
        true
    }

    /// Called before `field` (or the whole object, for `None`) is written.
    #[inline]
    fn pre_serialize(&self, _field: Option<&Field>) {}

    /// Called after `field` (or the whole object, for `None`) is written.
    #[inline]
    fn post_serialize(&self, _field: Option<&Field>) {}

    /// Called before `field` (or the whole object, for `None`) is read.
    #[inline]
    fn pre_deserialize(&mut self, _field: Option<&Field>) {}

    /// Called after `field` (or the whole object, for `None`) is read.
    #[inline]
    fn post_deserialize(&mut self, _field: Option<&Field>) {}

    /// Offered a value read for a field the class does not declare.
    ///
    /// `field` is the fingerprint of the element's `Name` attribute. Return `true`
    /// to claim the value, otherwise it is dropped and a warning is recorded.
    #[inline]
    fn process_unknown(&mut self, _value: UnknownValue, _field: Fingerprint) -> bool {
        false
    }

    /// Returns the leaf codec of an object that is written as data.
    ///
    /// An object that answers `Some` here has no field children: its body is
    /// whatever the codec writes.
    #[inline]
    fn as_data(&self) -> Option<&dyn Data> {
        None
    }

    /// Mutable counterpart of [`Object::as_data`].
    #[inline]
    fn as_data_mut(&mut self) -> Option<&mut dyn Data> {
        None
    }
}

impl dyn Object {
    /// Returns `true` if the concrete type is `T`.
    #[inline]
    pub fn is<T: Object>(&self) -> bool {
        let any: &dyn Any = self;
        any.is::<T>()
    }

    /// Returns `true` if the concrete type is described by `class`.
    #[inline]
    pub fn is_class(&self, class: &Class) -> bool {
        self.class().type_id() == class.type_id()
    }

    /// Downcasts to a concrete reference.
    #[inline]
    pub fn downcast_ref<T: Object>(&self) -> Option<&T> {
        let any: &dyn Any = self;
        any.downcast_ref()
    }

    /// Downcasts to a concrete mutable reference.
    #[inline]
    pub fn downcast_mut<T: Object>(&mut self) -> Option<&mut T> {
        let any: &mut dyn Any = self;
        any.downcast_mut()
    }

    /// Downcasts a boxed object, returning it unchanged on mismatch.
    pub fn downcast<T: Object>(self: Box<Self>) -> Result<Box<T>, Box<dyn Object>> {
        if self.is::<T>() {
            let any: Box<dyn Any> = self;
            // The type was checked above.
            Ok(any.downcast::<T>().unwrap_or_else(|_| unreachable!()))
        } else {
            Err(self)
        }
    }
}

impl fmt::Debug for dyn Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", self.class().name())
    }
}

// -----------------------------------------------------------------------------
// Struct

/// A value-like, reflectable aggregate.
///
/// Structs have no hooks and are never held by pointer in markup: a struct field
/// writes its members inline. Implemented by
/// [`impl_reflect_struct!`](crate::impl_reflect_struct).
pub trait Struct: DynamicClass + Any + Send + Sync {}

impl dyn Struct {
    /// Downcasts to a concrete reference.
    #[inline]
    pub fn downcast_ref<T: Struct>(&self) -> Option<&T> {
        let any: &dyn Any = self;
        any.downcast_ref()
    }

    /// Downcasts to a concrete mutable reference.
    #[inline]
    pub fn downcast_mut<T: Struct>(&mut self) -> Option<&mut T> {
        let any: &mut dyn Any = self;
        any.downcast_mut()
    }
}

impl fmt::Debug for dyn Struct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Struct({})", self.class().name())
    }
}

// -----------------------------------------------------------------------------
// UnknownValue

/// A value read for a field the owner class does not declare.
///
/// See [`Object::process_unknown`].
pub enum UnknownValue {
    /// The element held a registered object class.
    Object(Box<dyn Object>),
    /// The element held a registered struct class.
    Struct(Box<dyn Struct>),
    /// The element held a leaf data class, its text is kept unparsed.
    Text {
        /// The data class named by the `Type` attribute.
        data_class: &'static str,
        /// The element text.
        text: String,
    },
}

impl fmt::Debug for UnknownValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object(object) => f.debug_tuple("Object").field(object).finish(),
            Self::Struct(value) => f.debug_tuple("Struct").field(value).finish(),
            Self::Text { data_class, text } => f
                .debug_struct("Text")
                .field("data_class", data_class)
                .field("text", text)
                .finish(),
        }
    }
}
