use alloc::boxed::Box;
use core::any::TypeId;

use foldhash::fast::FixedState;
use hashbrown::HashSet;
use thiserror::Error;

use crate::Object;
use crate::data::{ARRAY_DATA_CLASS, OBJECT_PTR_DATA_CLASS, SIMPLE_DATA_CLASSES};
use crate::fingerprint::{Fingerprint, FingerprintMap, fingerprint_map};
use crate::info::{Class, Typed};

const TYPE_ID_STATE: FixedState = FixedState::with_seed(0x95EE_04C4_F326_B271);

// -----------------------------------------------------------------------------
// Registration

/// What a registered name resolves to.
#[derive(Debug, Clone, Copy)]
pub enum Registration {
    /// An object or struct class.
    Class(&'static Class),
    /// A leaf data class, such as `u32` or `Array`.
    Data(&'static str),
}

impl Registration {
    /// Returns the registered name.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Class(class) => class.name(),
            Self::Data(name) => name,
        }
    }

    /// Returns the class, `None` for leaf data classes.
    #[inline]
    pub fn as_class(&self) -> Option<&'static Class> {
        match self {
            Self::Class(class) => Some(class),
            Self::Data(_) => None,
        }
    }

    /// Returns the name this registration has as a field data class.
    ///
    /// Struct classes and leaf data classes can be field values, object classes
    /// cannot (an object field is an `ObjectPtr`).
    #[inline]
    pub fn data_class(&self) -> Option<&'static str> {
        match self {
            Self::Class(class) if class.is_struct() => Some(class.name()),
            Self::Class(_) => None,
            Self::Data(name) => Some(name),
        }
    }
}

// -----------------------------------------------------------------------------
// RegistryError

/// An error raised while registering a name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    /// Two distinct names share a fingerprint.
    #[error("`{name}` collides with the registered name `{existing}` ({fingerprint:?})")]
    FingerprintCollision {
        name: &'static str,
        existing: &'static str,
        fingerprint: Fingerprint,
    },
    /// The name is already registered for another class or data class.
    #[error("`{name}` is already registered for another type")]
    DuplicateName { name: &'static str },
}

// -----------------------------------------------------------------------------
// TypeRegistry

/// A registry of reflected classes and data classes.
///
/// Reading an archive resolves every `Type` attribute through this registry: an
/// unknown name means the element cannot be reconstructed and is skipped.
///
/// Lookups go through the [`Fingerprint`] of the name and then confirm the literal
/// name, so a collision is reported instead of resolving to the wrong class.
///
/// The registry is read-only while archives use it and can be shared by reference
/// across threads.
///
/// # Examples
///
/// ```
/// use vc_reflect::{Object, impl_reflect_object, impl_reflect_struct};
/// use vc_reflect::registry::TypeRegistry;
///
/// #[derive(Default)]
/// struct Size {
///     w: u32,
///     h: u32,
/// }
///
/// impl_reflect_struct!(Size, "Size", [w, h]);
///
/// #[derive(Default)]
/// struct Window {
///     title: String,
///     size: Size,
/// }
///
/// impl_reflect_object!(Window, "Window", [title, size]);
/// impl Object for Window {}
///
/// let mut registry = TypeRegistry::new();
/// registry.register::<Window>();
///
/// // The main class
/// assert!(registry.get_class("Window").is_some());
/// // Its field dependencies
/// assert!(registry.get_class("Size").is_some());
///
/// let window = registry.construct("Window").unwrap();
/// assert!(window.is::<Window>());
/// ```
pub struct TypeRegistry {
    entries: FingerprintMap<Registration>,
    classes: HashSet<TypeId, FixedState>,
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`] .
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a empty [`TypeRegistry`].
    #[inline]
    pub fn empty() -> Self {
        Self {
            entries: fingerprint_map(),
            classes: HashSet::with_hasher(TYPE_ID_STATE),
        }
    }

    /// Create a type registry with the built-in data classes.
    ///
    /// - `bool` `char` `String`
    /// - `i8 - i128` `isize`
    /// - `u8 - u128` `usize`
    /// - `f32` `f64`
    /// - `ObjectPtr` `Array`
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for &name in SIMPLE_DATA_CLASSES {
            registry.register_data_class(name);
        }
        registry.register_data_class(OBJECT_PTR_DATA_CLASS);
        registry.register_data_class(ARRAY_DATA_CLASS);
        registry
    }

    fn insert(&mut self, registration: Registration) -> Result<(), RegistryError> {
        let name = registration.name();
        let fingerprint = Fingerprint::of(name);
        match self.entries.get(&fingerprint) {
            Some(existing) if existing.name() != name => Err(RegistryError::FingerprintCollision {
                name,
                existing: existing.name(),
                fingerprint,
            }),
            Some(_) => Err(RegistryError::DuplicateName { name }),
            None => {
                self.entries.insert(fingerprint, registration);
                Ok(())
            }
        }
    }

    /// Attempts to register the class of `T` if it has not yet been registered.
    ///
    /// This will also recursively register the data classes of its fields, and the
    /// struct classes they hold. A conflicting name is logged and the class is left
    /// out, use [`try_register_class`](Self::try_register_class) to handle it.
    #[inline]
    pub fn register<T: Typed>(&mut self) {
        self.register_class(T::static_class());
    }

    /// Attempts to register `class`, see [`register`](Self::register).
    ///
    /// Returns `true` if the class was newly registered.
    pub fn register_class(&mut self, class: &'static Class) -> bool {
        match self.try_register_class(class) {
            Ok(registered) => registered,
            Err(error) => {
                log::warn!("class `{}` was not registered: {error}", class.name());
                false
            }
        }
    }

    /// Attempts to register `class` and its field dependencies.
    ///
    /// Returns `Ok(false)` if the class was already registered.
    pub fn try_register_class(&mut self, class: &'static Class) -> Result<bool, RegistryError> {
        if self.classes.contains(&class.type_id()) {
            return Ok(false);
        }
        self.insert(Registration::Class(class))?;
        self.classes.insert(class.type_id());
        log::trace!("registered class `{}`", class.name());

        for field in class.fields() {
            field.register_data(self);
        }
        Ok(true)
    }

    /// Registers a leaf data class name.
    ///
    /// Returns `true` if the name was newly registered.
    pub fn register_data_class(&mut self, name: &'static str) -> bool {
        if let Some(Registration::Data(existing)) = self.entries.get(&Fingerprint::of(name))
            && *existing == name
        {
            return false;
        }
        match self.insert(Registration::Data(name)) {
            Ok(()) => true,
            Err(error) => {
                log::warn!("data class `{name}` was not registered: {error}");
                false
            }
        }
    }

    /// Automatically registers every class declared through the reflection macros.
    ///
    /// This method is equivalent to calling [`register`](Self::register) for each
    /// declared type. Repeated calls are cheap and will not insert duplicates.
    ///
    /// ## Feature Dependency
    ///
    /// This method requires the `auto_register` feature. When disabled, it always do
    /// nothing and returns `false`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use vc_reflect::{Object, impl_reflect_object, registry::TypeRegistry};
    /// #[derive(Default)]
    /// struct Probe {
    ///     depth: f32,
    /// }
    ///
    /// impl_reflect_object!(Probe, "Probe", [depth]);
    /// impl Object for Probe {}
    ///
    /// let mut registry = TypeRegistry::new();
    /// assert!(registry.auto_register());
    /// assert!(registry.get_class("Probe").is_some());
    /// ```
    #[cfg_attr(not(feature = "auto_register"), inline(always))]
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            for registration in inventory::iter::<crate::registry::AutoRegistration> {
                self.register_class(registration.class());
            }
            true
        }
        #[cfg(not(feature = "auto_register"))]
        {
            false
        }
    }

    /// Resolves a registered name.
    ///
    /// The empty name (a null reference) never resolves.
    pub fn resolve(&self, name: &str) -> Option<Registration> {
        let fingerprint = Fingerprint::of(name);
        if fingerprint.is_none() {
            return None;
        }
        let registration = *self.entries.get(&fingerprint)?;
        if registration.name() != name {
            log::warn!(
                "`{name}` collides with the registered name `{}` ({fingerprint:?})",
                registration.name(),
            );
            return None;
        }
        Some(registration)
    }

    /// Resolves a name by fingerprint alone, without confirming the literal name.
    #[inline]
    pub fn resolve_fingerprint(&self, fingerprint: Fingerprint) -> Option<Registration> {
        self.entries.get(&fingerprint).copied()
    }

    /// Returns the class registered under `name`.
    #[inline]
    pub fn get_class(&self, name: &str) -> Option<&'static Class> {
        self.resolve(name)?.as_class()
    }

    /// Constructs a default instance of the object class registered under `name`.
    #[inline]
    pub fn construct(&self, name: &str) -> Option<Box<dyn Object>> {
        self.get_class(name)?.construct_object()
    }

    /// Whether `name` is registered.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Whether the class of the type with given [`TypeId`] is registered.
    #[inline]
    pub fn contains_type(&self, type_id: TypeId) -> bool {
        self.classes.contains(&type_id)
    }

    /// Returns the number of registered names.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over the registered classes, in arbitrary order.
    pub fn classes(&self) -> impl Iterator<Item = &'static Class> + '_ {
        self.entries.values().filter_map(Registration::as_class)
    }
}

// -----------------------------------------------------------------------------
// Tests
