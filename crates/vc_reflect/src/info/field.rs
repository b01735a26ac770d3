use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

use crate::data::{Data, DataKind};
use crate::fingerprint::Fingerprint;
use crate::registry::TypeRegistry;

// -----------------------------------------------------------------------------
// Accessor

trait FieldAccess: Send + Sync + 'static {
    fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Data>;

    fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> Option<&'a mut dyn Data>;
}

struct Accessor<T, V> {
    get: fn(&T) -> &V,
    get_mut: fn(&mut T) -> &mut V,
}

impl<T: Any, V: Data> FieldAccess for Accessor<T, V> {
    #[inline]
    fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Data> {
        let owner = owner.downcast_ref::<T>()?;
        Some((self.get)(owner))
    }

    #[inline]
    fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> Option<&'a mut dyn Data> {
        let owner = owner.downcast_mut::<T>()?;
        Some((self.get_mut)(owner))
    }
}

// -----------------------------------------------------------------------------
// Field

/// One named, typed member of a [`Class`](crate::info::Class).
///
/// A field knows the data class of its value (the `Type` attribute written for it)
/// and how to project an owner instance onto the value's [`Data`] codec.
///
/// # Examples
///
/// ```
/// use vc_reflect::info::Field;
///
/// struct Node {
///     depth: u32,
/// }
///
/// let field = Field::new::<Node, u32>("depth", |n| &n.depth, |n| &mut n.depth);
/// assert_eq!(field.name(), "depth");
/// assert_eq!(field.data_class(), "u32");
///
/// let node = Node { depth: 3 };
/// assert!(field.get(&node).is_some());
/// assert!(field.get(&7_u8).is_none());
/// ```
pub struct Field {
    name: &'static str,
    fingerprint: Fingerprint,
    data_class: &'static str,
    data_fingerprint: Fingerprint,
    owner: TypeId,
    index: usize,
    register: fn(&mut TypeRegistry),
    access: Box<dyn FieldAccess>,
}

impl Field {
    /// Creates a field of owner `T` holding a `V`.
    pub fn new<T: Any, V: DataKind>(
        name: &'static str,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> Self {
        Self {
            name,
            fingerprint: Fingerprint::of(name),
            data_class: V::DATA_CLASS,
            data_fingerprint: Fingerprint::of(V::DATA_CLASS),
            owner: TypeId::of::<T>(),
            index: 0,
            register: V::register,
            access: Box::new(Accessor { get, get_mut }),
        }
    }

    /// Returns the field name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the fingerprint of the field name.
    #[inline]
    pub const fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Returns the data class name of the field value.
    #[inline]
    pub const fn data_class(&self) -> &'static str {
        self.data_class
    }

    /// Returns the fingerprint of the data class name.
    #[inline]
    pub const fn data_fingerprint(&self) -> Fingerprint {
        self.data_fingerprint
    }

    /// Returns the position of the field in its class.
    #[inline]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns the `TypeId` of the owner type.
    #[inline]
    pub const fn owner_type_id(&self) -> TypeId {
        self.owner
    }

    /// Projects `owner` onto the field value.
    ///
    /// Returns `None` if `owner` is not of the field's owner type.
    #[inline]
    pub fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Data> {
        self.access.get(owner)
    }

    /// Projects `owner` onto the field value, mutably.
    ///
    /// Returns `None` if `owner` is not of the field's owner type.
    #[inline]
    pub fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> Option<&'a mut dyn Data> {
        self.access.get_mut(owner)
    }

    #[inline]
    pub(crate) fn register_data(&self, registry: &mut TypeRegistry) {
        (self.register)(registry);
    }

    #[inline]
    pub(super) fn set_index(&mut self, index: usize) {
        self.index = index;
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("data_class", &self.data_class)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}
