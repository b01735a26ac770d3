use crate::info::Class;

/// A class submitted for [`TypeRegistry::auto_register`](crate::registry::TypeRegistry::auto_register).
pub struct AutoRegistration(fn() -> &'static Class);

impl AutoRegistration {
    #[inline]
    pub const fn new(class: fn() -> &'static Class) -> Self {
        Self(class)
    }

    #[inline]
    pub fn class(&self) -> &'static Class {
        (self.0)()
    }
}

inventory::collect!(AutoRegistration);
