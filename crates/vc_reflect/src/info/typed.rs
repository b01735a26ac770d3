use crate::info::Class;

// -----------------------------------------------------------------------------
// Typed

/// A static accessor to the runtime [`Class`] of a type.
///
/// Implemented by [`impl_reflect_object!`](crate::impl_reflect_object) and
/// [`impl_reflect_struct!`](crate::impl_reflect_struct), allowing access to the class
/// without an instance of the type.
///
/// # Examples
///
/// ```
/// use vc_reflect::{Object, impl_reflect_object, info::Typed};
///
/// #[derive(Default)]
/// struct Camera {
///     fov: f32,
/// }
///
/// impl_reflect_object!(Camera, "Camera", [fov]);
/// impl Object for Camera {}
///
/// let class = Camera::static_class();
/// assert_eq!(class.name(), "Camera");
/// assert_eq!(class.fields().len(), 1);
/// ```
///
/// Note: Use [`DynamicClass`] for dynamic dispatch.
pub trait Typed: Send + Sync + 'static {
    /// Returns the class of `Self`, built once on first access.
    fn static_class() -> &'static Class;
}

// -----------------------------------------------------------------------------
// DynamicClass

/// Provide dynamic dispatch for types that implement [`Typed`].
///
/// Auto impl for all types that implemented [`Typed`].
pub trait DynamicClass {
    /// Returns the class of the concrete type behind `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use vc_reflect::{Object, impl_reflect_object, info::DynamicClass};
    /// #[derive(Default)]
    /// struct Light;
    ///
    /// impl_reflect_object!(Light, "Light", []);
    /// impl Object for Light {}
    ///
    /// let light: Box<dyn Object> = Box::new(Light);
    /// assert_eq!(light.class().name(), "Light");
    /// ```
    fn class(&self) -> &'static Class;
}

impl<T: Typed> DynamicClass for T {
    #[inline]
    fn class(&self) -> &'static Class {
        T::static_class()
    }
}
