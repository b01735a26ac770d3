//! The name-to-class registry used while reading.
//!
//! ## Menu
//!
//! - [`TypeRegistry`]: Maps a `Type` attribute (through its fingerprint) to a
//!   [`Registration`].
//! - [`Registration`]: Either a [`Class`](crate::info::Class) or a leaf data class name.
//! - [`RegistryError`]: Name collisions detected while registering.
//!
//! ## auto_register
//!
//! See [`TypeRegistry::auto_register`] .
//!
//! We use [`inventory`] crate to implement static registration, every type declared
//! through [`impl_reflect_object!`](crate::impl_reflect_object) or
//! [`impl_reflect_struct!`](crate::impl_reflect_struct) submits its class.
//!
//! [`inventory`]: https://docs.rs/inventory

// -----------------------------------------------------------------------------
// Modules

#[cfg(feature = "auto_register")]
mod auto_register;
mod type_registry;

// -----------------------------------------------------------------------------
// Exports

#[cfg(feature = "auto_register")]
#[doc(hidden)]
pub use auto_register::AutoRegistration;
pub use type_registry::{Registration, RegistryError, TypeRegistry};
