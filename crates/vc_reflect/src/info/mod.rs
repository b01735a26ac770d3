//! Runtime class descriptions.
//!
//! ## Menu
//!
//! - [`Class`]: The description of one reflected type, its registered name, its
//!   [`Fingerprint`](crate::fingerprint::Fingerprint), its constructor and its ordered
//!   [`Field`] list.
//!     - [`ClassKind`]: Whether the class describes a polymorphic [`Object`](crate::Object)
//!       or a value-like [`Struct`](crate::Struct).
//!
//! - [`Field`]: One named, typed member of a class, with the accessor that projects an
//!   instance onto the member's [`Data`](crate::data::Data) codec.
//!
//! - [`Typed`]: A trait for obtaining the static `Class` of a type.
//!
//! - [`DynamicClass`]: Provide dynamic dispatch for `Typed`.

// -----------------------------------------------------------------------------
// Modules

mod class;
mod field;
mod typed;

// -----------------------------------------------------------------------------
// Exports

pub use class::{Class, ClassKind};
pub use field::Field;
pub use typed::{DynamicClass, Typed};
