//! Items referenced by the expansion of the reflection macros.

pub use alloc::vec::Vec;
pub use std::sync::OnceLock;

pub use crate::data::allocate_struct_item;

#[cfg(feature = "auto_register")]
pub use crate::registry::AutoRegistration;
#[cfg(feature = "auto_register")]
pub use inventory;
