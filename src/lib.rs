#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use vc_reflect as reflect;

pub use vc_reflect::persist::{Archive, ArchiveError, ArchiveWarning};
pub use vc_reflect::registry::TypeRegistry;
pub use vc_reflect::{Object, Struct, impl_reflect_object, impl_reflect_struct};
