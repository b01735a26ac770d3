#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Compilation config

#[cfg(not(feature = "std"))]
compile_error!("`vc_reflect` reads and writes `std::io` streams, the `std` feature is required");

// -----------------------------------------------------------------------------
// Extern Self

// The declarative macros expand to `$crate::...` paths, doc tests use `vc_reflect::...`.
extern crate self as vc_reflect;

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;
extern crate std;

// -----------------------------------------------------------------------------
// Modules

mod macros;
mod object;

pub mod data;
pub mod fingerprint;
pub mod info;
pub mod persist;
pub mod registry;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use object::{Object, Struct, UnknownValue};
