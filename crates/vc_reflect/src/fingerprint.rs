//! Name fingerprints and the lookup tables keyed by them.
//!
//! Type names and field names are matched through a [`Fingerprint`], the CRC-32
//! of the literal name. Tables built on top of it ([`FingerprintMap`]) always keep
//! the literal name next to the entry, so a lookup can confirm the hit and reject
//! a collision between two distinct names.

use core::fmt;
use core::hash::{BuildHasher, Hasher};

use hashbrown::HashMap;

// -----------------------------------------------------------------------------
// Fingerprint

/// A 32-bit fingerprint of a type or field name.
///
/// The empty name maps to [`Fingerprint::NONE`], this is how an absent `Name`
/// attribute or a null `Type` attribute is represented.
///
/// # Examples
///
/// ```
/// use vc_reflect::fingerprint::Fingerprint;
///
/// assert_eq!(Fingerprint::of(""), Fingerprint::NONE);
/// assert_eq!(Fingerprint::of_optional(None), Fingerprint::NONE);
/// assert_eq!(Fingerprint::of("Mesh"), Fingerprint::of("Mesh"));
/// assert_ne!(Fingerprint::of("Mesh"), Fingerprint::of("Material"));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fingerprint(u32);

impl Fingerprint {
    /// The fingerprint of an absent or empty name.
    pub const NONE: Self = Self(0);

    /// Computes the fingerprint of `name`.
    #[inline]
    pub fn of(name: &str) -> Self {
        if name.is_empty() {
            Self::NONE
        } else {
            Self(crc32fast::hash(name.as_bytes()))
        }
    }

    /// Computes the fingerprint of an optional name, `None` maps to [`Fingerprint::NONE`].
    #[inline]
    pub fn of_optional(name: Option<&str>) -> Self {
        name.map_or(Self::NONE, Self::of)
    }

    /// Wraps a raw fingerprint value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw fingerprint value.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns `true` for [`Fingerprint::NONE`].
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({:#010x})", self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

// -----------------------------------------------------------------------------
// FingerprintHasher

/// A pass-through hasher for [`Fingerprint`] keys.
///
/// A fingerprint is already a well mixed CRC, so it is only folded into both
/// halves of the `u64` (the table reads its control bits from the high half).
#[derive(Copy, Clone, Default, Debug)]
pub struct FingerprintHasher {
    hash: u64,
}

impl Hasher for FingerprintHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        // Only reached for non-`u32` keys.
        for byte in bytes.iter().rev() {
            self.hash = self.hash.rotate_left(8).wrapping_add(*byte as u64);
        }
    }

    #[inline]
    fn write_u32(&mut self, i: u32) {
        let i = i as u64;
        self.hash = i | (i << 32);
    }
}

/// [`BuildHasher`] of [`FingerprintHasher`].
#[derive(Copy, Clone, Default, Debug)]
pub struct FingerprintState;

impl BuildHasher for FingerprintState {
    type Hasher = FingerprintHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FingerprintHasher { hash: 0 }
    }
}

/// A hash map keyed by [`Fingerprint`].
pub type FingerprintMap<V> = HashMap<Fingerprint, V, FingerprintState>;

/// Creates an empty [`FingerprintMap`].
#[inline]
pub fn fingerprint_map<V>() -> FingerprintMap<V> {
    HashMap::with_hasher(FingerprintState)
}

// -----------------------------------------------------------------------------
// Tests
