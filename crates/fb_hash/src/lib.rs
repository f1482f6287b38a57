//! This library computes the hash keys used by *Frostbite* localization containers.
//!
//! # Key Derivation
//!
//! Strings in a localization container are never looked up by their human readable identifier.
//! Instead the identifier's bytes are run through a member of the FNV (Fowler–Noll–Vo) family and
//! the resulting fixed width digest is stored in the container's index.
//!
//! | Variant    | Width  | Offset basis           | Prime             | Step                      |
//! |------------|--------|------------------------|-------------------|---------------------------|
//! | `fnv1-32`  | 32 bit | `0x811C9DC5`           | `0x01000193`      | multiply, then xor byte   |
//! | `fnv1a-32` | 32 bit | `0x811C9DC5`           | `0x01000193`      | xor byte, then multiply   |
//! | `fnv1-64`  | 64 bit | `0xCBF29CE484222325`   | `0x100000001B3`   | multiply, then xor byte   |
//! | `fnv1a-64` | 64 bit | `0xCBF29CE484222325`   | `0x100000001B3`   | xor byte, then multiply   |
//! | `locid-32` | 32 bit | `5381`                 | `33`              | multiply, then xor byte   |
//!
//! `locid-32` is the FNV-1 walk with the constants the engine tooling uses for string ids.
//!
//! Bytes are always consumed left to right, one at a time, and every multiply wraps at the key
//! width. Hashing an empty input returns the offset basis unchanged.
//!
//! ```
//! use fb_hash::{hash, HashVariant};
//!
//! let key = hash(b"foobar", HashVariant::Fnv1a_32);
//! assert_eq!(u64::from(key), 0xBF9CF968);
//! ```

use std::str::FromStr;

use derive_more::{Display, From, Into};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const FNV32_OFFSET_BASIS: u32 = 0x811C_9DC5;
const FNV32_PRIME: u32 = 0x0100_0193;

const FNV64_OFFSET_BASIS: u64 = 0xCBF2_9CE4_8422_2325;
const FNV64_PRIME: u64 = 0x0000_0100_0000_01B3;

const LOCID32_OFFSET_BASIS: u32 = 5381;
const LOCID32_PRIME: u32 = 33;

/// A fixed width digest of a string identifier
///
/// 32 bit variants are zero extended, so a key compares equal to the integer the engine stores.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Into,
)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[display("{_0:08X}")]
pub struct HashKey(u64);

impl HashKey {
    /// Raw value of the key
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Whether this key can be stored in a field of the given width
    pub const fn fits(self, width: KeyWidth) -> bool {
        match width {
            KeyWidth::Bits32 => self.0 <= u32::MAX as u64,
            KeyWidth::Bits64 => true,
        }
    }
}

impl From<u32> for HashKey {
    fn from(value: u32) -> Self {
        HashKey(value as u64)
    }
}

/// Storage width of a [`HashKey`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyWidth {
    Bits32,
    Bits64,
}

impl KeyWidth {
    /// Number of bytes a key occupies on disk
    pub const fn bytes(self) -> usize {
        match self {
            KeyWidth::Bits32 => 4,
            KeyWidth::Bits64 => 8,
        }
    }
}

/// The members of the FNV family a container may be keyed with
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[allow(non_camel_case_types)]
pub enum HashVariant {
    #[default]
    #[display("fnv1-32")]
    #[cfg_attr(feature = "serde", serde(rename = "fnv1-32"))]
    Fnv1_32,

    #[display("fnv1a-32")]
    #[cfg_attr(feature = "serde", serde(rename = "fnv1a-32"))]
    Fnv1a_32,

    #[display("fnv1-64")]
    #[cfg_attr(feature = "serde", serde(rename = "fnv1-64"))]
    Fnv1_64,

    #[display("fnv1a-64")]
    #[cfg_attr(feature = "serde", serde(rename = "fnv1a-64"))]
    Fnv1a_64,

    /// FNV-1 walk with the engine's string id constants (basis 5381, prime 33)
    #[display("locid-32")]
    #[cfg_attr(feature = "serde", serde(rename = "locid-32"))]
    LocId32,
}

impl HashVariant {
    /// Every supported variant
    pub const ALL: [HashVariant; 5] = [
        HashVariant::Fnv1_32,
        HashVariant::Fnv1a_32,
        HashVariant::Fnv1_64,
        HashVariant::Fnv1a_64,
        HashVariant::LocId32,
    ];

    /// Width of the keys produced by this variant
    pub const fn width(self) -> KeyWidth {
        match self {
            HashVariant::Fnv1_64 | HashVariant::Fnv1a_64 => KeyWidth::Bits64,
            HashVariant::Fnv1_32 | HashVariant::Fnv1a_32 | HashVariant::LocId32 => {
                KeyWidth::Bits32
            }
        }
    }

    /// The value returned for an empty input
    pub const fn offset_basis(self) -> HashKey {
        match self {
            HashVariant::Fnv1_32 | HashVariant::Fnv1a_32 => HashKey(FNV32_OFFSET_BASIS as u64),
            HashVariant::Fnv1_64 | HashVariant::Fnv1a_64 => HashKey(FNV64_OFFSET_BASIS),
            HashVariant::LocId32 => HashKey(LOCID32_OFFSET_BASIS as u64),
        }
    }

    /// Hash `data` with this variant
    pub fn hash(self, data: impl AsRef<[u8]>) -> HashKey {
        hash(data.as_ref(), self)
    }
}

/// Error returned when parsing an unknown [`HashVariant`] name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown hash variant `{0}`")]
pub struct ParseHashVariantError(String);

impl FromStr for HashVariant {
    type Err = ParseHashVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HashVariant::ALL
            .into_iter()
            .find(|variant| variant.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseHashVariantError(s.to_owned()))
    }
}

fn fnv1_32(data: &[u8], basis: u32, prime: u32) -> u32 {
    data.iter()
        .fold(basis, |h, &byte| h.wrapping_mul(prime) ^ byte as u32)
}

fn fnv1a_32(data: &[u8], basis: u32, prime: u32) -> u32 {
    data.iter()
        .fold(basis, |h, &byte| (h ^ byte as u32).wrapping_mul(prime))
}

fn fnv1_64(data: &[u8]) -> u64 {
    data.iter().fold(FNV64_OFFSET_BASIS, |h, &byte| {
        h.wrapping_mul(FNV64_PRIME) ^ byte as u64
    })
}

fn fnv1a_64(data: &[u8]) -> u64 {
    data.iter().fold(FNV64_OFFSET_BASIS, |h, &byte| {
        (h ^ byte as u64).wrapping_mul(FNV64_PRIME)
    })
}

/// Compute the key for `data` under `variant`
pub fn hash(data: &[u8], variant: HashVariant) -> HashKey {
    match variant {
        HashVariant::Fnv1_32 => fnv1_32(data, FNV32_OFFSET_BASIS, FNV32_PRIME).into(),
        HashVariant::Fnv1a_32 => fnv1a_32(data, FNV32_OFFSET_BASIS, FNV32_PRIME).into(),
        HashVariant::Fnv1_64 => fnv1_64(data).into(),
        HashVariant::Fnv1a_64 => fnv1a_64(data).into(),
        HashVariant::LocId32 => fnv1_32(data, LOCID32_OFFSET_BASIS, LOCID32_PRIME).into(),
    }
}

/// Compute the key for the UTF-8 bytes of `identifier`
pub fn hash_str(identifier: &str, variant: HashVariant) -> HashKey {
    hash(identifier.as_bytes(), variant)
}
