//! # ccf
//!
//! Strict deterministic encoding and decoding of the **Cadence Compact
//! Format (CCF)**: a length-framed, self-describing binary codec for typed
//! values of a resource-oriented smart-contract language, built on CBOR
//! primitives.
//!
//! ## Design principles
//!
//! - **Deterministic bytes are the value.**
//!   For a given value and static type the encoding is byte-identical
//!   across producers, so cryptographic digests and equality comparisons
//!   over encodings are stable. Dictionary keys, the type-definition table,
//!   and restriction lists are canonically ordered; composite fields follow
//!   declaration order.
//! - **The static type drives the wire shape.**
//!   Concrete positions carry bare values; abstract positions (`AnyStruct`,
//!   `Number`, interfaces, restricted types) wrap each value with its
//!   runtime type.
//! - **Malformed input is rejected, never repaired.**
//!   Every numeric range, UTF-8 sequence, ordering constraint, and field
//!   count is validated; decoding fails atomically with a typed error.
//!
//! ## Feature flags
//!
//! - `std` *(default)*: implements `std::error::Error` for [`CcfError`].
//! - `sha2` *(default)*: enables the [`sha256`] helper for canonical bytes.
//! - `simdutf8`: SIMD-accelerated UTF-8 validation.
//!
//! ## Safety
//!
//! This crate forbids `unsafe` code.
//!
//! ## `no_std`
//!
//! The crate is `no_std` compatible; an allocator is required.

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

extern crate alloc;

mod bigint;
mod collect;
mod decode;
mod encode;
mod error;
mod limits;
mod order;
mod reader;
mod typeid;
mod types;
mod value;
mod writer;

pub mod tags;

pub use crate::bigint::BigInt;
pub use crate::decode::{
    decode, decode_with_limits, decode_with_resolver, Decoded, TypeResolver,
};
pub use crate::encode::encode;
pub use crate::error::{CcfError, ErrorCode, ErrorKind};
pub use crate::limits::{DecodeLimits, DEFAULT_MAX_CONTAINER_LEN, DEFAULT_MAX_DEPTH};
pub use crate::tags::SimpleType;
pub use crate::types::{
    CompositeId, CompositeKind, CompositeType, Field, FunctionType, Parameter, Type, TypePool,
};
pub use crate::value::{
    ArrayValue, CapabilityTarget, CapabilityValue, CompositeField, CompositeValue, DictEntry,
    DictionaryValue, PathDomain, PathValue, Value, FIXED_POINT_SCALE,
};

/// Compute the SHA-256 digest of an encoding.
///
/// Because encodings are deterministic, this digest is stable across
/// producers for semantically equal values.
#[cfg(feature = "sha2")]
#[cfg_attr(docsrs, doc(cfg(feature = "sha2")))]
#[must_use]
pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut h = Sha256::new();
    h.update(bytes);
    let out = h.finalize();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(out.as_slice());
    digest
}
