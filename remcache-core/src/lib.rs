#![warn(missing_docs)]
//! # remcache-core
//!
//! Core value types shared by every remcache crate.
//!
//! The remote cache stores opaque byte sequences under caller-chosen string
//! keys. This crate defines the payload representation ([`Raw`]) and the
//! [`CacheValue`] wrapper carrying the expiration instant alongside the data.
//! Everything else (the backend driver contract, the typed codec, the
//! storage façade) builds on these two types.

pub mod value;

pub use value::CacheValue;

/// Raw byte data type used for serialized cache values.
/// Using `Bytes` provides efficient zero-copy cloning via reference counting.
pub type Raw = bytes::Bytes;
