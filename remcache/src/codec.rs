//! Typed codec with explicit type registration.
//!
//! Application values travel through the cache as opaque byte sequences in
//! the compact bincode wire format. Before a type can be cached it must be
//! recorded in a [`TypeRegistry`] built during process initialization; the
//! [`Codec`] refuses to encode or decode anything it was never told about.
//! The registry is owned by whoever constructs the codec (no process-wide
//! singleton) and is immutable once the codec exists, which makes the codec
//! freely shareable across tasks.

use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use remcache_core::Raw;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Errors produced by [`Codec`] operations.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The value's concrete type was never registered.
    ///
    /// This is a programmer error: call [`TypeRegistry::register`] for the
    /// type during initialization, before any cache operation references it.
    #[error("type `{0}` is not registered with the cache codec")]
    UnregisteredType(&'static str),

    /// The value could not be serialized.
    #[error("failed to encode value for caching")]
    Encode(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The stored bytes are malformed or do not match the requested type.
    #[error("failed to decode cached value")]
    Decode(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Record of the concrete types the codec may (de)serialize.
///
/// Populated single-threaded at start-up, append-only. Registering the same
/// type twice is a no-op.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<TypeId, &'static str>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records type `T`. Idempotent.
    pub fn register<T: 'static>(&mut self) -> &mut Self {
        self.types
            .entry(TypeId::of::<T>())
            .or_insert_with(type_name::<T>);
        self
    }

    /// Whether type `T` has been recorded.
    pub fn contains<T: 'static>(&self) -> bool {
        self.types.contains_key(&TypeId::of::<T>())
    }

    /// Number of recorded types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no types have been recorded.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Converts typed application values to and from cacheable byte sequences.
///
/// Pure transformation, no internal mutable state; cloning shares the
/// registry, and the codec is safe for concurrent use.
#[derive(Debug, Clone)]
pub struct Codec {
    registry: Arc<TypeRegistry>,
}

impl Codec {
    /// Creates a codec over a finished registry.
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// The registry this codec consults.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    fn ensure_registered<T: 'static>(&self) -> Result<(), CodecError> {
        if self.registry.contains::<T>() {
            Ok(())
        } else {
            Err(CodecError::UnregisteredType(type_name::<T>()))
        }
    }

    /// Serializes `value` into the wire format.
    pub fn encode<T>(&self, value: &T) -> Result<Raw, CodecError>
    where
        T: Serialize + 'static,
    {
        self.ensure_registered::<T>()?;
        let bytes = bincode::serde::encode_to_vec(value, bincode::config::standard())
            .map_err(|e| CodecError::Encode(Box::new(e)))?;
        Ok(Raw::from(bytes))
    }

    /// Deserializes `data` into a value of type `T`.
    ///
    /// The whole input must be consumed; trailing bytes mean the payload
    /// does not actually hold a `T`.
    pub fn decode<T>(&self, data: &[u8]) -> Result<T, CodecError>
    where
        T: DeserializeOwned + 'static,
    {
        self.ensure_registered::<T>()?;
        let (value, consumed) =
            bincode::serde::decode_from_slice(data, bincode::config::standard())
                .map_err(|e| CodecError::Decode(Box::new(e)))?;
        if consumed != data.len() {
            return Err(CodecError::Decode(Box::new(std::io::Error::other(
                "trailing bytes after decoded value",
            ))));
        }
        Ok(value)
    }
}
