#![warn(missing_docs)]
//! # remcache
//!
//! A backend-agnostic remote cache for transient serialized values with
//! optional expiration. Callers store opaque byte arrays (or registered
//! typed values) under string keys, independent of which physical cache
//! technology the deployment runs: a table in an embedded database, a Redis
//! server, or a memcached cluster.
//!
//! ## Layers
//!
//! - **Driver** ([`Backend`]): raw byte operations against one medium, one
//!   implementation per technology (`remcache-sqlite`, `remcache-redis`,
//!   `remcache-memcached`).
//! - **Codec** ([`codec::Codec`]): converts registered application types to
//!   and from the wire format.
//! - **Façade** ([`RemoteCache`] behind the [`CacheStorage`] trait): glues
//!   one driver to one codec and defines the error semantics every caller
//!   relies on. A miss is [`CacheError::NotFound`], a down medium is
//!   [`CacheError::Unavailable`], and the two are never conflated.
//! - **Decorator** ([`PrefixedCache`]): namespaces keys so several logical
//!   caches can share one backend.
//!
//! ## Example
//!
//! ```
//! use remcache::{CacheStorageExt, TypeRegistry, provide_remote_cache, RemoteCacheOptions};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct SignedInUser {
//!     id: i64,
//!     login: String,
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), remcache::CacheError> {
//! let mut registry = TypeRegistry::new();
//! registry.register::<SignedInUser>();
//!
//! let options = RemoteCacheOptions {
//!     backend: remcache::BACKEND_DATABASE.to_owned(),
//!     ..Default::default()
//! };
//! let cache = provide_remote_cache(&options, registry)?;
//!
//! let user = SignedInUser { id: 7, login: "editor".to_owned() };
//! cache.set("user:7", &user, None).await?;
//! let cached: SignedInUser = cache.get("user:7").await?;
//! assert_eq!(cached, user);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod crypto;
pub mod error;
pub mod options;
pub mod prefix;
pub mod storage;

pub use codec::{Codec, CodecError, TypeRegistry};
pub use crypto::{CryptoError, ValueEncryption};
pub use error::CacheError;
pub use options::{
    BACKEND_DATABASE, BACKEND_MEMCACHED, BACKEND_REDIS, RemoteCacheOptions, create_backend,
    provide_remote_cache,
};
pub use prefix::PrefixedCache;
pub use storage::{CacheStorage, CacheStorageExt, RemoteCache};

pub use remcache_backend::{Backend, BackendError, BackendResult, DeleteStatus};
pub use remcache_core::{CacheValue, Raw};
