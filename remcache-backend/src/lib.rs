#![warn(missing_docs)]
//! Traits and types for remcache backend drivers.
//!
//! A backend driver implements raw byte-array cache operations against one
//! physical storage medium. If you want to plug another medium into
//! remcache, you are in the right place: implement [`Backend`] and hand an
//! `Arc` of it to the storage façade.

mod backend;

pub use backend::{Backend, BackendResult};

use thiserror::Error;

/// Groups the errors a driver can produce while talking to its medium.
///
/// Callers must be able to tell a broken medium apart from a cache miss, so
/// drivers never report connectivity failures as an absent key.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Internal backend error, state or computation error.
    ///
    /// Any error not related to network interaction.
    #[error(transparent)]
    InternalError(Box<dyn std::error::Error + Send + Sync>),

    /// Network interaction error.
    ///
    /// The medium is unreachable, refused the connection, or timed out.
    #[error(transparent)]
    ConnectionError(Box<dyn std::error::Error + Send + Sync>),
}

/// Status of a delete operation.
///
/// Removing an absent key is not an error at this level; the driver reports
/// [`DeleteStatus::Missing`] and the caller decides whether it cares.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Record successfully deleted.
    Deleted(u32),
    /// Record already missing.
    Missing,
}
