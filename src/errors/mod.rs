//! Centralized error handling for the fabric controller persistence layer
//!
//! Error types are split by layer: [`AppError`] is the top-level type the
//! controller application works with, [`RepositoryError`] covers data-access
//! failures. Lookups that find nothing return `Ok(None)`/empty collections,
//! never an error — `RecordNotFound` exists for callers that need to promote
//! absence into a failure.

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Repository Results
pub type RepositoryResult<T> = Result<T, RepositoryError>;
