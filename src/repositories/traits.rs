//! Repository trait definitions
//!
//! This module defines the core trait that repositories implement, providing
//! a consistent interface for data access operations. Mutations report rows
//! affected rather than failing on a missing row; lookups return `None` or
//! empty collections when nothing matches.

use crate::errors::RepositoryResult;
use async_trait::async_trait;

/// Core repository trait providing CRUD operations
///
/// # Type Parameters
///
/// * `T` - The entity type (e.g., ElementInstance)
/// * `ID` - The identifier type
#[async_trait]
pub trait Repository<T, ID: Send + 'static>: Send + Sync {
    /// Request type for creating new entities
    type CreateRequest;
    /// Request type for updating existing entities
    type UpdateRequest;
    /// Query type for filtering and searching
    type Query;

    /// Find an entity by its ID
    ///
    /// Returns `Ok(None)` when no entity matches; errors are reserved for
    /// store failures.
    async fn find_by_id(&self, id: ID) -> RepositoryResult<Option<T>>;

    /// Find all entities matching a query
    async fn find_all(&self, query: Self::Query) -> RepositoryResult<Vec<T>>;

    /// Create a new entity and return it
    async fn create(&self, request: Self::CreateRequest) -> RepositoryResult<T>;

    /// Apply a partial update to the entity with the given ID
    ///
    /// Returns the number of rows affected - 0 when no entity matches.
    async fn update(&self, id: ID, request: Self::UpdateRequest) -> RepositoryResult<u64>;

    /// Delete the entity with the given ID
    ///
    /// Returns the number of rows affected - 0 when no entity matches.
    async fn delete(&self, id: ID) -> RepositoryResult<u64>;

    /// Count entities matching a query
    async fn count(&self, query: Self::Query) -> RepositoryResult<u64>;

    /// Check if an entity exists by ID
    async fn exists(&self, id: ID) -> RepositoryResult<bool> {
        match self.find_by_id(id).await? {
            Some(_) => Ok(true),
            None => Ok(false),
        }
    }
}
