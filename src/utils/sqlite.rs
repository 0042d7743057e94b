//! SQLite row decoding helpers

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::errors::{RepositoryError, RepositoryResult};

/// Extension trait for decoding named columns with repository-level errors.
pub trait SqliteRowExt {
    /// Decode a named column, mapping driver failures into
    /// [`RepositoryError::QueryFailed`].
    fn column<'r, T>(&'r self, name: &str) -> RepositoryResult<T>
    where
        T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>;
}

impl SqliteRowExt for SqliteRow {
    fn column<'r, T>(&'r self, name: &str) -> RepositoryResult<T>
    where
        T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
    {
        self.try_get(name).map_err(|e| RepositoryError::QueryFailed {
            query: format!("SELECT {}", name),
            message: e.to_string(),
        })
    }
}
