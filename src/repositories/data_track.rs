//! Data track repository implementation

use sqlx::{Pool, Sqlite};

use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::data_track::{DataTrack, DataTrackCreateRequest};

/// Repository implementation for data tracks
#[derive(Clone)]
pub struct DataTrackRepository {
    pool: Pool<Sqlite>,
}

impl DataTrackRepository {
    /// Create a new data track repository
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: DataTrackCreateRequest) -> RepositoryResult<DataTrack> {
        let query = "INSERT INTO data_tracks (name, is_activated) VALUES (?, ?)";

        let result = sqlx::query(query)
            .bind(&request.name)
            .bind(request.is_activated)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed(query, e))?;

        Ok(DataTrack {
            id: result.last_insert_rowid(),
            name: request.name,
            is_activated: request.is_activated,
        })
    }

    pub async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<DataTrack>> {
        let query = "SELECT id, name, is_activated FROM data_tracks WHERE id = ?";

        sqlx::query_as::<_, DataTrack>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed(query, e))
    }

    /// Flip the activation flag, returning rows affected.
    pub async fn set_activated(&self, id: i64, is_activated: bool) -> RepositoryResult<u64> {
        let query = "UPDATE data_tracks SET is_activated = ? WHERE id = ?";

        let result = sqlx::query(query)
            .bind(is_activated)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed(query, e))?;

        Ok(result.rows_affected())
    }
}
