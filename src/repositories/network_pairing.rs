//! Network pairing repository implementation

use sqlx::{Pool, Sqlite};

use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::network_pairing::{NetworkPairing, NetworkPairingCreateRequest};

/// Repository implementation for network pairings
#[derive(Clone)]
pub struct NetworkPairingRepository {
    pool: Pool<Sqlite>,
}

impl NetworkPairingRepository {
    /// Create a new network pairing repository
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        request: NetworkPairingCreateRequest,
    ) -> RepositoryResult<NetworkPairing> {
        let query = r#"
            INSERT INTO network_pairing (element_id1, network_element_id1, network_element_id2)
            VALUES (?, ?, ?)
        "#;

        let result = sqlx::query(query)
            .bind(&request.element_id1)
            .bind(&request.network_element_id1)
            .bind(&request.network_element_id2)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed(query, e))?;

        Ok(NetworkPairing {
            id: result.last_insert_rowid(),
            element_id1: request.element_id1,
            network_element_id1: request.network_element_id1,
            network_element_id2: request.network_element_id2,
        })
    }

    pub async fn find_by_element_id(
        &self,
        element_id: &str,
    ) -> RepositoryResult<Vec<NetworkPairing>> {
        let query = r#"
            SELECT id, element_id1, network_element_id1, network_element_id2
            FROM network_pairing
            WHERE element_id1 = ?
        "#;

        sqlx::query_as::<_, NetworkPairing>(query)
            .bind(element_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed(query, e))
    }

    /// Remove every pairing for a logical element id, returning rows affected.
    pub async fn delete_by_element_id(&self, element_id: &str) -> RepositoryResult<u64> {
        let query = "DELETE FROM network_pairing WHERE element_id1 = ?";

        let result = sqlx::query(query)
            .bind(element_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed(query, e))?;

        Ok(result.rows_affected())
    }
}
