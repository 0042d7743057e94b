//! Element instance repository implementation
//!
//! This module provides the concrete implementation of the repository pattern
//! for element instances: CRUD, the track-gated fabric visibility join, the
//! network-pairing cascade delete, and the specialized instance factories
//! that seed default configuration payloads.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Sqlite};

use super::traits::Repository;
use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::element_instance::{
    DebugConsoleConfig, ElementInstance, ElementInstanceCreateRequest, ElementInstanceKind,
    ElementInstanceUpdateRequest, ElementInstanceWithTrack, InstanceRoleFlags,
    NetworkInstanceConfig, NetworkTunnelRequest, StreamViewerConfig,
};
use crate::models::Element;
use crate::utils::ids;
use crate::utils::sqlite::SqliteRowExt;
use crate::utils::time::unix_millis_now;

const STREAM_VIEWER_NAME: &str = "Stream Viewer";
const DEBUG_CONSOLE_NAME: &str = "Debug Console";

/// Log quota for factory-built specialized instances, in megabytes.
const SPECIALIZED_LOG_SIZE_MB: f64 = 50.0;
const VIEWER_FOLDER_SIZE_LIMIT_MB: f64 = 200.0;
const CONSOLE_FILE_SIZE_LIMIT_MB: f64 = 200.0;

const NETWORK_MODE_PUBLIC: &str = "public";
const NETWORK_CONNECTION_LIMIT: u32 = 60;
const NETWORK_LOCAL_HOST: &str = "iofabric";
const NETWORK_HEARTBEAT_INTERVAL_MS: u64 = 20_000;
const NETWORK_HEARTBEAT_ABSENCE_THRESHOLD_MS: u64 = 60_000;

/// Query parameters specific to element instances
#[derive(Debug, Clone, Default)]
pub struct ElementInstanceQuery {
    /// Filter by owning track
    pub track_id: Option<i64>,
    /// Filter by owning fabric host
    pub fabric_instance_id: Option<String>,
    /// Filter by instance kind
    pub kind: Option<ElementInstanceKind>,
    /// Filter by the redeploy-requested flag
    pub rebuild: Option<bool>,
}

impl ElementInstanceQuery {
    /// Create new empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by owning track
    pub fn track_id(mut self, track_id: i64) -> Self {
        self.track_id = Some(track_id);
        self
    }

    /// Filter by owning fabric host
    pub fn fabric_instance_id<S: Into<String>>(mut self, fabric_instance_id: S) -> Self {
        self.fabric_instance_id = Some(fabric_instance_id.into());
        self
    }

    /// Filter by instance kind
    pub fn kind(mut self, kind: ElementInstanceKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Filter by the redeploy-requested flag
    pub fn rebuild(mut self, rebuild: bool) -> Self {
        self.rebuild = Some(rebuild);
        self
    }
}

/// Repository implementation for element instances
#[derive(Clone)]
pub struct ElementInstanceRepository {
    pool: Pool<Sqlite>,
}

impl ElementInstanceRepository {
    /// Create a new element instance repository
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Convert database row to ElementInstance model
    fn row_to_element_instance(&self, row: &SqliteRow) -> RepositoryResult<ElementInstance> {
        let flags = InstanceRoleFlags {
            is_stream_viewer: row.column("is_stream_viewer")?,
            is_debug_console: row.column("is_debug_console")?,
            is_manager: row.column("is_manager")?,
            is_network: row.column("is_network")?,
        };

        Ok(ElementInstance {
            uuid: row.column("uuid")?,
            track_id: row.column("track_id")?,
            element_key: row.column("element_key")?,
            config: row.column("config")?,
            name: row.column("name")?,
            last_updated: row.column("last_updated")?,
            config_last_updated: row.column("config_last_updated")?,
            updated_by: row.column("updated_by")?,
            kind: ElementInstanceKind::from_flags(flags),
            registry_id: row.column("registry_id")?,
            rebuild: row.column("rebuild")?,
            root_host_access: row.column("root_host_access")?,
            log_size: row.column("log_size")?,
            fabric_instance_id: row.column("iofabric_uuid")?,
        })
    }

    /// Build WHERE clause for query
    fn build_where_clause(query: &ElementInstanceQuery) -> String {
        let mut conditions: Vec<&str> = Vec::new();

        if query.track_id.is_some() {
            conditions.push("track_id = ?");
        }
        if query.fabric_instance_id.is_some() {
            conditions.push("iofabric_uuid = ?");
        }
        if query.kind.is_some() {
            conditions.push(
                "is_stream_viewer = ? AND is_debug_console = ? AND is_manager = ? AND is_network = ?",
            );
        }
        if query.rebuild.is_some() {
            conditions.push("rebuild = ?");
        }

        if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        }
    }

    /// Bind query parameters in the order emitted by `build_where_clause`
    fn bind_query_params<'q>(
        mut builder: sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
        query: &ElementInstanceQuery,
    ) -> sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
        if let Some(track_id) = query.track_id {
            builder = builder.bind(track_id);
        }
        if let Some(fabric_instance_id) = &query.fabric_instance_id {
            builder = builder.bind(fabric_instance_id.clone());
        }
        if let Some(kind) = query.kind {
            let flags = kind.flags();
            builder = builder
                .bind(flags.is_stream_viewer)
                .bind(flags.is_debug_console)
                .bind(flags.is_manager)
                .bind(flags.is_network);
        }
        if let Some(rebuild) = query.rebuild {
            builder = builder.bind(rebuild);
        }
        builder
    }

    /// Single-row lookup by instance identifier
    pub async fn find_by_uuid(&self, uuid: &str) -> RepositoryResult<Option<ElementInstance>> {
        let query = "SELECT * FROM element_instance WHERE uuid = ?";

        match sqlx::query(query)
            .bind(uuid.to_string())
            .fetch_optional(&self.pool)
            .await
        {
            Ok(Some(row)) => Ok(Some(self.row_to_element_instance(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(RepositoryError::query_failed(query, e)),
        }
    }

    /// All instances attached to a track
    pub async fn find_by_track_id(&self, track_id: i64) -> RepositoryResult<Vec<ElementInstance>> {
        let query = "SELECT * FROM element_instance WHERE track_id = ?";

        let rows = sqlx::query(query)
            .bind(track_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed(query, e))?;

        rows.iter()
            .map(|row| self.row_to_element_instance(row))
            .collect()
    }

    /// All instances visible on a fabric host, joined with their track's
    /// activation flag.
    ///
    /// Instances with `track_id = 0` are always included; instances on a
    /// track are included only while the track is activated.
    pub async fn find_by_fabric_instance_id(
        &self,
        fabric_instance_id: &str,
    ) -> RepositoryResult<Vec<ElementInstanceWithTrack>> {
        let query = r#"
            SELECT i.*, t.is_activated AS track_is_activated
            FROM element_instance i
            LEFT JOIN data_tracks t ON i.track_id = t.id
            WHERE i.iofabric_uuid = ? AND (i.track_id = 0 OR t.is_activated = 1)
        "#;

        let rows = sqlx::query(query)
            .bind(fabric_instance_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed(query, e))?;

        rows.iter()
            .map(|row| {
                Ok(ElementInstanceWithTrack {
                    instance: self.row_to_element_instance(row)?,
                    track_activated: row.column("track_is_activated")?,
                })
            })
            .collect()
    }

    /// Apply a partial update to the instance matching `uuid`.
    ///
    /// Returns the number of rows affected - 0 when no instance matches or
    /// when the request sets nothing. Timestamps are taken from the request
    /// as-is, never stamped here.
    pub async fn update_by_uuid(
        &self,
        uuid: &str,
        request: ElementInstanceUpdateRequest,
    ) -> RepositoryResult<u64> {
        let mut assignments: Vec<&str> = Vec::new();

        if request.track_id.is_some() {
            assignments.push("track_id = ?");
        }
        if request.element_key.is_some() {
            assignments.push("element_key = ?");
        }
        if request.config.is_some() {
            assignments.push("config = ?");
        }
        if request.name.is_some() {
            assignments.push("name = ?");
        }
        if request.last_updated.is_some() {
            assignments.push("last_updated = ?");
        }
        if request.config_last_updated.is_some() {
            assignments.push("config_last_updated = ?");
        }
        if request.updated_by.is_some() {
            assignments.push("updated_by = ?");
        }
        if request.kind.is_some() {
            assignments.push("is_stream_viewer = ?");
            assignments.push("is_debug_console = ?");
            assignments.push("is_manager = ?");
            assignments.push("is_network = ?");
        }
        if request.registry_id.is_some() {
            assignments.push("registry_id = ?");
        }
        if request.rebuild.is_some() {
            assignments.push("rebuild = ?");
        }
        if request.root_host_access.is_some() {
            assignments.push("root_host_access = ?");
        }
        if request.log_size.is_some() {
            assignments.push("log_size = ?");
        }
        if request.fabric_instance_id.is_some() {
            assignments.push("iofabric_uuid = ?");
        }

        if assignments.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            "UPDATE element_instance SET {} WHERE uuid = ?",
            assignments.join(", ")
        );

        let mut builder = sqlx::query(&sql);
        if let Some(track_id) = request.track_id {
            builder = builder.bind(track_id);
        }
        if let Some(element_key) = request.element_key {
            builder = builder.bind(element_key);
        }
        if let Some(config) = request.config {
            builder = builder.bind(config);
        }
        if let Some(name) = request.name {
            builder = builder.bind(name);
        }
        if let Some(last_updated) = request.last_updated {
            builder = builder.bind(last_updated);
        }
        if let Some(config_last_updated) = request.config_last_updated {
            builder = builder.bind(config_last_updated);
        }
        if let Some(updated_by) = request.updated_by {
            builder = builder.bind(updated_by);
        }
        if let Some(kind) = request.kind {
            let flags = kind.flags();
            builder = builder
                .bind(flags.is_stream_viewer)
                .bind(flags.is_debug_console)
                .bind(flags.is_manager)
                .bind(flags.is_network);
        }
        if let Some(registry_id) = request.registry_id {
            builder = builder.bind(registry_id);
        }
        if let Some(rebuild) = request.rebuild {
            builder = builder.bind(rebuild);
        }
        if let Some(root_host_access) = request.root_host_access {
            builder = builder.bind(root_host_access);
        }
        if let Some(log_size) = request.log_size {
            builder = builder.bind(log_size);
        }
        if let Some(fabric_instance_id) = request.fabric_instance_id {
            builder = builder.bind(fabric_instance_id);
        }
        builder = builder.bind(uuid.to_string());

        let result = builder
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed(&sql, e))?;

        Ok(result.rows_affected())
    }

    /// Delete the instance matching `uuid`, returning rows affected.
    pub async fn delete_by_uuid(&self, uuid: &str) -> RepositoryResult<u64> {
        let query = "DELETE FROM element_instance WHERE uuid = ?";

        let result = sqlx::query(query)
            .bind(uuid.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed(query, e))?;

        Ok(result.rows_affected())
    }

    /// Delete every instance referenced by a network pairing for the given
    /// logical element id, on either side of the pair.
    pub async fn delete_network_pair_instances(&self, element_id: &str) -> RepositoryResult<u64> {
        let query = r#"
            DELETE FROM element_instance
            WHERE uuid IN (
                SELECT network_element_id1 FROM network_pairing WHERE element_id1 = ?
            )
            OR uuid IN (
                SELECT network_element_id2 FROM network_pairing WHERE element_id1 = ?
            )
        "#;

        let result = sqlx::query(query)
            .bind(element_id.to_string())
            .bind(element_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed(query, e))?;

        Ok(result.rows_affected())
    }

    /// Instantiate a catalog element with default settings.
    ///
    /// Generates a fresh identifier, stamps both timestamps, seeds an empty
    /// JSON config, and copies `registry_id` from the element definition.
    pub async fn create_with_defaults(
        &self,
        element: &Element,
        user_id: i64,
        track_id: i64,
        name: &str,
        log_size: f64,
    ) -> RepositoryResult<ElementInstance> {
        let now = unix_millis_now();

        let request = ElementInstanceCreateRequest {
            uuid: ids::generate_instance_id(),
            track_id,
            element_key: element.id,
            config: "{}".to_string(),
            name: name.to_string(),
            last_updated: now,
            config_last_updated: now,
            updated_by: user_id,
            kind: ElementInstanceKind::Regular,
            registry_id: element.registry_id,
            rebuild: false,
            root_host_access: false,
            log_size,
            fabric_instance_id: None,
        };

        self.create(request).await
    }

    /// Create the stream viewer instance for a fabric host.
    pub async fn create_stream_viewer(
        &self,
        element_key: i64,
        user_id: i64,
        fabric_instance_id: &str,
    ) -> RepositoryResult<ElementInstance> {
        let config = StreamViewerConfig {
            accesstoken: ids::generate_access_token(),
            foldersizelimit: VIEWER_FOLDER_SIZE_LIMIT_MB,
        };
        let now = unix_millis_now();

        let request = ElementInstanceCreateRequest {
            uuid: ids::generate_instance_id(),
            track_id: 0,
            element_key,
            config: serde_json::to_string(&config)?,
            name: STREAM_VIEWER_NAME.to_string(),
            last_updated: now,
            config_last_updated: now,
            updated_by: user_id,
            kind: ElementInstanceKind::StreamViewer,
            registry_id: None,
            rebuild: false,
            root_host_access: false,
            log_size: SPECIALIZED_LOG_SIZE_MB,
            fabric_instance_id: Some(fabric_instance_id.to_string()),
        };

        self.create(request).await
    }

    /// Create the debug console instance for a fabric host.
    pub async fn create_debug_console(
        &self,
        element_key: i64,
        user_id: i64,
        fabric_instance_id: &str,
    ) -> RepositoryResult<ElementInstance> {
        let config = DebugConsoleConfig {
            accesstoken: ids::generate_access_token(),
            filesizelimit: CONSOLE_FILE_SIZE_LIMIT_MB,
        };
        let now = unix_millis_now();

        let request = ElementInstanceCreateRequest {
            uuid: ids::generate_instance_id(),
            track_id: 0,
            element_key,
            config: serde_json::to_string(&config)?,
            name: DEBUG_CONSOLE_NAME.to_string(),
            last_updated: now,
            config_last_updated: now,
            updated_by: user_id,
            kind: ElementInstanceKind::DebugConsole,
            registry_id: None,
            rebuild: false,
            root_host_access: false,
            log_size: SPECIALIZED_LOG_SIZE_MB,
            fabric_instance_id: Some(fabric_instance_id.to_string()),
        };

        self.create(request).await
    }

    /// Create a network tunnel instance connecting a local port to a remote
    /// endpoint through the public relay.
    pub async fn create_network(
        &self,
        element: &Element,
        user_id: i64,
        fabric_instance_id: &str,
        tunnel: NetworkTunnelRequest,
    ) -> RepositoryResult<ElementInstance> {
        let config = NetworkInstanceConfig {
            mode: NETWORK_MODE_PUBLIC.to_string(),
            host: tunnel.remote_host,
            port: tunnel.remote_port,
            connectioncount: NETWORK_CONNECTION_LIMIT,
            passcode: ids::random_alphanumeric(ids::INSTANCE_ID_LENGTH),
            localhost: NETWORK_LOCAL_HOST.to_string(),
            localport: tunnel.local_port,
            heartbeatfrequency: NETWORK_HEARTBEAT_INTERVAL_MS,
            heartbeatabsencethreshold: NETWORK_HEARTBEAT_ABSENCE_THRESHOLD_MS,
        };
        let now = unix_millis_now();

        let request = ElementInstanceCreateRequest {
            uuid: ids::generate_instance_id(),
            track_id: 0,
            element_key: element.id,
            config: serde_json::to_string(&config)?,
            name: tunnel.name,
            last_updated: now,
            config_last_updated: now,
            updated_by: user_id,
            kind: ElementInstanceKind::Network,
            registry_id: element.registry_id,
            rebuild: false,
            root_host_access: false,
            log_size: SPECIALIZED_LOG_SIZE_MB,
            fabric_instance_id: Some(fabric_instance_id.to_string()),
        };

        self.create(request).await
    }
}

#[async_trait]
impl Repository<ElementInstance, String> for ElementInstanceRepository {
    type CreateRequest = ElementInstanceCreateRequest;
    type UpdateRequest = ElementInstanceUpdateRequest;
    type Query = ElementInstanceQuery;

    async fn find_by_id(&self, id: String) -> RepositoryResult<Option<ElementInstance>> {
        self.find_by_uuid(&id).await
    }

    async fn find_all(&self, query: Self::Query) -> RepositoryResult<Vec<ElementInstance>> {
        let where_clause = Self::build_where_clause(&query);
        let sql = format!("SELECT * FROM element_instance {}", where_clause);

        let builder = Self::bind_query_params(sqlx::query(&sql), &query);
        let rows = builder
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed(&sql, e))?;

        rows.iter()
            .map(|row| self.row_to_element_instance(row))
            .collect()
    }

    async fn create(&self, request: Self::CreateRequest) -> RepositoryResult<ElementInstance> {
        let flags = request.kind.flags();

        let query = r#"
            INSERT INTO element_instance (
                uuid, track_id, element_key, config, name,
                last_updated, config_last_updated, updated_by,
                is_stream_viewer, is_debug_console, is_manager, is_network,
                registry_id, rebuild, root_host_access, log_size, iofabric_uuid
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(&request.uuid)
            .bind(request.track_id)
            .bind(request.element_key)
            .bind(&request.config)
            .bind(&request.name)
            .bind(request.last_updated)
            .bind(request.config_last_updated)
            .bind(request.updated_by)
            .bind(flags.is_stream_viewer)
            .bind(flags.is_debug_console)
            .bind(flags.is_manager)
            .bind(flags.is_network)
            .bind(request.registry_id)
            .bind(request.rebuild)
            .bind(request.root_host_access)
            .bind(request.log_size)
            .bind(&request.fabric_instance_id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed(query, e))?;

        Ok(ElementInstance {
            uuid: request.uuid,
            track_id: request.track_id,
            element_key: request.element_key,
            config: request.config,
            name: request.name,
            last_updated: request.last_updated,
            config_last_updated: request.config_last_updated,
            updated_by: request.updated_by,
            kind: request.kind,
            registry_id: request.registry_id,
            rebuild: request.rebuild,
            root_host_access: request.root_host_access,
            log_size: request.log_size,
            fabric_instance_id: request.fabric_instance_id,
        })
    }

    async fn update(&self, id: String, request: Self::UpdateRequest) -> RepositoryResult<u64> {
        self.update_by_uuid(&id, request).await
    }

    async fn delete(&self, id: String) -> RepositoryResult<u64> {
        self.delete_by_uuid(&id).await
    }

    async fn count(&self, query: Self::Query) -> RepositoryResult<u64> {
        let where_clause = Self::build_where_clause(&query);
        let sql = format!(
            "SELECT COUNT(*) as count FROM element_instance {}",
            where_clause
        );

        let builder = Self::bind_query_params(sqlx::query(&sql), &query);
        let row = builder
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed(&sql, e))?;

        let count: i64 = row.column("count")?;
        Ok(count as u64)
    }
}
