//! Element instance repository integration tests
//!
//! Core CRUD behavior, the specialized instance factories, and partial
//! update semantics, exercised against an in-memory SQLite database.

use sqlx::{Pool, Sqlite};

use fabric_controller::{
    config::DatabaseConfig,
    database::Database,
    errors::RepositoryError,
    models::{
        Element, ElementInstanceCreateRequest, ElementInstanceKind, ElementInstanceUpdateRequest,
        NetworkTunnelRequest,
    },
    repositories::{traits::Repository, ElementInstanceQuery, ElementInstanceRepository},
    utils::ids,
};

/// Helper to create an in-memory database with migrations applied
async fn create_test_database() -> (Database, Pool<Sqlite>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let db_config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: Some(10),
    };

    let database = Database::new(&db_config)
        .await
        .expect("Failed to create in-memory database");
    database.migrate().await.expect("Failed to run migrations");
    let pool = database.pool();
    (database, pool)
}

fn sample_create_request(uuid: &str) -> ElementInstanceCreateRequest {
    ElementInstanceCreateRequest {
        uuid: uuid.to_string(),
        track_id: 0,
        element_key: 4,
        config: r#"{"memoryLimit":512}"#.to_string(),
        name: "Sensor Aggregator".to_string(),
        last_updated: 1_700_000_000_000,
        config_last_updated: 1_700_000_000_000,
        updated_by: 1,
        kind: ElementInstanceKind::Regular,
        registry_id: Some(1),
        rebuild: false,
        root_host_access: false,
        log_size: 10.0,
        fabric_instance_id: Some("fabric-host-1".to_string()),
    }
}

#[tokio::test]
async fn create_then_find_by_uuid_round_trips() {
    let (_db, pool) = create_test_database().await;
    let repo = ElementInstanceRepository::new(pool);

    let uuid = ids::generate_instance_id();
    let created = repo.create(sample_create_request(&uuid)).await.unwrap();
    assert_eq!(created.uuid, uuid);

    let found = repo
        .find_by_uuid(&uuid)
        .await
        .unwrap()
        .expect("instance should exist after create");
    assert_eq!(found, created);
}

#[tokio::test]
async fn find_by_uuid_returns_none_for_unknown_id() {
    let (_db, pool) = create_test_database().await;
    let repo = ElementInstanceRepository::new(pool);

    let found = repo.find_by_uuid("does-not-exist").await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn create_rejects_duplicate_uuid() {
    let (_db, pool) = create_test_database().await;
    let repo = ElementInstanceRepository::new(pool);

    let uuid = ids::generate_instance_id();
    repo.create(sample_create_request(&uuid)).await.unwrap();

    let err = repo
        .create(sample_create_request(&uuid))
        .await
        .expect_err("duplicate uuid must be rejected");
    assert!(matches!(err, RepositoryError::ConstraintViolation { .. }));
}

#[tokio::test]
async fn create_with_defaults_populates_defaults() {
    let (_db, pool) = create_test_database().await;
    let repo = ElementInstanceRepository::new(pool);

    let element = Element {
        id: 12,
        name: "mqtt-bridge".to_string(),
        registry_id: Some(7),
    };

    let created = repo
        .create_with_defaults(&element, 1, 0, "X", 10.0)
        .await
        .unwrap();

    assert_eq!(created.uuid.len(), 32);
    assert_eq!(created.config, "{}");
    assert_eq!(created.name, "X");
    assert_eq!(created.element_key, 12);
    assert_eq!(created.registry_id, Some(7));
    assert_eq!(created.kind, ElementInstanceKind::Regular);
    assert_eq!(created.log_size, 10.0);
    assert_eq!(created.fabric_instance_id, None);
    assert!(created.last_updated > 0);
    assert_eq!(created.config_last_updated, created.last_updated);

    // The returned instance matches what was persisted
    let found = repo.find_by_uuid(&created.uuid).await.unwrap().unwrap();
    assert_eq!(found, created);
}

#[tokio::test]
async fn generated_instance_ids_are_unique() {
    let (_db, pool) = create_test_database().await;
    let repo = ElementInstanceRepository::new(pool);

    let element = Element {
        id: 3,
        name: "opc-ua-collector".to_string(),
        registry_id: None,
    };

    let first = repo
        .create_with_defaults(&element, 1, 0, "collector-a", 10.0)
        .await
        .unwrap();
    let second = repo
        .create_with_defaults(&element, 1, 0, "collector-b", 10.0)
        .await
        .unwrap();

    assert_ne!(first.uuid, second.uuid);
}

#[tokio::test]
async fn stream_viewer_factory_seeds_viewer_config() {
    let (_db, pool) = create_test_database().await;
    let repo = ElementInstanceRepository::new(pool);

    let created = repo
        .create_stream_viewer(21, 1, "fabric-host-1")
        .await
        .unwrap();

    assert_eq!(created.name, "Stream Viewer");
    assert_eq!(created.kind, ElementInstanceKind::StreamViewer);
    assert_eq!(created.track_id, 0);
    assert_eq!(created.element_key, 21);
    assert_eq!(created.registry_id, None);
    assert_eq!(created.log_size, 50.0);
    assert_eq!(
        created.fabric_instance_id.as_deref(),
        Some("fabric-host-1")
    );

    let config = created.config_value().unwrap();
    assert_eq!(config["foldersizelimit"], 200.0);
    let token = config["accesstoken"].as_str().unwrap();
    assert_eq!(token.len(), 32);
    assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[tokio::test]
async fn debug_console_factory_seeds_console_config() {
    let (_db, pool) = create_test_database().await;
    let repo = ElementInstanceRepository::new(pool);

    let created = repo
        .create_debug_console(22, 2, "fabric-host-1")
        .await
        .unwrap();

    assert_eq!(created.name, "Debug Console");
    assert_eq!(created.kind, ElementInstanceKind::DebugConsole);
    assert_eq!(created.updated_by, 2);
    assert_eq!(created.log_size, 50.0);

    let config = created.config_value().unwrap();
    assert_eq!(config["filesizelimit"], 200.0);
    assert_eq!(config["accesstoken"].as_str().unwrap().len(), 32);
}

#[tokio::test]
async fn network_factory_builds_tunnel_config() {
    let (_db, pool) = create_test_database().await;
    let repo = ElementInstanceRepository::new(pool);

    let element = Element {
        id: 30,
        name: "network-relay".to_string(),
        registry_id: Some(2),
    };
    let tunnel = NetworkTunnelRequest {
        remote_host: "relay.example.com".to_string(),
        remote_port: 443,
        name: "Network for sensor feed".to_string(),
        local_port: 8007,
    };

    let created = repo
        .create_network(&element, 1, "fabric-host-1", tunnel)
        .await
        .unwrap();

    assert_eq!(created.kind, ElementInstanceKind::Network);
    assert_eq!(created.name, "Network for sensor feed");
    assert_eq!(created.registry_id, Some(2));
    assert_eq!(created.log_size, 50.0);

    let config = created.config_value().unwrap();
    assert_eq!(config["mode"], "public");
    assert_eq!(config["host"], "relay.example.com");
    assert_eq!(config["port"], 443);
    assert_eq!(config["connectioncount"], 60);
    assert_eq!(config["localhost"], "iofabric");
    assert_eq!(config["localport"], 8007);
    assert_eq!(config["heartbeatfrequency"], 20000);
    assert_eq!(config["heartbeatabsencethreshold"], 60000);
    assert_eq!(config["passcode"].as_str().unwrap().len(), 32);
}

#[tokio::test]
async fn update_by_uuid_applies_partial_fields() {
    let (_db, pool) = create_test_database().await;
    let repo = ElementInstanceRepository::new(pool);

    let uuid = ids::generate_instance_id();
    let created = repo.create(sample_create_request(&uuid)).await.unwrap();

    let rows = repo
        .update_by_uuid(
            &uuid,
            ElementInstanceUpdateRequest {
                name: Some("Renamed Aggregator".to_string()),
                config: Some(r#"{"memoryLimit":1024}"#.to_string()),
                config_last_updated: Some(1_700_000_100_000),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(rows, 1);

    let updated = repo.find_by_uuid(&uuid).await.unwrap().unwrap();
    assert_eq!(updated.name, "Renamed Aggregator");
    assert_eq!(updated.config, r#"{"memoryLimit":1024}"#);
    assert_eq!(updated.config_last_updated, 1_700_000_100_000);

    // Untouched fields keep their values, including last_updated - the
    // repository never stamps timestamps on update.
    assert_eq!(updated.element_key, created.element_key);
    assert_eq!(updated.last_updated, created.last_updated);
    assert_eq!(updated.kind, created.kind);
}

#[tokio::test]
async fn update_by_uuid_returns_zero_for_unknown_id() {
    let (_db, pool) = create_test_database().await;
    let repo = ElementInstanceRepository::new(pool);

    let rows = repo
        .update_by_uuid(
            "missing",
            ElementInstanceUpdateRequest {
                name: Some("anything".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn empty_update_is_a_no_op() {
    let (_db, pool) = create_test_database().await;
    let repo = ElementInstanceRepository::new(pool);

    let uuid = ids::generate_instance_id();
    let created = repo.create(sample_create_request(&uuid)).await.unwrap();

    let rows = repo
        .update_by_uuid(&uuid, ElementInstanceUpdateRequest::default())
        .await
        .unwrap();
    assert_eq!(rows, 0);

    let found = repo.find_by_uuid(&uuid).await.unwrap().unwrap();
    assert_eq!(found, created);
}

#[tokio::test]
async fn update_kind_rewrites_role_flags() {
    let (_db, pool) = create_test_database().await;
    let repo = ElementInstanceRepository::new(pool);

    let uuid = ids::generate_instance_id();
    repo.create(sample_create_request(&uuid)).await.unwrap();

    let rows = repo
        .update_by_uuid(
            &uuid,
            ElementInstanceUpdateRequest {
                kind: Some(ElementInstanceKind::Network),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(rows, 1);

    let updated = repo.find_by_uuid(&uuid).await.unwrap().unwrap();
    assert_eq!(updated.kind, ElementInstanceKind::Network);
}

#[tokio::test]
async fn delete_by_uuid_removes_the_row() {
    let (_db, pool) = create_test_database().await;
    let repo = ElementInstanceRepository::new(pool);

    let uuid = ids::generate_instance_id();
    repo.create(sample_create_request(&uuid)).await.unwrap();

    let rows = repo.delete_by_uuid(&uuid).await.unwrap();
    assert_eq!(rows, 1);
    assert!(repo.find_by_uuid(&uuid).await.unwrap().is_none());

    // Deleting again affects nothing
    let rows = repo.delete_by_uuid(&uuid).await.unwrap();
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn find_by_track_id_returns_all_instances_on_the_track() {
    let (_db, pool) = create_test_database().await;
    let repo = ElementInstanceRepository::new(pool);

    for _ in 0..2 {
        let mut request = sample_create_request(&ids::generate_instance_id());
        request.track_id = 5;
        repo.create(request).await.unwrap();
    }
    repo.create(sample_create_request(&ids::generate_instance_id()))
        .await
        .unwrap();

    let on_track = repo.find_by_track_id(5).await.unwrap();
    assert_eq!(on_track.len(), 2);
    assert!(on_track.iter().all(|i| i.track_id == 5));

    let empty = repo.find_by_track_id(99).await.unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
async fn find_all_and_count_honor_query_filters() {
    let (_db, pool) = create_test_database().await;
    let repo = ElementInstanceRepository::new(pool.clone());

    repo.create_stream_viewer(21, 1, "fabric-host-1")
        .await
        .unwrap();
    repo.create_debug_console(22, 1, "fabric-host-1")
        .await
        .unwrap();
    repo.create_stream_viewer(21, 1, "fabric-host-2")
        .await
        .unwrap();

    let viewers = repo
        .find_all(ElementInstanceQuery::new().kind(ElementInstanceKind::StreamViewer))
        .await
        .unwrap();
    assert_eq!(viewers.len(), 2);

    let on_host = repo
        .find_all(
            ElementInstanceQuery::new()
                .kind(ElementInstanceKind::StreamViewer)
                .fabric_instance_id("fabric-host-1"),
        )
        .await
        .unwrap();
    assert_eq!(on_host.len(), 1);

    let total = repo.count(ElementInstanceQuery::new()).await.unwrap();
    assert_eq!(total, 3);

    let consoles = repo
        .count(ElementInstanceQuery::new().kind(ElementInstanceKind::DebugConsole))
        .await
        .unwrap();
    assert_eq!(consoles, 1);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let (db, pool) = create_test_database().await;

    // A second run must not fail or re-apply anything
    db.migrate().await.expect("re-running migrations failed");

    let repo = ElementInstanceRepository::new(pool);
    let uuid = ids::generate_instance_id();
    repo.create(sample_create_request(&uuid)).await.unwrap();
    assert!(repo.find_by_uuid(&uuid).await.unwrap().is_some());
}
