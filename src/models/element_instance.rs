//! Element instance domain model
//!
//! An element instance is a concrete deployment of a catalog element onto a
//! fabric host. Specialized instances (stream viewer, debug console, network
//! tunnel) are persisted with the same row shape; their kind is stored as
//! four mutually exclusive flag columns and surfaced here as
//! [`ElementInstanceKind`], so an instance cannot carry two roles at once in
//! domain code.

use serde::{Deserialize, Serialize};

/// The role of an element instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementInstanceKind {
    /// General-purpose instance, no role flags set
    Regular,
    StreamViewer,
    DebugConsole,
    Manager,
    Network,
}

/// The four persisted role-flag columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstanceRoleFlags {
    pub is_stream_viewer: bool,
    pub is_debug_console: bool,
    pub is_manager: bool,
    pub is_network: bool,
}

impl ElementInstanceKind {
    /// Flag-column values for this kind.
    pub fn flags(&self) -> InstanceRoleFlags {
        match self {
            ElementInstanceKind::Regular => InstanceRoleFlags::default(),
            ElementInstanceKind::StreamViewer => InstanceRoleFlags {
                is_stream_viewer: true,
                ..Default::default()
            },
            ElementInstanceKind::DebugConsole => InstanceRoleFlags {
                is_debug_console: true,
                ..Default::default()
            },
            ElementInstanceKind::Manager => InstanceRoleFlags {
                is_manager: true,
                ..Default::default()
            },
            ElementInstanceKind::Network => InstanceRoleFlags {
                is_network: true,
                ..Default::default()
            },
        }
    }

    /// Recover the kind from stored flag columns.
    ///
    /// Rows written through this crate have at most one flag set. Should a
    /// row carry several (hand-edited data), the first set flag in
    /// stream-viewer, debug-console, manager, network order wins so reads
    /// never fail.
    pub fn from_flags(flags: InstanceRoleFlags) -> Self {
        if flags.is_stream_viewer {
            ElementInstanceKind::StreamViewer
        } else if flags.is_debug_console {
            ElementInstanceKind::DebugConsole
        } else if flags.is_manager {
            ElementInstanceKind::Manager
        } else if flags.is_network {
            ElementInstanceKind::Network
        } else {
            ElementInstanceKind::Regular
        }
    }
}

/// A persisted element instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementInstance {
    /// 32-character identifier, unique and immutable once created
    pub uuid: String,
    /// Owning track, 0 when not attached to a track
    pub track_id: i64,
    /// Catalog element this instance was created from
    pub element_key: i64,
    /// JSON-encoded configuration; stored as an opaque string
    pub config: String,
    pub name: String,
    /// Epoch milliseconds
    pub last_updated: i64,
    /// Epoch milliseconds, moves only when `config` changes
    pub config_last_updated: i64,
    pub updated_by: i64,
    pub kind: ElementInstanceKind,
    pub registry_id: Option<i64>,
    /// Set when the agent should redeploy the instance container
    pub rebuild: bool,
    pub root_host_access: bool,
    /// Log quota in megabytes
    pub log_size: f64,
    /// Owning fabric host, column `iofabric_uuid`
    pub fabric_instance_id: Option<String>,
}

impl ElementInstance {
    /// Parse the stored configuration string as JSON.
    pub fn config_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.config)
    }
}

/// An element instance joined with its track's activation flag.
///
/// `track_activated` is `None` for instances that are not attached to any
/// track (or whose track row is missing).
#[derive(Debug, Clone)]
pub struct ElementInstanceWithTrack {
    pub instance: ElementInstance,
    pub track_activated: Option<bool>,
}

/// Fields for a fully caller-specified insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementInstanceCreateRequest {
    pub uuid: String,
    pub track_id: i64,
    pub element_key: i64,
    pub config: String,
    pub name: String,
    pub last_updated: i64,
    pub config_last_updated: i64,
    pub updated_by: i64,
    pub kind: ElementInstanceKind,
    pub registry_id: Option<i64>,
    pub rebuild: bool,
    pub root_host_access: bool,
    pub log_size: f64,
    pub fabric_instance_id: Option<String>,
}

/// Partial update of an element instance; unset fields are left untouched.
///
/// Timestamps are NOT bumped automatically — callers that change `config`
/// are expected to supply `config_last_updated` (and `last_updated`)
/// themselves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementInstanceUpdateRequest {
    pub track_id: Option<i64>,
    pub element_key: Option<i64>,
    pub config: Option<String>,
    pub name: Option<String>,
    pub last_updated: Option<i64>,
    pub config_last_updated: Option<i64>,
    pub updated_by: Option<i64>,
    pub kind: Option<ElementInstanceKind>,
    pub registry_id: Option<i64>,
    pub rebuild: Option<bool>,
    pub root_host_access: Option<bool>,
    pub log_size: Option<f64>,
    pub fabric_instance_id: Option<String>,
}

/// Caller-supplied parameters for a network tunnel instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkTunnelRequest {
    pub remote_host: String,
    pub remote_port: u16,
    pub name: String,
    pub local_port: u16,
}

/// Default configuration payload for stream viewer instances.
///
/// Field names are the wire format consumed by the fabric agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamViewerConfig {
    pub accesstoken: String,
    pub foldersizelimit: f64,
}

/// Default configuration payload for debug console instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugConsoleConfig {
    pub accesstoken: String,
    pub filesizelimit: f64,
}

/// Configuration payload for network tunnel instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkInstanceConfig {
    pub mode: String,
    pub host: String,
    pub port: u16,
    pub connectioncount: u32,
    pub passcode: String,
    pub localhost: String,
    pub localport: u16,
    pub heartbeatfrequency: u64,
    pub heartbeatabsencethreshold: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_flags() {
        for kind in [
            ElementInstanceKind::Regular,
            ElementInstanceKind::StreamViewer,
            ElementInstanceKind::DebugConsole,
            ElementInstanceKind::Manager,
            ElementInstanceKind::Network,
        ] {
            assert_eq!(ElementInstanceKind::from_flags(kind.flags()), kind);
        }
    }

    #[test]
    fn regular_kind_sets_no_flags() {
        let flags = ElementInstanceKind::Regular.flags();
        assert!(!flags.is_stream_viewer);
        assert!(!flags.is_debug_console);
        assert!(!flags.is_manager);
        assert!(!flags.is_network);
    }

    #[test]
    fn conflicting_flags_resolve_by_precedence() {
        let flags = InstanceRoleFlags {
            is_stream_viewer: true,
            is_network: true,
            ..Default::default()
        };
        assert_eq!(
            ElementInstanceKind::from_flags(flags),
            ElementInstanceKind::StreamViewer
        );
    }

    #[test]
    fn network_config_serializes_with_wire_keys() {
        let config = NetworkInstanceConfig {
            mode: "public".to_string(),
            host: "satellite.example.com".to_string(),
            port: 443,
            connectioncount: 60,
            passcode: "p".repeat(32),
            localhost: "iofabric".to_string(),
            localport: 8007,
            heartbeatfrequency: 20000,
            heartbeatabsencethreshold: 60000,
        };

        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&config).unwrap()).unwrap();
        for key in [
            "mode",
            "host",
            "port",
            "connectioncount",
            "passcode",
            "localhost",
            "localport",
            "heartbeatfrequency",
            "heartbeatabsencethreshold",
        ] {
            assert!(value.get(key).is_some(), "missing wire key: {}", key);
        }
        assert_eq!(value["mode"], "public");
        assert_eq!(value["localhost"], "iofabric");
    }

    #[test]
    fn viewer_config_uses_folder_size_limit_key() {
        let config = StreamViewerConfig {
            accesstoken: "t".repeat(32),
            foldersizelimit: 200.0,
        };
        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&config).unwrap()).unwrap();
        assert_eq!(value["foldersizelimit"], 200.0);
        assert_eq!(value["accesstoken"].as_str().unwrap().len(), 32);
    }
}
