use serde::{Deserialize, Serialize};

pub mod data_track;
pub mod element_instance;
pub mod network_pairing;

pub use data_track::{DataTrack, DataTrackCreateRequest};
pub use element_instance::{
    DebugConsoleConfig, ElementInstance, ElementInstanceCreateRequest, ElementInstanceKind,
    ElementInstanceUpdateRequest, ElementInstanceWithTrack, InstanceRoleFlags,
    NetworkInstanceConfig, NetworkTunnelRequest, StreamViewerConfig,
};
pub use network_pairing::{NetworkPairing, NetworkPairingCreateRequest};

/// Catalog definition of a deployable element.
///
/// Owned by the element catalog; this layer only reads `id` and
/// `registry_id` when instantiating the element onto a fabric host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    pub id: i64,
    pub name: String,
    pub registry_id: Option<i64>,
}
