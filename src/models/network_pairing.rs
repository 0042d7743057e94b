//! Network pairing domain model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Links a logical element id to up to two network-tunnel instances.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct NetworkPairing {
    pub id: i64,
    pub element_id1: String,
    pub network_element_id1: Option<String>,
    pub network_element_id2: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkPairingCreateRequest {
    pub element_id1: String,
    pub network_element_id1: Option<String>,
    pub network_element_id2: Option<String>,
}
