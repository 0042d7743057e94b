//! Data track domain model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A track groups element instances into a pipeline; its activation flag
/// gates whether the instances are visible to their fabric host.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct DataTrack {
    pub id: i64,
    pub name: String,
    pub is_activated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataTrackCreateRequest {
    pub name: String,
    pub is_activated: bool,
}
