//! Repository pattern implementation for data access
//!
//! This module provides a clean abstraction layer over the database,
//! separating controller business logic from persistence concerns. Each
//! repository is explicitly constructed with a pool handle - there are no
//! module-level singletons.

pub mod data_track;
pub mod element_instance;
pub mod network_pairing;
pub mod traits;

// Re-export main traits and types
pub use data_track::DataTrackRepository;
pub use element_instance::{ElementInstanceQuery, ElementInstanceRepository};
pub use network_pairing::NetworkPairingRepository;
pub use traits::*;
