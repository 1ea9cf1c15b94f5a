//! Verification service components
//!
//! The submission pipeline composes the leaf services in gate order:
//! preprocess, geofence, verification backend, verdict, state mutation.

pub mod achievements;
pub mod blob_store;
pub mod geofence;
pub mod hosted;
pub mod local;
pub mod pipeline;
pub mod preprocess;
pub mod verdict;
pub mod verify;
