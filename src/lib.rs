//! gap-reconstructor
//!
//! Reconstructs missing trips between two odometer checkpoints by matching
//! the unexplained gap against a library of recurring route templates.

pub mod model;
pub mod config;
pub mod error;
pub mod haversine;
pub mod address;
pub mod gap;
pub mod matcher;
pub mod planner;
pub mod traits;
pub mod store;
pub mod tools;

pub use config::EngineConfig;
pub use error::{EngineError, ErrorCode, Result};
pub use model::{Checkpoint, Coordinate, Template, TripPurpose};
