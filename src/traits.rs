//! Seams to external collaborators.
//!
//! The engine never persists anything; callers plug their record store in
//! through these traits.

use crate::error::Result;
use crate::model::Checkpoint;

/// Read access to checkpoint records.
pub trait CheckpointSource {
    /// Resolve a checkpoint by identifier. Unknown identifiers are
    /// `EngineError::NotFound`.
    fn checkpoint(&self, id: &str) -> Result<Checkpoint>;

    /// Every checkpoint recorded for a vehicle, in any order.
    fn vehicle_checkpoints(&self, vehicle_id: &str) -> Result<Vec<Checkpoint>>;
}
