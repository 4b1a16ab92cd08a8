//! Gap analysis between two checkpoints of the same vehicle.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::model::Checkpoint;

const SECONDS_PER_DAY: f64 = 86_400.0;
const SECONDS_PER_HOUR: f64 = 3_600.0;

/// The unexplained distance/time span between two checkpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub distance_km: u64,
    pub days: f64,
    pub hours: f64,
    #[serde(rename = "start_checkpoint")]
    pub start: Checkpoint,
    #[serde(rename = "end_checkpoint")]
    pub end: Checkpoint,
    pub has_gps: bool,
    #[serde(rename = "avg_km_per_day")]
    pub average_km_per_day: f64,
    pub reconstruction_recommended: bool,
}

#[derive(Debug, Clone)]
pub struct GapAnalyzer {
    recommend_min_distance_km: f64,
    recommend_min_days: f64,
}

impl Default for GapAnalyzer {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl GapAnalyzer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            recommend_min_distance_km: config.recommend_min_distance_km,
            recommend_min_days: config.recommend_min_days,
        }
    }

    pub fn analyze(&self, start: &Checkpoint, end: &Checkpoint) -> Result<Gap> {
        if start.vehicle_id != end.vehicle_id {
            return Err(EngineError::Validation(format!(
                "checkpoints belong to different vehicles ({} vs {})",
                start.vehicle_id, end.vehicle_id
            )));
        }

        if end.odometer_km < start.odometer_km {
            return Err(EngineError::Validation(format!(
                "odometer regression: end checkpoint {} reads {} km, start checkpoint {} reads {} km",
                end.id, end.odometer_km, start.id, start.odometer_km
            )));
        }

        if end.timestamp < start.timestamp {
            return Err(EngineError::Validation(format!(
                "time regression: end checkpoint {} ({}) precedes start checkpoint {} ({})",
                end.id, end.timestamp, start.id, start.timestamp
            )));
        }

        let distance_km = end.odometer_km - start.odometer_km;
        let elapsed_secs = (end.timestamp - start.timestamp).num_seconds() as f64;
        let days = elapsed_secs / SECONDS_PER_DAY;
        let hours = elapsed_secs / SECONDS_PER_HOUR;
        let average_km_per_day = if days > 0.0 {
            distance_km as f64 / days
        } else {
            0.0
        };
        let reconstruction_recommended =
            distance_km as f64 >= self.recommend_min_distance_km || days >= self.recommend_min_days;

        debug!(
            vehicle_id = %start.vehicle_id,
            distance_km,
            days,
            reconstruction_recommended,
            "analyzed gap"
        );

        Ok(Gap {
            distance_km,
            days,
            hours,
            start: start.clone(),
            end: end.clone(),
            has_gps: start.has_gps() && end.has_gps(),
            average_km_per_day,
            reconstruction_recommended,
        })
    }

    /// Every consecutive gap in one vehicle's checkpoint history, in time order.
    ///
    /// Odometer regressions are data errors and abort the scan.
    pub fn scan(&self, checkpoints: &[Checkpoint]) -> Result<Vec<Gap>> {
        let Some(first) = checkpoints.first() else {
            return Ok(Vec::new());
        };
        if let Some(other) = checkpoints.iter().find(|c| c.vehicle_id != first.vehicle_id) {
            return Err(EngineError::Validation(format!(
                "checkpoint {} belongs to vehicle {}, expected {}",
                other.id, other.vehicle_id, first.vehicle_id
            )));
        }

        let mut ordered: Vec<&Checkpoint> = checkpoints.iter().collect();
        // Readings taken at the same instant are ordered by odometer, then id.
        ordered.sort_by(|a, b| {
            (a.timestamp, a.odometer_km, &a.id).cmp(&(b.timestamp, b.odometer_km, &b.id))
        });

        let gaps = ordered
            .windows(2)
            .map(|pair| self.analyze(pair[0], pair[1]))
            .collect::<Result<Vec<_>>>()
            .inspect_err(|err| warn!(vehicle_id = %first.vehicle_id, error = %err, "checkpoint sequence rejected"))?;

        debug!(
            vehicle_id = %first.vehicle_id,
            checkpoints = checkpoints.len(),
            recommended = gaps.iter().filter(|gap| gap.reconstruction_recommended).count(),
            "scanned checkpoint history"
        );

        Ok(gaps)
    }
}
