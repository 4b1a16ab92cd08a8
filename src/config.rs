//! Scoring and planning constants.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// One step of the geo score function: distances strictly below
/// `max_meters` score `score`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBracket {
    pub max_meters: f64,
    pub score: f64,
}

/// Relative distance-fit tier: a relative difference strictly below
/// `max_relative_diff` earns `bonus`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceFitTier {
    pub max_relative_diff: f64,
    pub bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ordered by ascending `max_meters`. Anything beyond the last bracket scores 0.
    pub geo_brackets: Vec<GeoBracket>,
    pub geo_weight: f64,
    pub address_weight: f64,
    pub city_match_points: f64,
    pub street_similarity_points: f64,
    pub full_similarity_points: f64,
    /// Ordered by ascending `max_relative_diff`.
    pub distance_fit_tiers: Vec<DistanceFitTier>,
    pub weekday_bonus: f64,
    pub default_confidence_threshold: f64,
    pub recommend_min_distance_km: f64,
    pub recommend_min_days: f64,
    /// Planning stops once the unexplained distance drops below this.
    pub min_remaining_km: f64,
    /// Upper bound on repetitions of a single template in one proposal.
    pub max_trips_per_template: u64,
    pub excellent_coverage: f64,
    pub good_coverage: f64,
    pub partial_coverage: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            geo_brackets: vec![
                GeoBracket { max_meters: 100.0, score: 100.0 },
                GeoBracket { max_meters: 500.0, score: 90.0 },
                GeoBracket { max_meters: 2000.0, score: 70.0 },
                GeoBracket { max_meters: 5000.0, score: 40.0 },
            ],
            geo_weight: 0.7,
            address_weight: 0.3,
            city_match_points: 40.0,
            street_similarity_points: 30.0,
            full_similarity_points: 30.0,
            distance_fit_tiers: vec![
                DistanceFitTier { max_relative_diff: 0.10, bonus: 10.0 },
                DistanceFitTier { max_relative_diff: 0.20, bonus: 5.0 },
            ],
            weekday_bonus: 10.0,
            default_confidence_threshold: 70.0,
            recommend_min_distance_km: 100.0,
            recommend_min_days: 7.0,
            min_remaining_km: 50.0,
            max_trips_per_template: 10_000,
            excellent_coverage: 90.0,
            good_coverage: 70.0,
            partial_coverage: 50.0,
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON override on top of the defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let scalars = [
            ("geo_weight", self.geo_weight),
            ("address_weight", self.address_weight),
            ("city_match_points", self.city_match_points),
            ("street_similarity_points", self.street_similarity_points),
            ("full_similarity_points", self.full_similarity_points),
            ("weekday_bonus", self.weekday_bonus),
            ("default_confidence_threshold", self.default_confidence_threshold),
            ("recommend_min_distance_km", self.recommend_min_distance_km),
            ("recommend_min_days", self.recommend_min_days),
            ("min_remaining_km", self.min_remaining_km),
            ("excellent_coverage", self.excellent_coverage),
            ("good_coverage", self.good_coverage),
            ("partial_coverage", self.partial_coverage),
        ];
        for (name, value) in scalars {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::Validation(format!(
                    "config field {} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if self.max_trips_per_template == 0 {
            return Err(EngineError::Validation(
                "max_trips_per_template must be at least 1".to_string(),
            ));
        }

        let brackets_sorted = self
            .geo_brackets
            .windows(2)
            .all(|pair| pair[0].max_meters < pair[1].max_meters);
        if !brackets_sorted {
            return Err(EngineError::Validation(
                "geo_brackets must be sorted by ascending max_meters".to_string(),
            ));
        }

        let tiers_sorted = self
            .distance_fit_tiers
            .windows(2)
            .all(|pair| pair[0].max_relative_diff < pair[1].max_relative_diff);
        if !tiers_sorted {
            return Err(EngineError::Validation(
                "distance_fit_tiers must be sorted by ascending max_relative_diff".to_string(),
            ));
        }

        Ok(())
    }
}
