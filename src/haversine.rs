//! Great-circle distance and the discrete geo confidence score.
//!
//! Straight-line distance only; road distance is never consulted.

use crate::config::{EngineConfig, GeoBracket};
use crate::model::Coordinate;

/// Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculate haversine distance between two (lat, lng) points in meters.
pub fn haversine_m(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Maps endpoint distances to a 0-100 confidence score.
#[derive(Debug, Clone)]
pub struct GeoScorer {
    brackets: Vec<GeoBracket>,
}

impl Default for GeoScorer {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl GeoScorer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            brackets: config.geo_brackets.clone(),
        }
    }

    pub fn distance(&self, a: Coordinate, b: Coordinate) -> f64 {
        haversine_m(a.as_tuple(), b.as_tuple())
    }

    /// Step function over the brackets. Upper bounds are exclusive, so a
    /// distance equal to a boundary falls into the looser bracket.
    pub fn score(&self, distance_m: f64) -> f64 {
        self.brackets
            .iter()
            .find(|bracket| distance_m < bracket.max_meters)
            .map(|bracket| bracket.score)
            .unwrap_or(0.0)
    }
}
