//! Typed input records: checkpoints and route templates.
//!
//! Coordinates are the authoritative identity of a route endpoint; addresses
//! are advisory and always optional.

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// (lat, lng) tuple, the shape the distance functions take.
    pub fn as_tuple(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err(EngineError::Validation(format!(
                "coordinate ({}, {}) is not finite",
                self.lat, self.lng
            )));
        }
        if !(-90.0..=90.0).contains(&self.lat) || !(-180.0..=180.0).contains(&self.lng) {
            return Err(EngineError::Validation(format!(
                "coordinate ({}, {}) is out of range",
                self.lat, self.lng
            )));
        }
        Ok(())
    }
}

/// A dated odometer reading for one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: String,
    pub vehicle_id: String,
    pub timestamp: DateTime<Utc>,
    pub odometer_km: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Checkpoint {
    pub fn new(
        id: impl Into<String>,
        vehicle_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        odometer_km: u64,
    ) -> Self {
        Self {
            id: id.into(),
            vehicle_id: vehicle_id.into(),
            timestamp,
            odometer_km,
            coordinates: None,
            address: None,
        }
    }

    pub fn with_coordinates(mut self, lat: f64, lng: f64) -> Self {
        self.coordinates = Some(Coordinate::new(lat, lng));
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn has_gps(&self) -> bool {
        self.coordinates.is_some()
    }
}

/// Tax classification of a trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripPurpose {
    #[default]
    Business,
    Personal,
}

/// A recurring route definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub from_coords: Coordinate,
    pub to_coords: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>,
    /// Typical one-way distance in kilometers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub is_round_trip: bool,
    #[serde(default)]
    pub typical_days: Vec<Weekday>,
    #[serde(default)]
    pub purpose: TripPurpose,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_description: Option<String>,
}

impl Template {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        from_coords: Coordinate,
        to_coords: Coordinate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            from_coords,
            to_coords,
            from_address: None,
            to_address: None,
            distance_km: None,
            is_round_trip: false,
            typical_days: Vec::new(),
            purpose: TripPurpose::Business,
            business_description: None,
        }
    }

    /// Distance covered by one use of the template: doubled for round trips.
    /// `None` when the template declares no usable distance.
    pub fn effective_distance_km(&self) -> Option<f64> {
        let one_way = self.distance_km.filter(|d| d.is_finite() && *d > 0.0)?;
        Some(if self.is_round_trip { one_way * 2.0 } else { one_way })
    }

    pub fn validate(&self) -> Result<()> {
        self.from_coords.validate().map_err(|err| {
            EngineError::Validation(format!("template '{}' from_coords: {}", self.id, err.message()))
        })?;
        self.to_coords.validate().map_err(|err| {
            EngineError::Validation(format!("template '{}' to_coords: {}", self.id, err.message()))
        })?;
        if let Some(distance) = self.distance_km {
            if !distance.is_finite() || distance < 0.0 {
                return Err(EngineError::Validation(format!(
                    "template '{}' has invalid distance_km {}",
                    self.id, distance
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinate::new(48.1486, 17.1077).validate().is_ok());
        assert!(Coordinate::new(91.0, 17.0).validate().is_err());
        assert!(Coordinate::new(48.0, -181.0).validate().is_err());
        assert!(Coordinate::new(f64::NAN, 17.0).validate().is_err());
    }

    #[test]
    fn test_effective_distance() {
        let mut template = Template::new("t1", "Office", Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0));
        assert_eq!(template.effective_distance_km(), None);

        template.distance_km = Some(0.0);
        assert_eq!(template.effective_distance_km(), None);

        template.distance_km = Some(410.0);
        assert_eq!(template.effective_distance_km(), Some(410.0));

        template.is_round_trip = true;
        assert_eq!(template.effective_distance_km(), Some(820.0));
    }

    #[test]
    fn test_template_decodes_with_defaults() {
        let json = r#"{
            "id": "t1",
            "name": "Bratislava - Kosice",
            "from_coords": {"lat": 48.1486, "lng": 17.1077},
            "to_coords": {"lat": 48.7164, "lng": 21.2611},
            "typical_days": ["Mon", "friday"]
        }"#;
        let template: Template = serde_json::from_str(json).unwrap();
        assert!(!template.is_round_trip);
        assert_eq!(template.purpose, TripPurpose::Business);
        assert_eq!(template.typical_days, vec![Weekday::Mon, Weekday::Fri]);
    }

    #[test]
    fn test_template_requires_coordinates() {
        let json = r#"{"id": "t1", "name": "No coords", "from_coords": {"lat": 48.0, "lng": 17.0}}"#;
        assert!(serde_json::from_str::<Template>(json).is_err());
    }

    #[test]
    fn test_checkpoint_requires_odometer() {
        let json = r#"{"id": "c1", "vehicle_id": "v1", "timestamp": "2024-03-04T08:00:00Z"}"#;
        assert!(serde_json::from_str::<Checkpoint>(json).is_err());

        let json = r#"{"id": "c1", "vehicle_id": "v1", "timestamp": "2024-03-04T08:00:00Z", "odometer_km": 1200}"#;
        let checkpoint: Checkpoint = serde_json::from_str(json).unwrap();
        assert_eq!(checkpoint.odometer_km, 1200);
        assert_eq!(checkpoint.timestamp, Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap());
        assert!(!checkpoint.has_gps());
    }
}
