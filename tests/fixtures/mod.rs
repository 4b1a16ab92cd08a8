//! Test fixtures for gap-reconstructor.
//!
//! Provides realistic test data including:
//! - Real Slovak city locations (from OpenStreetMap)
//! - Builders for checkpoints and templates

#![allow(dead_code)]

pub mod slovak_locations;

pub use slovak_locations::*;

use chrono::{DateTime, Duration, TimeZone, Utc, Weekday};
use gap_reconstructor::{Checkpoint, Coordinate, Template};

/// Monday 2024-03-04 08:00 UTC.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap()
}

pub fn checkpoint_at(id: &str, location: &Location, day_offset: i64, odometer_km: u64) -> Checkpoint {
    Checkpoint::new(id, "car-1", base_time() + Duration::days(day_offset), odometer_km)
        .with_coordinates(location.lat, location.lng)
        .with_address(location.address)
}

/// Builder for test templates with sensible defaults.
#[derive(Clone, Debug)]
pub struct TemplateBuilder {
    template: Template,
}

impl TemplateBuilder {
    pub fn new(id: &str, from: &Location, to: &Location) -> Self {
        Self {
            template: Template::new(
                id,
                format!("{} - {}", from.name, to.name),
                Coordinate::new(from.lat, from.lng),
                Coordinate::new(to.lat, to.lng),
            ),
        }
    }

    pub fn distance(mut self, km: f64) -> Self {
        self.template.distance_km = Some(km);
        self
    }

    pub fn round_trip(mut self) -> Self {
        self.template.is_round_trip = true;
        self
    }

    pub fn on(mut self, day: Weekday) -> Self {
        self.template.typical_days.push(day);
        self
    }

    pub fn addresses(mut self, from: &Location, to: &Location) -> Self {
        self.template.from_address = Some(from.address.to_string());
        self.template.to_address = Some(to.address.to_string());
        self
    }

    pub fn build(self) -> Template {
        self.template
    }
}
