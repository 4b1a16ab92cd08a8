//! Greedy reconstruction planner.
//!
//! Walks ranked template matches and allocates whole repetitions of each
//! template until the gap distance is covered. Not an optimal packing: the
//! first template that fits takes as much of the gap as it can.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::gap::Gap;
use crate::matcher::TemplateMatch;
use crate::model::{Template, TripPurpose};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconstructionQuality {
    Excellent,
    Good,
    Partial,
    Poor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Allocation<'a> {
    pub template: &'a Template,
    pub num_trips: u64,
    /// Declared one-way distance of the template.
    pub distance_km: f64,
    pub is_round_trip: bool,
    pub total_distance_km: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructionProposal<'a> {
    pub allocations: Vec<Allocation<'a>>,
    pub gap_distance_km: f64,
    pub reconstructed_km: f64,
    pub remaining_km: f64,
    pub coverage_percent: f64,
    pub quality: ReconstructionQuality,
    /// Set when no allocation could be made.
    pub message: Option<String>,
}

impl ReconstructionProposal<'_> {
    pub fn has_proposal(&self) -> bool {
        !self.allocations.is_empty()
    }
}

/// One concrete, dated trip expanded from an allocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripDraft {
    pub template_id: String,
    pub template_name: String,
    pub date: NaiveDate,
    pub start_odometer_km: u64,
    pub end_odometer_km: u64,
    pub distance_km: f64,
    pub is_round_trip: bool,
    pub purpose: TripPurpose,
}

#[derive(Debug, Clone)]
pub struct ReconstructionPlanner {
    min_remaining_km: f64,
    max_trips_per_template: u64,
    excellent_coverage: f64,
    good_coverage: f64,
    partial_coverage: f64,
}

impl Default for ReconstructionPlanner {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl ReconstructionPlanner {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            min_remaining_km: config.min_remaining_km,
            max_trips_per_template: config.max_trips_per_template,
            excellent_coverage: config.excellent_coverage,
            good_coverage: config.good_coverage,
            partial_coverage: config.partial_coverage,
        }
    }

    pub fn quality(&self, coverage_percent: f64) -> ReconstructionQuality {
        if coverage_percent >= self.excellent_coverage {
            ReconstructionQuality::Excellent
        } else if coverage_percent >= self.good_coverage {
            ReconstructionQuality::Good
        } else if coverage_percent >= self.partial_coverage {
            ReconstructionQuality::Partial
        } else {
            ReconstructionQuality::Poor
        }
    }

    /// Fails with `EngineError::Execution` when a template's distance is so
    /// small that it would need more than `max_trips_per_template` repetitions.
    pub fn plan<'a>(&self, gap: &Gap, matches: &[TemplateMatch<'a>]) -> Result<ReconstructionProposal<'a>> {
        let gap_distance_km = gap.distance_km as f64;

        if matches.is_empty() {
            debug!(gap_distance_km, "no matched templates, nothing to propose");
            return Ok(self.finish(
                gap_distance_km,
                Vec::new(),
                gap_distance_km,
                Some("No templates matched the gap above the confidence threshold".to_string()),
            ));
        }

        let mut remaining = gap_distance_km;
        let mut allocations = Vec::new();

        for candidate in matches {
            if remaining < self.min_remaining_km {
                break;
            }

            let template = candidate.template;
            let Some(effective_km) = template.effective_distance_km() else {
                debug!(template_id = %template.id, "skipping template without a typical distance");
                continue;
            };

            let repetitions = (remaining / effective_km).floor();
            if repetitions < 1.0 {
                debug!(
                    template_id = %template.id,
                    effective_km,
                    remaining,
                    "template longer than remaining gap"
                );
                continue;
            }

            if repetitions > self.max_trips_per_template as f64 {
                return Err(EngineError::Execution(format!(
                    "template '{}' would need {} trips of {} km, more than the limit of {}",
                    template.id, repetitions, effective_km, self.max_trips_per_template
                )));
            }
            let num_trips = repetitions as u64;
            let total_distance_km = num_trips as f64 * effective_km;
            remaining -= total_distance_km;

            debug!(
                template_id = %template.id,
                num_trips,
                total_distance_km,
                remaining,
                "allocated template"
            );

            allocations.push(Allocation {
                template,
                num_trips,
                distance_km: template.distance_km.unwrap_or_default(),
                is_round_trip: template.is_round_trip,
                total_distance_km,
                confidence: candidate.confidence,
            });
        }

        let message = allocations
            .is_empty()
            .then(|| "No matched template fits within the gap distance".to_string());
        Ok(self.finish(gap_distance_km, allocations, remaining, message))
    }

    fn finish<'a>(
        &self,
        gap_distance_km: f64,
        allocations: Vec<Allocation<'a>>,
        remaining_km: f64,
        message: Option<String>,
    ) -> ReconstructionProposal<'a> {
        let reconstructed_km = gap_distance_km - remaining_km;
        let coverage_percent = if gap_distance_km > 0.0 {
            (reconstructed_km / gap_distance_km * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        let quality = self.quality(coverage_percent);

        info!(
            allocations = allocations.len(),
            reconstructed_km,
            remaining_km,
            coverage_percent,
            ?quality,
            "reconstruction planned"
        );

        ReconstructionProposal {
            allocations,
            gap_distance_km,
            reconstructed_km,
            remaining_km,
            coverage_percent,
            quality,
            message,
        }
    }
}

/// Expands a proposal into dated trips inside the gap window.
///
/// Each template's trips land on its typical weekdays when any fall inside
/// the window, otherwise they cycle over every day of the window. Odometer
/// readings accumulate from the gap's start checkpoint in date order.
pub fn draft_trips(gap: &Gap, proposal: &ReconstructionProposal<'_>) -> Vec<TripDraft> {
    let first_day = gap.start.timestamp.date_naive();
    let last_day = gap.end.timestamp.date_naive();
    let window: Vec<NaiveDate> = first_day
        .iter_days()
        .take_while(|day| *day <= last_day)
        .collect();
    if window.is_empty() {
        return Vec::new();
    }

    let mut scheduled: Vec<(NaiveDate, &Allocation<'_>)> = Vec::new();
    for allocation in &proposal.allocations {
        let typical: Vec<NaiveDate> = window
            .iter()
            .copied()
            .filter(|day| allocation.template.typical_days.contains(&day.weekday()))
            .collect();
        let days = if typical.is_empty() { &window } else { &typical };

        for trip in 0..allocation.num_trips as usize {
            scheduled.push((days[trip % days.len()], allocation));
        }
    }
    scheduled.sort_by_key(|(day, _)| *day);

    let mut odometer = gap.start.odometer_km as f64;
    scheduled
        .into_iter()
        .map(|(date, allocation)| {
            let trip_km = allocation.total_distance_km / allocation.num_trips as f64;
            let start_odometer_km = odometer.round() as u64;
            odometer += trip_km;
            TripDraft {
                template_id: allocation.template.id.clone(),
                template_name: allocation.template.name.clone(),
                date,
                start_odometer_km,
                end_odometer_km: odometer.round() as u64,
                distance_km: trip_km,
                is_round_trip: allocation.is_round_trip,
                purpose: allocation.template.purpose,
            }
        })
        .collect()
}
