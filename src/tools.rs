//! JSON-in/JSON-out operations for the agent tool layer.
//!
//! Every call returns either the full success payload or
//! `{"error": {"code", "message"}}`; partial results are never emitted.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::gap::{Gap, GapAnalyzer};
use crate::matcher::{EndpointMatch, HybridMatcher, TemplateMatch};
use crate::model::{Checkpoint, Template};
use crate::planner::{ReconstructionPlanner, ReconstructionProposal, ReconstructionQuality};
use crate::traits::CheckpointSource;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Only the checkpoints of a caller-supplied gap are trusted; the derived
/// figures are recomputed.
#[derive(Debug, Deserialize)]
struct GapInput {
    start_checkpoint: Checkpoint,
    end_checkpoint: Checkpoint,
}

#[derive(Debug, Serialize)]
struct EndpointMatchPayload {
    score: f64,
    distance_meters: f64,
    gps_score: f64,
    address_score: f64,
    bonus: f64,
}

impl From<&EndpointMatch> for EndpointMatchPayload {
    fn from(endpoint: &EndpointMatch) -> Self {
        Self {
            score: round1(endpoint.score),
            distance_meters: round1(endpoint.distance_m),
            gps_score: endpoint.geo_score,
            address_score: round1(endpoint.address_score),
            bonus: endpoint.bonus,
        }
    }
}

#[derive(Debug, Serialize)]
struct MatchedTemplatePayload {
    template_id: String,
    template_name: String,
    confidence_score: f64,
    start_match: EndpointMatchPayload,
    end_match: EndpointMatchPayload,
}

impl From<&TemplateMatch<'_>> for MatchedTemplatePayload {
    fn from(matched: &TemplateMatch<'_>) -> Self {
        Self {
            template_id: matched.template.id.clone(),
            template_name: matched.template.name.clone(),
            confidence_score: round1(matched.confidence),
            start_match: (&matched.start_match).into(),
            end_match: (&matched.end_match).into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ProposedTripPayload {
    template_id: String,
    template_name: String,
    num_trips: u64,
    distance_km: f64,
    is_round_trip: bool,
    total_distance_km: f64,
    confidence_score: f64,
}

#[derive(Debug, Serialize)]
struct ProposalPayload {
    has_proposal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    proposed_trips: Vec<ProposedTripPayload>,
    gap_distance_km: f64,
    reconstructed_km: f64,
    remaining_km: f64,
    coverage_percent: f64,
    reconstruction_quality: ReconstructionQuality,
}

impl From<&ReconstructionProposal<'_>> for ProposalPayload {
    fn from(proposal: &ReconstructionProposal<'_>) -> Self {
        Self {
            has_proposal: proposal.has_proposal(),
            message: proposal.message.clone(),
            proposed_trips: proposal
                .allocations
                .iter()
                .map(|allocation| ProposedTripPayload {
                    template_id: allocation.template.id.clone(),
                    template_name: allocation.template.name.clone(),
                    num_trips: allocation.num_trips,
                    distance_km: round1(allocation.distance_km),
                    is_round_trip: allocation.is_round_trip,
                    total_distance_km: round1(allocation.total_distance_km),
                    confidence_score: round1(allocation.confidence),
                })
                .collect(),
            gap_distance_km: round1(proposal.gap_distance_km),
            reconstructed_km: round1(proposal.reconstructed_km),
            remaining_km: round1(proposal.remaining_km),
            coverage_percent: round1(proposal.coverage_percent),
            reconstruction_quality: proposal.quality,
        }
    }
}

#[derive(Debug, Serialize)]
struct MatchTemplatesPayload {
    gap_distance_km: u64,
    templates_evaluated: usize,
    templates_matched: usize,
    matched_templates: Vec<MatchedTemplatePayload>,
    reconstruction_proposal: ProposalPayload,
}

#[derive(Debug, Serialize)]
struct ScanGapsPayload {
    vehicle_id: String,
    checkpoints_examined: usize,
    gaps: Vec<Gap>,
}

pub fn error_value(err: &EngineError) -> Value {
    json!({
        "error": {
            "code": err.code(),
            "message": err.message(),
        }
    })
}

fn respond<T: Serialize>(operation: &str, result: Result<T>) -> Value {
    let value = result.and_then(|payload| {
        serde_json::to_value(payload)
            .map_err(|err| EngineError::Execution(format!("failed to encode response: {}", err)))
    });
    match value {
        Ok(value) => value,
        Err(err) => {
            match &err {
                EngineError::Execution(_) => error!(operation, error = %err, "operation failed"),
                _ => warn!(operation, error = %err, "operation rejected"),
            }
            error_value(&err)
        }
    }
}

/// The engine as seen by the tool layer.
#[derive(Debug, Clone)]
pub struct ReconstructionTools {
    analyzer: GapAnalyzer,
    matcher: HybridMatcher,
    planner: ReconstructionPlanner,
}

impl Default for ReconstructionTools {
    fn default() -> Self {
        Self::from_valid_config(&EngineConfig::default())
    }
}

impl ReconstructionTools {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: &EngineConfig) -> Self {
        Self {
            analyzer: GapAnalyzer::new(config),
            matcher: HybridMatcher::new(config),
            planner: ReconstructionPlanner::new(config),
        }
    }

    /// `detect_gap(start_checkpoint_id, end_checkpoint_id)`.
    pub fn detect_gap<S: CheckpointSource>(&self, source: &S, start_id: &str, end_id: &str) -> Value {
        let result = source.checkpoint(start_id).and_then(|start| {
            let end = source.checkpoint(end_id)?;
            self.analyzer.analyze(&start, &end)
        });
        if let Ok(gap) = &result {
            info!(start_id, end_id, distance_km = gap.distance_km, "gap detected");
        }
        respond("detect_gap", result)
    }

    /// `match_templates(gap_data, templates[], confidence_threshold)`.
    pub fn match_templates(&self, gap_data: &Value, templates: &Value, confidence_threshold: Option<f64>) -> Value {
        respond(
            "match_templates",
            self.try_match_templates(gap_data, templates, confidence_threshold),
        )
    }

    fn try_match_templates(
        &self,
        gap_data: &Value,
        templates: &Value,
        confidence_threshold: Option<f64>,
    ) -> Result<MatchTemplatesPayload> {
        if let Some(threshold) = confidence_threshold {
            if !threshold.is_finite() || !(0.0..=100.0).contains(&threshold) {
                return Err(EngineError::Validation(format!(
                    "confidence_threshold must be within [0, 100], got {}",
                    threshold
                )));
            }
        }

        let input = GapInput::deserialize(gap_data)?;
        let templates = Vec::<Template>::deserialize(templates)?;
        for template in &templates {
            template.validate()?;
        }

        let gap = self.analyzer.analyze(&input.start_checkpoint, &input.end_checkpoint)?;
        let matched = self.matcher.match_templates(&gap, &templates, confidence_threshold)?;
        let proposal = self.planner.plan(&gap, &matched)?;

        Ok(MatchTemplatesPayload {
            gap_distance_km: gap.distance_km,
            templates_evaluated: templates.len(),
            templates_matched: matched.len(),
            matched_templates: matched.iter().map(Into::into).collect(),
            reconstruction_proposal: (&proposal).into(),
        })
    }

    /// `scan_gaps(vehicle_id)`: every consecutive gap in a vehicle's history.
    pub fn scan_gaps<S: CheckpointSource>(&self, source: &S, vehicle_id: &str) -> Value {
        let result = source.vehicle_checkpoints(vehicle_id).and_then(|checkpoints| {
            let gaps = self.analyzer.scan(&checkpoints)?;
            Ok(ScanGapsPayload {
                vehicle_id: vehicle_id.to_string(),
                checkpoints_examined: checkpoints.len(),
                gaps,
            })
        });
        respond("scan_gaps", result)
    }
}
