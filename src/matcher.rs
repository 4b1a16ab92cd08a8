//! Hybrid geo + address matching of templates against a gap's endpoints.

use chrono::Datelike;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::address::AddressScorer;
use crate::config::{DistanceFitTier, EngineConfig};
use crate::error::{EngineError, Result};
use crate::gap::Gap;
use crate::haversine::GeoScorer;
use crate::model::{Coordinate, Template};

/// One gap endpoint scored against one template endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointMatch {
    pub geo_score: f64,
    /// 0 when either address is absent.
    pub address_score: f64,
    pub distance_m: f64,
    pub bonus: f64,
    /// Weighted score plus bonus, capped at 100.
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateMatch<'a> {
    pub template: &'a Template,
    pub start_match: EndpointMatch,
    pub end_match: EndpointMatch,
    /// Mean of the two endpoint scores.
    pub confidence: f64,
}

#[derive(Debug, Clone)]
pub struct HybridMatcher {
    geo: GeoScorer,
    address: AddressScorer,
    geo_weight: f64,
    address_weight: f64,
    distance_fit_tiers: Vec<DistanceFitTier>,
    weekday_bonus: f64,
    default_threshold: f64,
}

impl Default for HybridMatcher {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl HybridMatcher {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            geo: GeoScorer::new(config),
            address: AddressScorer::new(config),
            geo_weight: config.geo_weight,
            address_weight: config.address_weight,
            distance_fit_tiers: config.distance_fit_tiers.clone(),
            weekday_bonus: config.weekday_bonus,
            default_threshold: config.default_confidence_threshold,
        }
    }

    pub fn match_endpoint(
        &self,
        location: Option<Coordinate>,
        checkpoint_address: Option<&str>,
        template_coords: Coordinate,
        template_address: Option<&str>,
        bonus: f64,
    ) -> Result<EndpointMatch> {
        let location = location.ok_or_else(|| {
            EngineError::GpsRequired("checkpoint has no coordinates to match against".to_string())
        })?;

        let distance_m = self.geo.distance(location, template_coords);
        let geo_score = self.geo.score(distance_m);
        let address_score = match (checkpoint_address, template_address) {
            (Some(checkpoint), Some(template)) => self.address.score(checkpoint, template),
            _ => 0.0,
        };

        let weighted = geo_score * self.geo_weight + address_score * self.address_weight;
        let score = (weighted + bonus).min(100.0);

        Ok(EndpointMatch {
            geo_score,
            address_score,
            distance_m,
            bonus,
            score,
        })
    }

    /// Bonus for a declared typical distance close to the gap distance.
    fn distance_fit_bonus(&self, gap: &Gap, template: &Template) -> f64 {
        let Some(typical) = template.distance_km else {
            return 0.0;
        };
        if gap.distance_km == 0 {
            return 0.0;
        }
        let gap_km = gap.distance_km as f64;
        let relative_diff = (typical - gap_km).abs() / gap_km;
        self.distance_fit_tiers
            .iter()
            .find(|tier| relative_diff < tier.max_relative_diff)
            .map(|tier| tier.bonus)
            .unwrap_or(0.0)
    }

    fn weekday_bonus(&self, gap: &Gap, template: &Template) -> f64 {
        let weekday = gap.start.timestamp.weekday();
        if template.typical_days.contains(&weekday) {
            self.weekday_bonus
        } else {
            0.0
        }
    }

    pub fn match_template<'a>(&self, gap: &Gap, template: &'a Template) -> Result<TemplateMatch<'a>> {
        let bonus = self.distance_fit_bonus(gap, template) + self.weekday_bonus(gap, template);

        let start_match = self.match_endpoint(
            gap.start.coordinates,
            gap.start.address.as_deref(),
            template.from_coords,
            template.from_address.as_deref(),
            bonus,
        )?;
        let end_match = self.match_endpoint(
            gap.end.coordinates,
            gap.end.address.as_deref(),
            template.to_coords,
            template.to_address.as_deref(),
            bonus,
        )?;
        let confidence = (start_match.score + end_match.score) / 2.0;

        trace!(
            template_id = %template.id,
            confidence,
            start_distance_m = start_match.distance_m,
            end_distance_m = end_match.distance_m,
            "scored template"
        );

        Ok(TemplateMatch {
            template,
            start_match,
            end_match,
            confidence,
        })
    }

    /// Scores every template, drops those below the threshold and ranks the
    /// rest by confidence; equal confidences keep their input order.
    pub fn match_templates<'a>(
        &self,
        gap: &Gap,
        templates: &'a [Template],
        confidence_threshold: Option<f64>,
    ) -> Result<Vec<TemplateMatch<'a>>> {
        if !gap.start.has_gps() || !gap.end.has_gps() {
            return Err(EngineError::GpsRequired(format!(
                "gap between checkpoints {} and {} needs coordinates on both endpoints",
                gap.start.id, gap.end.id
            )));
        }
        let threshold = confidence_threshold.unwrap_or(self.default_threshold);

        let scored = templates
            .par_iter()
            .map(|template| self.match_template(gap, template))
            .collect::<Result<Vec<_>>>()?;

        let mut matched: Vec<TemplateMatch<'a>> = scored
            .into_iter()
            .filter(|candidate| candidate.confidence >= threshold)
            .collect();
        matched.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        debug!(
            evaluated = templates.len(),
            matched = matched.len(),
            threshold,
            "matched templates against gap"
        );

        Ok(matched)
    }
}
