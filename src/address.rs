//! Free-text address normalization and similarity scoring.
//!
//! Addresses are advisory: they refine a geo match but never replace it.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::config::EngineConfig;

/// Major Slovak cities, already normalized. Longer names first so that
/// "banska bystrica" wins over any shorter name it contains.
const KNOWN_CITIES: &[&str] = &[
    "spisska nova ves",
    "povazska bystrica",
    "banska bystrica",
    "liptovsky mikulas",
    "rimavska sobota",
    "dunajska streda",
    "bratislava",
    "nove zamky",
    "michalovce",
    "prievidza",
    "ruzomberok",
    "bardejov",
    "humenne",
    "trencin",
    "komarno",
    "kosice",
    "presov",
    "zilina",
    "poprad",
    "zvolen",
    "levice",
    "trnava",
    "martin",
    "nitra",
    "pezinok",
    "senec",
];

/// A run of letters followed by a house number, e.g. "mlynska 123" or "hlavna 5a".
static STREET_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z]+(?:[ .-][a-z]+)*)[ .,]*(\d+[a-z]?(?:/\d+[a-z]?)?)").expect("valid street regex"));

/// Lowercase, fold diacritics through canonical decomposition, collapse whitespace.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressComponents {
    pub city: Option<String>,
    pub street: Option<String>,
    pub full: String,
}

impl AddressComponents {
    pub fn is_empty(&self) -> bool {
        self.full.is_empty()
    }
}

pub fn extract_components(address: &str) -> AddressComponents {
    let full = normalize(address);
    if full.is_empty() {
        return AddressComponents::default();
    }

    let city = KNOWN_CITIES
        .iter()
        .find(|city| full.contains(*city))
        .map(|city| city.to_string());

    let street = STREET_PATTERN
        .captures(&full)
        .map(|caps| format!("{} {}", &caps[1], &caps[2]));

    AddressComponents { city, street, full }
}

/// 1 - levenshtein / longer length, over characters.
fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - strsim::levenshtein(a, b) as f64 / longest as f64
}

#[derive(Debug, Clone)]
pub struct AddressScorer {
    city_points: f64,
    street_points: f64,
    full_points: f64,
}

impl Default for AddressScorer {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl AddressScorer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            city_points: config.city_match_points,
            street_points: config.street_similarity_points,
            full_points: config.full_similarity_points,
        }
    }

    /// Similarity of two addresses in [0, 100]. Empty input scores 0.
    pub fn score(&self, address1: &str, address2: &str) -> f64 {
        let first = extract_components(address1);
        let second = extract_components(address2);
        if first.is_empty() || second.is_empty() {
            return 0.0;
        }

        let mut score = 0.0;

        if let (Some(city1), Some(city2)) = (&first.city, &second.city) {
            if city1 == city2 {
                score += self.city_points;
            }
        }

        if let (Some(street1), Some(street2)) = (&first.street, &second.street) {
            score += self.street_points * similarity(street1, street2);
        }

        score += self.full_points * similarity(&first.full, &second.full);

        score.min(100.0)
    }
}
