//! Splits a free-text "company [location]" query into entity and qualifier.

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::sync::Arc;

/// Parsed search target: `"Google India"` -> entity `"Google"`, qualifier `"india"`.
///
/// The entity never contains the qualifier text (case-insensitively).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedTarget {
    pub entity: String,
    pub qualifier: Option<String>,
}

impl ParsedTarget {
    pub fn new(entity: impl Into<String>, qualifier: Option<&str>) -> Self {
        Self {
            entity: entity.into(),
            qualifier: qualifier.map(str::to_lowercase),
        }
    }
}

/// Static knowledge about place names.
pub trait LocationVocabulary: Send + Sync {
    /// Token groups in priority order; the first group with a match wins.
    fn groups(&self) -> &[&'static [&'static str]];

    /// Words that indicate a profile is associated with `location`.
    fn related_terms(&self, location: &str) -> Vec<String>;

    /// ISO country code used to restrict search results, if `location` is a country.
    fn country_code(&self, location: &str) -> Option<&'static str>;

    /// Other ways people write `location`, for no-result hints.
    fn alternate_names(&self, location: &str) -> &'static [&'static str];

    /// Broader regional term for `location`, for no-result hints.
    fn region_of(&self, location: &str) -> Option<&'static str>;
}

const COUNTRIES: &[&str] = &[
    "india", "usa", "uk", "canada", "australia", "germany", "france", "singapore", "japan",
    "china", "brazil", "mexico", "netherlands", "sweden", "spain", "italy",
];
const CITIES: &[&str] = &[
    "bangalore", "mumbai", "delhi", "hyderabad", "chennai", "pune", "gurgaon", "noida",
    "london", "new york", "san francisco", "seattle", "chicago", "toronto", "sydney",
    "melbourne", "berlin", "paris", "tokyo", "beijing", "shanghai", "sao paulo",
];
const REGIONS: &[&str] = &[
    "asia pacific", "emea", "north america", "latin america", "middle east", "europe",
];
const OFFICE_LOCATIONS: &[&str] = &["silicon valley", "bay area", "wall street"];

const GROUPS: &[&[&str]] = &[COUNTRIES, CITIES, REGIONS, OFFICE_LOCATIONS];

const COUNTRY_CODES: &[(&str, &str)] = &[
    ("india", "IN"),
    ("usa", "US"),
    ("uk", "GB"),
    ("canada", "CA"),
    ("australia", "AU"),
    ("germany", "DE"),
    ("france", "FR"),
    ("singapore", "SG"),
    ("japan", "JP"),
    ("china", "CN"),
    ("brazil", "BR"),
    ("mexico", "MX"),
];

/// Countries expand to their demonyms and major cities; cities to local
/// spellings, abbreviations and their state or region.
const RELATED_TERMS: &[(&str, &[&str])] = &[
    ("india", &["india", "indian", "mumbai", "bangalore", "delhi", "hyderabad", "chennai", "pune", "gurgaon", "noida"]),
    ("usa", &["usa", "us", "united states", "american", "california", "new york", "seattle", "texas", "bay area", "silicon valley"]),
    ("uk", &["uk", "united kingdom", "british", "london", "england", "scotland", "wales"]),
    ("canada", &["canada", "canadian", "toronto", "vancouver", "montreal", "ottawa"]),
    ("australia", &["australia", "australian", "sydney", "melbourne", "brisbane", "perth"]),
    ("germany", &["germany", "german", "berlin", "munich", "hamburg", "frankfurt"]),
    ("france", &["france", "french", "paris", "lyon", "marseille"]),
    ("singapore", &["singapore", "singaporean"]),
    ("japan", &["japan", "japanese", "tokyo", "osaka", "kyoto"]),
    ("china", &["china", "chinese", "beijing", "shanghai", "shenzhen", "guangzhou"]),
    ("brazil", &["brazil", "brazilian", "sao paulo", "rio de janeiro", "brasilia"]),
    ("mexico", &["mexico", "mexican", "mexico city", "guadalajara", "monterrey"]),
    ("bangalore", &["bangalore", "bengaluru", "blr", "karnataka"]),
    ("mumbai", &["mumbai", "bombay", "maharashtra"]),
    ("delhi", &["delhi", "new delhi", "ncr", "gurgaon", "noida"]),
    ("hyderabad", &["hyderabad", "telangana", "andhra pradesh"]),
    ("chennai", &["chennai", "madras", "tamil nadu"]),
    ("pune", &["pune", "maharashtra"]),
    ("london", &["london", "uk", "england", "britain"]),
    ("new york", &["new york", "nyc", "manhattan", "brooklyn"]),
    ("san francisco", &["san francisco", "sf", "bay area", "silicon valley"]),
    ("seattle", &["seattle", "washington", "redmond"]),
    ("toronto", &["toronto", "ontario", "gta"]),
    ("sydney", &["sydney", "nsw", "new south wales"]),
    ("berlin", &["berlin", "germany"]),
    ("paris", &["paris", "france"]),
    ("tokyo", &["tokyo", "japan"]),
    ("beijing", &["beijing", "china"]),
    ("shanghai", &["shanghai", "china"]),
    ("sao paulo", &["sao paulo", "brazil"]),
];

const ALTERNATE_NAMES: &[(&str, &[&str])] = &[
    ("india", &["IN", "Bharat", "Indian"]),
    ("usa", &["US", "United States", "America"]),
    ("uk", &["United Kingdom", "Britain", "England"]),
    ("germany", &["DE", "Deutschland"]),
    ("japan", &["JP", "Nippon"]),
];

const REGIONAL_TERMS: &[(&str, &str)] = &[
    ("india", "APAC"),
    ("singapore", "APAC"),
    ("japan", "APAC"),
    ("china", "APAC"),
    ("australia", "APAC"),
    ("usa", "Americas"),
    ("canada", "Americas"),
    ("brazil", "LATAM"),
    ("mexico", "LATAM"),
    ("uk", "EMEA"),
    ("germany", "EMEA"),
    ("france", "EMEA"),
];

/// The built-in vocabulary.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultLocations;

impl LocationVocabulary for DefaultLocations {
    fn groups(&self) -> &[&'static [&'static str]] {
        GROUPS
    }

    fn related_terms(&self, location: &str) -> Vec<String> {
        let location = location.to_lowercase();
        RELATED_TERMS
            .iter()
            .find(|(key, _)| *key == location)
            .map(|(_, terms)| terms.iter().map(|t| t.to_string()).collect())
            .unwrap_or_else(|| vec![location])
    }

    fn country_code(&self, location: &str) -> Option<&'static str> {
        let location = location.to_lowercase();
        COUNTRY_CODES
            .iter()
            .find(|(key, _)| *key == location)
            .map(|(_, code)| *code)
    }

    fn alternate_names(&self, location: &str) -> &'static [&'static str] {
        let location = location.to_lowercase();
        ALTERNATE_NAMES
            .iter()
            .find(|(key, _)| *key == location)
            .map(|(_, names)| *names)
            .unwrap_or(&[])
    }

    fn region_of(&self, location: &str) -> Option<&'static str> {
        let location = location.to_lowercase();
        REGIONAL_TERMS
            .iter()
            .find(|(key, _)| *key == location)
            .map(|(_, region)| *region)
    }
}

fn compile_groups(groups: &[&[&str]]) -> Vec<Regex> {
    groups
        .iter()
        .filter_map(|tokens| {
            let alternation = tokens
                .iter()
                .map(|t| regex::escape(t))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&format!(r"\b(?:{})\b", alternation)).ok()
        })
        .collect()
}

/// Parses queries against a [`LocationVocabulary`].
pub struct QueryParser {
    vocabulary: Arc<dyn LocationVocabulary>,
    patterns: Vec<Regex>,
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::new(Arc::new(DefaultLocations))
    }
}

impl QueryParser {
    pub fn new(vocabulary: Arc<dyn LocationVocabulary>) -> Self {
        let patterns = compile_groups(vocabulary.groups());
        Self {
            vocabulary,
            patterns,
        }
    }

    pub fn vocabulary(&self) -> &dyn LocationVocabulary {
        self.vocabulary.as_ref()
    }

    pub fn vocabulary_handle(&self) -> Arc<dyn LocationVocabulary> {
        Arc::clone(&self.vocabulary)
    }

    /// Never fails. If no location token matches, the trimmed input is the entity.
    ///
    /// Tokens are matched on word boundaries, so a company whose name contains
    /// a place (a hypothetical "India Corp") is split as if the place were a
    /// qualifier. An input that is nothing but a location yields an empty entity;
    /// callers decide whether that is acceptable.
    pub fn parse(&self, raw: &str) -> ParsedTarget {
        let trimmed = raw.trim();
        let lower = trimmed.to_lowercase();

        let matched = self
            .patterns
            .iter()
            .find_map(|pattern| pattern.find(&lower).map(|m| m.as_str().to_string()));

        let Some(qualifier) = matched else {
            return ParsedTarget::new(trimmed, None);
        };

        ParsedTarget::new(strip_qualifier(trimmed, &qualifier), Some(&qualifier))
    }
}

/// Removes every case-insensitive occurrence of `qualifier` from `input`
/// and tidies the whitespace left behind.
fn strip_qualifier(input: &str, qualifier: &str) -> String {
    let pattern = RegexBuilder::new(&regex::escape(qualifier))
        .case_insensitive(true)
        .build();
    let Ok(pattern) = pattern else {
        return input.trim().to_string();
    };

    let mut current = input.to_string();
    while pattern.is_match(&current) {
        current = pattern.replace_all(&current, " ").into_owned();
    }
    current.split_whitespace().collect::<Vec<_>>().join(" ")
}
