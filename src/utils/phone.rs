//! Phone number extraction, validation and display formatting.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const MAX_CANDIDATES: usize = 5;

/// Digit strings that show up in templates and test data, never real numbers.
const PLACEHOLDER_NUMBERS: &[&str] = &[
    "1234567890",
    "0123456789",
    "0987654321",
    "0000000000",
    "1111111111",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhoneRegion {
    Indian,
    Global,
}

/// Which country a bare local-format number should be read as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountryHint {
    India,
    UnitedStates,
    UnitedKingdom,
}

impl CountryHint {
    /// Maps a parsed location qualifier onto a hint, if it names one of the known countries.
    pub fn from_qualifier(qualifier: &str) -> Option<Self> {
        match qualifier.trim().to_lowercase().as_str() {
            "india" | "bangalore" | "mumbai" | "delhi" | "hyderabad" | "chennai" | "pune"
            | "gurgaon" | "noida" => Some(CountryHint::India),
            "usa" | "new york" | "san francisco" | "seattle" | "chicago" | "silicon valley"
            | "bay area" | "wall street" => Some(CountryHint::UnitedStates),
            "uk" | "london" => Some(CountryHint::UnitedKingdom),
            _ => None,
        }
    }

    /// Reads a hint off a country-code top-level domain (`acme.co.in`, `acme.co.uk`).
    pub fn from_domain(domain: &str) -> Option<Self> {
        match domain.trim().trim_end_matches('.').rsplit('.').next()? {
            "in" => Some(CountryHint::India),
            "us" => Some(CountryHint::UnitedStates),
            "uk" => Some(CountryHint::UnitedKingdom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhoneCandidate {
    pub raw: String,
    /// `None` when the raw match failed validation.
    pub normalized: Option<String>,
    pub region: PhoneRegion,
}

impl PhoneCandidate {
    pub fn parse(raw: &str, hint: Option<CountryHint>) -> Self {
        let normalized = format_phone_number(raw, hint);
        let region = normalized
            .as_deref()
            .map(classify_region)
            .unwrap_or(PhoneRegion::Global);
        Self {
            raw: raw.trim().to_string(),
            normalized,
            region,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.normalized.is_some()
    }
}

/// Country-prefixed shapes first, then labelled numbers, then generic shapes.
static PHONE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\+91[-.\s]?\d{5}[-.\s]?\d{5}",
        r"\+91[-.\s]?\d{3}[-.\s]?\d{3}[-.\s]?\d{4}",
        r"\+91[-.\s]?\d{10}",
        r"\+1[-.\s]?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}",
        r"\+44[-.\s]?\d{2,4}[-.\s]?\d{3,4}[-.\s]?\d{3,4}",
        r"(?i)(?:phone|tel|mobile|cell|call|contact)\s*:?\s*(\+?\d[\d\s\-().]{8,}\d)",
        r"\+\d{1,4}[-.\s]?\(?\d{1,4}\)?[-.\s]?\d{1,4}[-.\s]?\d{4,}",
        r"\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}",
        r"\b\d{10,15}\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static phone regex"))
    .collect()
});

/// Finds up to five valid phone numbers in `text`, deduplicated by normalised form.
///
/// Text already claimed by an accepted match from an earlier (more specific)
/// pattern is not reconsidered by later ones, so `+1 415 555 0134` does not
/// also surface as the local number `415 555 0134`.
pub fn extract_phone_numbers(text: &str, hint: Option<CountryHint>) -> Vec<PhoneCandidate> {
    let mut claimed: Vec<(usize, usize)> = Vec::new();
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for pattern in PHONE_PATTERNS.iter() {
        for captures in pattern.captures_iter(text) {
            let Some(m) = captures.get(1).or_else(|| captures.get(0)) else {
                continue;
            };
            if claimed
                .iter()
                .any(|&(start, end)| m.start() < end && start < m.end())
            {
                continue;
            }

            let candidate = PhoneCandidate::parse(m.as_str(), hint);
            let Some(ref normalized) = candidate.normalized else {
                tracing::trace!(target: "phone_task", "Rejected phone-like match '{}'", m.as_str());
                continue;
            };
            claimed.push((m.start(), m.end()));
            if seen.insert(normalized.clone()) {
                candidates.push(candidate);
                if candidates.len() >= MAX_CANDIDATES {
                    return candidates;
                }
            }
        }
    }
    candidates
}

/// Validates a raw match and renders it in grouped display form.
///
/// Returns `None` for fewer than 10 or more than 15 digits, fewer than four
/// distinct digits, or a known placeholder sequence.
pub fn format_phone_number(raw: &str, hint: Option<CountryHint>) -> Option<String> {
    let trimmed = raw.trim();
    let has_plus = trimmed.starts_with('+');
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();

    if digits.len() < 10 || digits.len() > 15 {
        return None;
    }
    if digits.chars().collect::<HashSet<_>>().len() < 4 {
        return None;
    }
    if PLACEHOLDER_NUMBERS.contains(&digits.as_str()) {
        return None;
    }

    let indian_mobile = |d: &str| d.len() == 10 && d.starts_with(['6', '7', '8', '9']);

    if has_plus {
        if let Some(rest) = digits.strip_prefix("91") {
            if indian_mobile(rest) {
                return Some(format!("+91 {} {}", &rest[..5], &rest[5..]));
            }
            if rest.len() == 11 && rest.starts_with('0') {
                return Some(format!("+91 {} {} {}", &rest[..3], &rest[3..7], &rest[7..]));
            }
        } else if let Some(rest) = digits.strip_prefix('1') {
            if rest.len() == 10 {
                return Some(format!("+1 {} {} {}", &rest[..3], &rest[3..6], &rest[6..]));
            }
        } else if let Some(rest) = digits.strip_prefix("44") {
            if rest.len() >= 10 {
                return Some(format!("+44 {} {} {}", &rest[..3], &rest[3..6], &rest[6..]));
            }
        }
        return Some(light_normalize(trimmed));
    }

    if digits.len() == 12 {
        if let Some(rest) = digits.strip_prefix("91") {
            if indian_mobile(rest) {
                return Some(format!("+91 {} {}", &rest[..5], &rest[5..]));
            }
        }
    }

    if digits.len() == 10 {
        match hint {
            Some(CountryHint::UnitedStates) => {
                return Some(format!("+1 {} {} {}", &digits[..3], &digits[3..6], &digits[6..]));
            }
            Some(CountryHint::UnitedKingdom) => {}
            Some(CountryHint::India) | None => {
                if indian_mobile(&digits) {
                    return Some(format!("+91 {} {}", &digits[..5], &digits[5..]));
                }
            }
        }
    }

    Some(light_normalize(trimmed))
}

fn light_normalize(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `+91` numbers and bare Indian mobile numbers are `Indian`; everything else is `Global`.
pub fn classify_region(normalized: &str) -> PhoneRegion {
    if normalized.starts_with("+91") {
        return PhoneRegion::Indian;
    }
    let digits: String = normalized.chars().filter(char::is_ascii_digit).collect();
    if !normalized.starts_with('+')
        && digits.len() == 10
        && digits.starts_with(['6', '7', '8', '9'])
    {
        PhoneRegion::Indian
    } else {
        PhoneRegion::Global
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_placeholders_and_garbage() {
        assert!(format_phone_number("1111111111", None).is_none());
        assert!(format_phone_number("1234567890", None).is_none());
        assert!(format_phone_number("12345", None).is_none());
        assert!(format_phone_number("1212121212", None).is_none());
        assert!(format_phone_number("+1234567890123456", None).is_none());
    }

    #[test]
    fn indian_number_is_grouped_and_tagged() {
        let candidate = PhoneCandidate::parse("+91 98765 43210", None);
        assert_eq!(candidate.normalized.as_deref(), Some("+91 98765 43210"));
        assert_eq!(candidate.region, PhoneRegion::Indian);

        let compact = PhoneCandidate::parse("+919876543210", None);
        assert_eq!(compact.normalized.as_deref(), Some("+91 98765 43210"));
    }

    #[test]
    fn other_prefixes_are_grouped() {
        assert_eq!(
            format_phone_number("+1 (415) 555-0134", None).as_deref(),
            Some("+1 415 555 0134")
        );
        assert_eq!(
            format_phone_number("+44 2079 460 958", None).as_deref(),
            Some("+44 207 946 0958")
        );
        assert_eq!(
            format_phone_number("+91 011 2345 6789", None).as_deref(),
            Some("+91 011 2345 6789")
        );
    }

    #[test]
    fn bare_numbers_follow_the_hint() {
        assert_eq!(
            format_phone_number("9876501234", None).as_deref(),
            Some("+91 98765 01234")
        );
        assert_eq!(
            format_phone_number("4155550134", Some(CountryHint::UnitedStates)).as_deref(),
            Some("+1 415 555 0134")
        );
        assert_eq!(
            format_phone_number("415 555 0134", None).as_deref(),
            Some("415 555 0134")
        );
    }

    #[test]
    fn extracts_from_free_text_without_duplicates() {
        let text = "Reach Priya at +91 98765 43210 or mobile: +91-98765-43210. \
                    US office +1 415 555 0134. Fax 1111111111.";
        let found = extract_phone_numbers(text, None);
        let normalized: Vec<_> = found.iter().filter_map(|c| c.normalized.clone()).collect();
        assert_eq!(normalized, vec!["+91 98765 43210", "+1 415 555 0134"]);
        assert_eq!(found[0].region, PhoneRegion::Indian);
        assert_eq!(found[1].region, PhoneRegion::Global);
    }

    #[test]
    fn caps_results_at_five() {
        let text = (0..8)
            .map(|i| format!("+1 415 555 01{:02}", 30 + i))
            .collect::<Vec<_>>()
            .join(", ");
        assert_eq!(extract_phone_numbers(&text, None).len(), 5);
    }

    #[test]
    fn hint_from_qualifier() {
        assert_eq!(CountryHint::from_qualifier("Mumbai"), Some(CountryHint::India));
        assert_eq!(CountryHint::from_qualifier("london"), Some(CountryHint::UnitedKingdom));
        assert_eq!(CountryHint::from_qualifier("emea"), None);
    }

    #[test]
    fn hint_from_domain() {
        assert_eq!(CountryHint::from_domain("tcs.co.in"), Some(CountryHint::India));
        assert_eq!(CountryHint::from_domain("acme.co.uk"), Some(CountryHint::UnitedKingdom));
        assert_eq!(CountryHint::from_domain("acme.com"), None);
    }
}
