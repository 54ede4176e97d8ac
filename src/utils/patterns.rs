//! Email address guesses from a person's name and a domain.

use crate::core::models::EmailCandidate;
use once_cell::sync::Lazy;
use regex::Regex;

static NAME_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z\s'.\-]+$").expect("static name regex"));

/// True if the name contains only ASCII letters, spaces, apostrophes, dots and hyphens.
pub fn validate_name_format(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty() && NAME_FORMAT.is_match(trimmed)
}

/// Keeps letters only and lower-cases them (`"O'Neil"` -> `"oneil"`).
pub fn extract_letters_only(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Generates the fixed, ordered set of local-part patterns for `first`/`last` at `domain`.
///
/// Order: `first.last`, `firstlast`, `flast`, `first_last`, `first-last`, `first`,
/// `last.first`, `lastfirst`, `f.last`, `fl`, `firstl`. Duplicates (e.g. when the
/// names are one letter long) are dropped keeping the first occurrence.
///
/// Returns an empty vector when either name has no letters.
pub fn generate_email_patterns(first: &str, last: &str, domain: &str) -> Vec<EmailCandidate> {
    let first = extract_letters_only(first);
    let last = extract_letters_only(last);
    let domain = domain.trim().to_lowercase();

    let (Some(f), Some(l)) = (first.chars().next(), last.chars().next()) else {
        tracing::debug!("Cannot generate patterns: a name part has no letters");
        return Vec::new();
    };

    let local_parts = [
        format!("{first}.{last}"),
        format!("{first}{last}"),
        format!("{f}{last}"),
        format!("{first}_{last}"),
        format!("{first}-{last}"),
        first.clone(),
        format!("{last}.{first}"),
        format!("{last}{first}"),
        format!("{f}.{last}"),
        format!("{f}{l}"),
        format!("{first}{l}"),
    ];

    let mut candidates: Vec<EmailCandidate> = Vec::with_capacity(local_parts.len());
    for local_part in local_parts {
        let candidate = EmailCandidate {
            local_part,
            domain: domain.clone(),
        };
        let address = candidate.address();
        if !address.contains('@') || !address.contains('.') {
            tracing::warn!("Dropping malformed candidate '{}'", address);
            continue;
        }
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }

    tracing::debug!(
        "Generated {} patterns for '{} {}' @ '{}'",
        candidates.len(),
        first,
        last,
        domain
    );
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addresses(candidates: &[EmailCandidate]) -> Vec<String> {
        candidates.iter().map(EmailCandidate::address).collect()
    }

    #[test]
    fn generates_patterns_in_fixed_order() {
        let generated = addresses(&generate_email_patterns("John", "Smith", "acme.com"));
        assert_eq!(
            generated,
            vec![
                "john.smith@acme.com",
                "johnsmith@acme.com",
                "jsmith@acme.com",
                "john_smith@acme.com",
                "john-smith@acme.com",
                "john@acme.com",
                "smith.john@acme.com",
                "smithjohn@acme.com",
                "j.smith@acme.com",
                "js@acme.com",
                "johns@acme.com",
            ]
        );
    }

    #[test]
    fn every_candidate_is_unique_and_on_the_domain() {
        let generated = addresses(&generate_email_patterns("John", "Smith", "acme.com"));
        let mut seen = std::collections::HashSet::new();
        for address in &generated {
            assert!(seen.insert(address.clone()), "duplicate {}", address);
            assert_eq!(address.matches("@acme.com").count(), 1);
        }
    }

    #[test]
    fn empty_name_yields_nothing() {
        assert!(generate_email_patterns("", "Smith", "acme.com").is_empty());
        assert!(generate_email_patterns("John", "--", "acme.com").is_empty());
    }

    #[test]
    fn names_are_reduced_to_letters() {
        let generated = generate_email_patterns("Mary-Jane", "O'Neil", "Example.COM");
        assert_eq!(generated[0].address(), "maryjane.oneil@example.com");
    }

    #[test]
    fn single_letter_names_collapse_duplicates() {
        let generated = addresses(&generate_email_patterns("A", "B", "x.io"));
        assert_eq!(
            generated,
            vec!["a.b@x.io", "ab@x.io", "a_b@x.io", "a-b@x.io", "a@x.io", "b.a@x.io", "ba@x.io"]
        );
    }

    #[test]
    fn name_format_validation() {
        assert!(validate_name_format("Jane"));
        assert!(validate_name_format("Mary-Jane O'Neil Jr."));
        assert!(!validate_name_format("J4ne"));
        assert!(!validate_name_format("   "));
        assert!(!validate_name_format("Jane<script>"));
    }
}
