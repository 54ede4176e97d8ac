//! Small text helpers shared by the search and extraction code.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("static tag regex"));

/// Replaces tags with spaces and collapses whitespace.
pub fn strip_html(html: &str) -> String {
    collapse_whitespace(&HTML_TAG.replace_all(html, " "))
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `max_chars` characters, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Jaccard overlap of the lower-cased word sets of `a` and `b`, in `[0, 1]`.
pub fn word_overlap_similarity(a: &str, b: &str) -> f64 {
    let words_a: HashSet<String> = a.split_whitespace().map(str::to_lowercase).collect();
    let words_b: HashSet<String> = b.split_whitespace().map(str::to_lowercase).collect();
    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }
    let intersection = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();
    intersection as f64 / union as f64
}

/// `"new york"` -> `"New York"`.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Shortens a snippet to `max_chars`, keeping sentences that mention the
/// qualifier ahead of the others when one was searched.
pub fn shape_snippet(snippet: &str, qualifier: Option<&str>, max_chars: usize) -> String {
    let clean = collapse_whitespace(snippet);
    if clean.chars().count() <= max_chars {
        return clean;
    }

    let reordered = qualifier
        .map(str::to_lowercase)
        .filter(|q| !q.is_empty())
        .and_then(|q| {
            let sentences: Vec<&str> = clean
                .split(". ")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            let (mentioning, rest): (Vec<&str>, Vec<&str>) = sentences
                .into_iter()
                .partition(|s| s.to_lowercase().contains(&q));
            (!mentioning.is_empty()).then(|| {
                mentioning
                    .into_iter()
                    .chain(rest)
                    .collect::<Vec<_>>()
                    .join(". ")
            })
        })
        .unwrap_or(clean);

    if reordered.chars().count() <= max_chars {
        return reordered;
    }
    let mut shortened = truncate_chars(&reordered, max_chars.saturating_sub(3));
    shortened.push_str("...");
    shortened
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_collapses_space() {
        assert_eq!(
            strip_html("<html><body><p>Call   us</p>\n<b>now</b></body></html>"),
            "Call us now"
        );
    }

    #[test]
    fn similarity_is_jaccard_over_words() {
        assert_eq!(word_overlap_similarity("Senior Engineer", "senior engineer"), 1.0);
        assert_eq!(word_overlap_similarity("a b c d", "a b c e"), 0.6);
        assert_eq!(word_overlap_similarity("", "anything"), 0.0);
    }

    #[test]
    fn title_cases_words() {
        assert_eq!(title_case("new york"), "New York");
        assert_eq!(title_case("india"), "India");
    }

    #[test]
    fn snippet_prefers_qualifier_sentences() {
        let snippet = format!(
            "{}. Talent partner based in Bangalore, India. {}",
            "x".repeat(150),
            "y".repeat(80)
        );
        let shaped = shape_snippet(&snippet, Some("india"), 200);
        assert!(shaped.starts_with("Talent partner based in Bangalore, India"));
        assert!(shaped.chars().count() <= 200);
        assert!(shaped.ends_with("..."));
    }

    #[test]
    fn short_snippets_pass_through() {
        assert_eq!(shape_snippet("  Recruiter at  Acme ", None, 200), "Recruiter at Acme");
    }
}
