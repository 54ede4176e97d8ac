//! Explanations returned alongside an empty result set.

use super::query::{LocationVocabulary, ParsedTarget};
use super::SearchMode;
use crate::utils::text::title_case;

const SUGGESTED_LOCATIONS: &[&str] = &["India", "USA", "London", "Singapore"];

pub fn no_results_message(target: &ParsedTarget, mode: SearchMode, vocabulary: &dyn LocationVocabulary) -> String {
    match (&target.qualifier, mode) {
        (Some(q), SearchMode::Recruiter) => located_recruiter_message(&target.entity, q, vocabulary),
        (None, SearchMode::Recruiter) => global_recruiter_message(&target.entity),
        (Some(q), SearchMode::Job) => located_job_message(&target.entity, q, vocabulary),
        (None, SearchMode::Job) => global_job_message(&target.entity),
    }
}

fn alternates_line(qualifier: &str, vocabulary: &dyn LocationVocabulary) -> String {
    let names = vocabulary.alternate_names(qualifier);
    if names.is_empty() {
        format!("\"{}\"", qualifier)
    } else {
        names.join(", ")
    }
}

fn located_recruiter_message(company: &str, qualifier: &str, vocabulary: &dyn LocationVocabulary) -> String {
    let place = title_case(qualifier);
    let region = vocabulary.region_of(qualifier).unwrap_or("Regional");
    format!(
        "No recruiter profiles found for '{company}' specifically in {place}.\n\n\
         This could be due to limited public LinkedIn profiles for {company} recruiters in {place}, \
         or recruiters listed under global profiles without a location.\n\n\
         Try these suggestions:\n\
         - Search without location: \"{company}\" (for global recruiters)\n\
         - Try alternate location names: {alternates}\n\
         - Search for regional terms: \"{company} {region}\"\n\
         - Look for country or regional heads: \"{company} {place} country manager\"",
        alternates = alternates_line(qualifier, vocabulary),
    )
}

fn global_recruiter_message(company: &str) -> String {
    let locations = SUGGESTED_LOCATIONS
        .iter()
        .map(|loc| format!("- \"{company} {loc}\""))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "No recruiter profiles found for '{company}'.\n\n\
         We searched for technical recruiters, talent acquisition specialists, hiring managers \
         and people partners. The company may have few public recruiter profiles, or a different \
         name variation may work better (e.g. 'Uber Technologies' instead of 'Uber').\n\n\
         Try a location-specific search:\n{locations}"
    )
}

fn located_job_message(company: &str, qualifier: &str, vocabulary: &dyn LocationVocabulary) -> String {
    let place = title_case(qualifier);
    format!(
        "No job postings found for '{company}' in {place}.\n\n\
         Try these suggestions:\n\
         - Search without location: \"{company}\" (for openings worldwide)\n\
         - Try alternate location names: {alternates}\n\
         - Check {company}'s careers page directly for {place} openings",
        alternates = alternates_line(qualifier, vocabulary),
    )
}

fn global_job_message(company: &str) -> String {
    let locations = SUGGESTED_LOCATIONS
        .iter()
        .map(|loc| format!("- \"{company} {loc}\""))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "No job postings found for '{company}'.\n\n\
         The company may not be hiring publicly right now, or its postings may use a different \
         company name.\n\n\
         Try a location-specific search:\n{locations}"
    )
}

/// Message for a contact whose domain (and every alternate) had no MX records.
pub fn no_mx_message(domain: &str, alternatives_tried: &[String]) -> String {
    if alternatives_tried.is_empty() {
        format!("Could not find MX records for {} or alternative domains", domain)
    } else {
        format!(
            "Could not find MX records for {} or alternative domains (tried: {})",
            domain,
            alternatives_tried.join(", ")
        )
    }
}
