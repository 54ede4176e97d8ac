//! Merging results across strategy attempts, near-duplicate removal,
//! relevance scoring and the stopping rules of the strategy loops.

use super::jobs::{recency_bonus, JobSource};
use super::{SearchMode, SearchResultItem};
use crate::core::config::Config;
use crate::utils::text::word_overlap_similarity;

use serde::Serialize;
use std::collections::HashMap;

/// Titles at least this similar (word overlap) from the same company are one posting.
pub const NEAR_DUPLICATE_THRESHOLD: f64 = 0.8;

const BASE_SCORE: u32 = 50;
const ENTITY_BONUS: u32 = 30;
const LOCATION_BONUS: u32 = 20;
const MAX_SCORE: u32 = 100;

/// A result with its relevance score, ready for output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    #[serde(flatten)]
    pub item: SearchResultItem,
    pub relevance_score: u32,
}

/// Results gathered so far for one search, unique by URL.
///
/// Each item is scored when it is first inserted; a later duplicate never
/// replaces it or its score.
#[derive(Debug, Clone)]
pub struct AggregateResult {
    mode: SearchMode,
    entity: String,
    qualifier: Option<String>,
    items: Vec<SearchResultItem>,
    scores: HashMap<String, u32>,
}

impl AggregateResult {
    pub fn new(mode: SearchMode, entity: &str, qualifier: Option<&str>) -> Self {
        Self {
            mode,
            entity: entity.to_string(),
            qualifier: qualifier.map(str::to_string),
            items: Vec::new(),
            scores: HashMap::new(),
        }
    }

    pub fn merge(mut self, incoming: Vec<SearchResultItem>) -> Self {
        for item in incoming {
            if self.is_duplicate(&item) {
                tracing::trace!(target: "search_task", "Dropping duplicate result {}", item.url);
                continue;
            }
            let score = relevance_score(&item, &self.entity, self.qualifier.as_deref());
            self.scores.insert(item.url.clone(), score);
            self.items.push(item);
        }
        self
    }

    fn is_duplicate(&self, candidate: &SearchResultItem) -> bool {
        if self.scores.contains_key(&candidate.url) {
            return true;
        }
        if self.mode != SearchMode::Job {
            return false;
        }
        let Some(candidate_job) = candidate.job.as_ref() else {
            return false;
        };
        self.items.iter().any(|existing| {
            existing.job.as_ref().is_some_and(|job| {
                job.company.eq_ignore_ascii_case(&candidate_job.company)
                    && word_overlap_similarity(&job.title, &candidate_job.title) >= NEAR_DUPLICATE_THRESHOLD
            })
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn score_of(&self, url: &str) -> Option<u32> {
        self.scores.get(url).copied()
    }

    /// Sorted by descending score; equal scores keep insertion order.
    pub fn into_ranked(self) -> Vec<RankedResult> {
        let Self { items, scores, .. } = self;
        let mut ranked: Vec<RankedResult> = items
            .into_iter()
            .map(|item| {
                let relevance_score = scores.get(&item.url).copied().unwrap_or(BASE_SCORE);
                RankedResult { item, relevance_score }
            })
            .collect();
        ranked.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
        ranked
    }
}

/// Base 50 plus entity, location, source and freshness bonuses, capped at 100.
pub fn relevance_score(item: &SearchResultItem, entity: &str, qualifier: Option<&str>) -> u32 {
    let entity = entity.to_lowercase();
    let title = item.title.to_lowercase();
    let mut score = BASE_SCORE;

    match item.job.as_ref() {
        Some(job) => {
            if !entity.is_empty() && (job.company.to_lowercase().contains(&entity) || title.contains(&entity)) {
                score += ENTITY_BONUS;
            }
            if let Some(q) = qualifier.map(str::to_lowercase) {
                if job.location.to_lowercase().contains(&q) {
                    score += LOCATION_BONUS;
                }
            }
            score += job.source.credibility();
            score += recency_bonus(&job.posted_date);
        }
        None => {
            if !entity.is_empty() && title.contains(&entity) {
                score += ENTITY_BONUS;
            }
            if let Some(q) = qualifier.map(str::to_lowercase) {
                if title.contains(&q) || item.snippet.to_lowercase().contains(&q) {
                    score += LOCATION_BONUS;
                }
            }
            score += JobSource::from_url(&item.url).credibility();
        }
    }

    score.min(MAX_SCORE)
}

/// When the phone strategy loop may stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhoneStopPolicy {
    pub regional_target: usize,
    pub global_target: usize,
    pub secondary_total: usize,
    /// Strategies that must have run (beyond this count) before the secondary rule applies.
    pub secondary_after: usize,
}

impl Default for PhoneStopPolicy {
    fn default() -> Self {
        Self {
            regional_target: 2,
            global_target: 1,
            secondary_total: 5,
            secondary_after: 10,
        }
    }
}

impl PhoneStopPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            regional_target: config.phone_regional_target,
            global_target: config.phone_global_target,
            secondary_total: config.phone_secondary_total,
            secondary_after: config.phone_secondary_after,
        }
    }

    pub fn should_stop(&self, regional: usize, global: usize, strategies_run: usize) -> bool {
        if regional >= self.regional_target && global >= self.global_target {
            return true;
        }
        regional + global >= self.secondary_total && strategies_run > self.secondary_after
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::jobs::JobDetails;

    fn profile(url: &str, title: &str) -> SearchResultItem {
        SearchResultItem {
            title: title.to_string(),
            url: url.to_string(),
            snippet: String::new(),
            source_strategy: 0,
            qualifier_searched: None,
            job: None,
        }
    }

    fn posting(url: &str, title: &str, snippet: &str) -> SearchResultItem {
        SearchResultItem {
            job: Some(JobDetails::extract(title, url, snippet, None)),
            ..profile(url, title)
        }
    }

    #[test]
    fn duplicate_url_keeps_first_score() {
        let first = AggregateResult::new(SearchMode::Recruiter, "Acme", None)
            .merge(vec![profile("https://www.linkedin.com/in/a", "A - Recruiter - Acme")]);
        let original = first.score_of("https://www.linkedin.com/in/a").unwrap();

        let merged = first.merge(vec![
            profile("https://www.linkedin.com/in/a", "A - somewhere else"),
            profile("https://www.linkedin.com/in/b", "B - Recruiter"),
        ]);

        assert_eq!(merged.len(), 2);
        let ranked = merged.into_ranked();
        let a: Vec<_> = ranked
            .iter()
            .filter(|r| r.item.url == "https://www.linkedin.com/in/a")
            .collect();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].relevance_score, original);
        assert_eq!(a[0].item.title, "A - Recruiter - Acme");
    }

    #[test]
    fn near_duplicate_jobs_collapse_only_for_same_company() {
        let aggregate = AggregateResult::new(SearchMode::Job, "Acme", None)
            .merge(vec![posting("https://x.com/1", "Senior Rust Engineer at Acme", "")])
            .merge(vec![
                posting("https://y.com/2", "Senior Rust Engineer at Acme", "apply"),
                posting("https://z.com/3", "Senior Rust Engineer at Globex", ""),
            ]);
        assert_eq!(aggregate.len(), 2);
        assert!(aggregate.score_of("https://y.com/2").is_none());
        assert!(aggregate.score_of("https://z.com/3").is_some());
    }

    #[test]
    fn near_duplicates_ignored_in_recruiter_mode() {
        let aggregate = AggregateResult::new(SearchMode::Recruiter, "Acme", None).merge(vec![
            profile("https://www.linkedin.com/in/a", "Recruiter at Acme"),
            profile("https://www.linkedin.com/in/b", "Recruiter at Acme"),
        ]);
        assert_eq!(aggregate.len(), 2);
    }

    #[test]
    fn ranking_is_stable_and_descending() {
        let ranked = AggregateResult::new(SearchMode::Recruiter, "Acme", None)
            .merge(vec![
                profile("https://www.linkedin.com/in/first", "Someone"),
                profile("https://www.linkedin.com/in/second", "Acme recruiter"),
                profile("https://www.linkedin.com/in/third", "Someone else"),
            ])
            .into_ranked();
        let order: Vec<&str> = ranked.iter().map(|r| r.item.url.as_str()).collect();
        assert_eq!(
            order,
            vec![
                "https://www.linkedin.com/in/second",
                "https://www.linkedin.com/in/first",
                "https://www.linkedin.com/in/third",
            ]
        );
        assert_eq!(ranked[0].relevance_score, 100);
        assert_eq!(ranked[1].relevance_score, 50 + 25);
    }

    #[test]
    fn job_scores_are_capped() {
        let mut item = posting(
            "https://careers.acme.com/1",
            "Engineer at Acme",
            "Bangalore office, posted 2 hours ago",
        );
        if let Some(job) = item.job.as_mut() {
            job.location = "Bangalore".into();
        }
        assert_eq!(relevance_score(&item, "Acme", Some("bangalore")), 100);
        assert_eq!(relevance_score(&item, "Globex", None), 50 + 30 + 15);
    }

    #[test]
    fn phone_stop_policy() {
        let policy = PhoneStopPolicy::default();
        assert!(!policy.should_stop(1, 1, 3));
        assert!(!policy.should_stop(2, 0, 3));
        assert!(policy.should_stop(2, 1, 2));
        assert!(!policy.should_stop(5, 0, 10));
        assert!(policy.should_stop(5, 0, 11));

        let strict = PhoneStopPolicy { regional_target: 3, ..PhoneStopPolicy::default() };
        assert!(!strict.should_stop(2, 1, 2));
    }
}
