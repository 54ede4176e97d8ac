//! Web search: query parsing, strategy generation, the external gateway,
//! result classification and aggregation.

pub mod aggregate;
pub mod gateway;
pub mod jobs;
pub mod messages;
pub mod query;
pub mod strategy;

use serde::Serialize;

pub use aggregate::{AggregateResult, RankedResult};
pub use gateway::{CustomSearchGateway, SearchError, SearchGateway, SearchRequest};
pub use jobs::{JobDetails, JobSource};
pub use query::{DefaultLocations, LocationVocabulary, ParsedTarget, QueryParser};
pub use strategy::StrategyGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Recruiter,
    Job,
}

impl SearchMode {
    pub fn filter(self) -> ResultFilter {
        match self {
            SearchMode::Recruiter => ResultFilter::LinkedInProfiles,
            SearchMode::Job => ResultFilter::JobPostings,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SearchMode::Recruiter => "recruiter",
            SearchMode::Job => "job",
        }
    }
}

/// Which raw search items the gateway keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultFilter {
    LinkedInProfiles,
    JobPostings,
    /// Keep everything (used by the phone search).
    Unfiltered,
}

/// One query string to send, in execution-priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchStrategy {
    pub query: String,
    pub ordinal: usize,
}

/// One normalised item returned by a search call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResultItem {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub source_strategy: usize,
    pub qualifier_searched: Option<String>,
    #[serde(flatten)]
    pub job: Option<JobDetails>,
}

/// Ranked results of one recruiter or job search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub mode: SearchMode,
    #[serde(flatten)]
    pub target: ParsedTarget,
    pub results: Vec<RankedResult>,
    pub total_found: usize,
    pub strategies_tried: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
