//! One call to the external web-search API, with boundary validation and
//! per-mode filtering of the returned items.

use super::jobs::{is_job_posting, JobDetails};
use super::{ResultFilter, SearchResultItem, SearchStrategy};
use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use crate::utils::text::shape_snippet;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// The API never returns more than this many items per call.
pub const API_MAX_RESULTS: usize = 10;

const SNIPPET_MAX_CHARS: usize = 200;

/// A failed search call. The caller moves on to its next strategy.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Search request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed search response: {0}")]
    Malformed(String),
}

/// Everything needed to issue a single search call.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub source_strategy: usize,
    pub limit: usize,
    pub filter: ResultFilter,
    pub qualifier: Option<String>,
    /// ISO code for the `cr` country restriction.
    pub country_code: Option<&'static str>,
    pub english_only: bool,
}

impl SearchRequest {
    pub fn new(strategy: &SearchStrategy, limit: usize, filter: ResultFilter) -> Self {
        Self {
            query: strategy.query.clone(),
            source_strategy: strategy.ordinal,
            limit,
            filter,
            qualifier: None,
            country_code: None,
            english_only: false,
        }
    }

    pub fn qualifier(mut self, qualifier: Option<&str>, country_code: Option<&'static str>) -> Self {
        self.qualifier = qualifier.map(str::to_string);
        self.country_code = country_code;
        self
    }

    pub fn english_only(mut self) -> Self {
        self.english_only = true;
        self
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", self.query.clone()),
            ("num", self.limit.clamp(1, API_MAX_RESULTS).to_string()),
            ("safe", "off".to_string()),
        ];
        if let Some(code) = self.country_code {
            params.push(("cr", format!("country{}", code)));
        }
        if self.english_only {
            params.push(("lr", "lang_en".to_string()));
        }
        params
    }
}

#[async_trait]
pub trait SearchGateway: Send + Sync {
    /// Issues one request. Never retries.
    async fn execute(&self, request: &SearchRequest) -> std::result::Result<Vec<SearchResultItem>, SearchError>;
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct RawItem {
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
}

/// Google Custom Search JSON API client.
pub struct CustomSearchGateway {
    client: Client,
    base_url: String,
    api_key: String,
    engine_id: String,
    timeout: Duration,
}

impl CustomSearchGateway {
    /// Fails with [`AppError::SearchNotConfigured`] if either credential is missing.
    pub fn new(config: &Config) -> Result<Self> {
        let (Some(api_key), Some(engine_id)) = (
            config.search_api_key.clone().filter(|k| !k.is_empty()),
            config.search_engine_id.clone().filter(|k| !k.is_empty()),
        ) else {
            return Err(AppError::SearchNotConfigured);
        };

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Initialization(format!("Failed to build search client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.search_base_url.clone(),
            api_key,
            engine_id,
            timeout: config.request_timeout,
        })
    }
}

#[async_trait]
impl SearchGateway for CustomSearchGateway {
    async fn execute(&self, request: &SearchRequest) -> std::result::Result<Vec<SearchResultItem>, SearchError> {
        tracing::debug!(target: "search_task", "Search strategy {}: {}", request.source_strategy + 1, request.query);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("key", self.api_key.as_str()), ("cx", self.engine_id.as_str())])
            .query(&request.params())
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body: body.chars().take(300).collect(),
            });
        }

        let body = response.text().await?;
        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| SearchError::Malformed(e.to_string()))?;

        let total = parsed.items.len();
        let items = filter_items(parsed.items, request);
        tracing::debug!(
            target: "search_task",
            "Strategy {} kept {} of {} items",
            request.source_strategy + 1,
            items.len(),
            total
        );
        Ok(items)
    }
}

fn is_linkedin_profile(url: &str) -> bool {
    url.contains("linkedin.com/in/") || url.contains("linkedin.com/pub/")
}

/// Validates each raw item and keeps the ones the request's filter wants.
fn filter_items(raw: Vec<serde_json::Value>, request: &SearchRequest) -> Vec<SearchResultItem> {
    let qualifier = request.qualifier.as_deref();
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<RawItem>(value) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(target: "search_task", "Skipping malformed search item: {}", e);
                None
            }
        })
        .filter_map(|item| {
            let job = match request.filter {
                ResultFilter::LinkedInProfiles => {
                    if !is_linkedin_profile(&item.link) {
                        return None;
                    }
                    None
                }
                ResultFilter::JobPostings => {
                    if !is_job_posting(&item.title, &item.link, &item.snippet) {
                        return None;
                    }
                    Some(JobDetails::extract(&item.title, &item.link, &item.snippet, qualifier))
                }
                ResultFilter::Unfiltered => None,
            };
            let snippet = match request.filter {
                ResultFilter::LinkedInProfiles => shape_snippet(&item.snippet, qualifier, SNIPPET_MAX_CHARS),
                _ => item.snippet,
            };
            Some(SearchResultItem {
                title: item.title,
                url: item.link,
                snippet,
                source_strategy: request.source_strategy,
                qualifier_searched: request.qualifier.clone(),
                job,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, extract::State, http::StatusCode, routing::get, Json, Router};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::net::TcpListener;

    type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

    async fn search_handler(
        State(seen): State<Seen>,
        Query(params): Query<HashMap<String, String>>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        let q = params.get("q").cloned().unwrap_or_default();
        seen.lock().push(params);
        if q.contains("quota") {
            return (StatusCode::TOO_MANY_REQUESTS, Json(json!({"error": "rate limited"})));
        }
        (
            StatusCode::OK,
            Json(json!({
                "items": [
                    {"title": "Jane Doe - Recruiter - Acme", "link": "https://www.linkedin.com/in/janedoe", "snippet": "Talent partner at Acme in India."},
                    {"title": "Acme Careers", "link": "https://careers.acme.com/jobs/42", "snippet": "Software Engineer, apply now"},
                    {"title": "Acme stock news", "link": "https://news.example.com/acme", "snippet": "Financial results"},
                    {"title": 17, "link": null},
                    {"title": "Old profile", "link": "https://uk.linkedin.com/pub/old/1/2/3"}
                ],
                "searchInformation": {"totalResults": "5"}
            })),
        )
    }

    async fn start_test_server() -> (String, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/customsearch/v1", get(search_handler))
            .route("/broken/v1", get(|| async { "not json" }))
            .route(
                "/partial/v1",
                get(|| async { (StatusCode::PARTIAL_CONTENT, Json(json!({"items": []}))) }),
            )
            .with_state(seen.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), seen)
    }

    fn gateway(base: &str, path: &str) -> CustomSearchGateway {
        let config = Config {
            search_api_key: Some("test-key".into()),
            search_engine_id: Some("test-cx".into()),
            search_base_url: format!("{}{}", base, path),
            ..Config::default()
        };
        CustomSearchGateway::new(&config).unwrap()
    }

    fn strategy(query: &str) -> SearchStrategy {
        SearchStrategy { query: query.to_string(), ordinal: 2 }
    }

    #[test]
    fn requires_credentials() {
        assert!(matches!(
            CustomSearchGateway::new(&Config::default()),
            Err(AppError::SearchNotConfigured)
        ));
    }

    #[tokio::test]
    async fn recruiter_filter_keeps_linkedin_profiles() {
        let (base, seen) = start_test_server().await;
        let request = SearchRequest::new(&strategy("acme recruiter india"), 25, ResultFilter::LinkedInProfiles)
            .qualifier(Some("india"), Some("IN"));

        let items = gateway(&base, "/customsearch/v1").execute(&request).await.unwrap();
        let urls: Vec<&str> = items.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://www.linkedin.com/in/janedoe", "https://uk.linkedin.com/pub/old/1/2/3"]
        );
        assert_eq!(items[0].source_strategy, 2);
        assert_eq!(items[0].qualifier_searched.as_deref(), Some("india"));
        assert!(items[0].job.is_none());

        let params = seen.lock()[0].clone();
        assert_eq!(params["key"], "test-key");
        assert_eq!(params["cx"], "test-cx");
        assert_eq!(params["num"], "10");
        assert_eq!(params["safe"], "off");
        assert_eq!(params["cr"], "countryIN");
        assert!(!params.contains_key("lr"));
    }

    #[tokio::test]
    async fn job_filter_classifies_and_extracts() {
        let (base, seen) = start_test_server().await;
        let request = SearchRequest::new(&strategy("acme jobs"), 5, ResultFilter::JobPostings).english_only();

        let items = gateway(&base, "/customsearch/v1").execute(&request).await.unwrap();
        let urls: Vec<&str> = items.iter().map(|i| i.url.as_str()).collect();
        assert!(urls.contains(&"https://careers.acme.com/jobs/42"));
        assert!(!urls.iter().any(|u| u.contains("news.example.com")));
        assert!(items.iter().all(|i| i.job.is_some()));

        let params = seen.lock()[0].clone();
        assert_eq!(params["num"], "5");
        assert_eq!(params["lr"], "lang_en");
    }

    #[tokio::test]
    async fn unfiltered_keeps_every_valid_item() {
        let (base, _) = start_test_server().await;
        let request = SearchRequest::new(&strategy("\"Jane Doe\" contact"), 10, ResultFilter::Unfiltered);
        let items = gateway(&base, "/customsearch/v1").execute(&request).await.unwrap();
        assert_eq!(items.len(), 4);
    }

    #[tokio::test]
    async fn failures_are_search_errors() {
        let (base, _) = start_test_server().await;

        let request = SearchRequest::new(&strategy("quota"), 10, ResultFilter::Unfiltered);
        let err = gateway(&base, "/customsearch/v1").execute(&request).await.unwrap_err();
        assert!(matches!(err, SearchError::Status { status: 429, .. }));

        let request = SearchRequest::new(&strategy("anything"), 10, ResultFilter::Unfiltered);
        let err = gateway(&base, "/broken/v1").execute(&request).await.unwrap_err();
        assert!(matches!(err, SearchError::Malformed(_)));

        let err = gateway(&base, "/partial/v1").execute(&request).await.unwrap_err();
        assert!(matches!(err, SearchError::Status { status: 206, .. }));

        let err = gateway("http://127.0.0.1:1", "/v1").execute(&request).await.unwrap_err();
        assert!(matches!(err, SearchError::Network(_)));
    }
}
