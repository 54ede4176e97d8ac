use super::error::ApiError;
use super::AppState;
use crate::core::cache::CacheStats;
use crate::core::error::Result;
use crate::core::matcher::{target_companies, MatchResult, SubjectProfile};
use crate::core::models::{ContactReport, EmailReport, PhoneReport};
use crate::search::SearchOutcome;
use crate::utils::patterns::extract_letters_only;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::future::Future;

const MIN_COMPANY_CHARS: usize = 2;

/// Runs one pipeline call under the configured request deadline.
/// In-flight work is dropped when the deadline elapses.
async fn within_deadline<T>(state: &AppState, work: impl Future<Output = Result<T>>) -> std::result::Result<T, ApiError> {
    let config = state.sleuth.config();
    match tokio::time::timeout(config.request_deadline, work).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ApiError::pipeline(e, config.debug)),
        Err(_) => Err(ApiError::DeadlineExceeded(config.request_deadline)),
    }
}

fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> std::result::Result<T, ApiError> {
    payload
        .map(|Json(inner)| inner)
        .map_err(|rejection| ApiError::bad_request("Invalid request format", rejection.body_text()))
}

fn required<'a>(field: &'static str, value: &'a Option<String>) -> std::result::Result<&'a str, ApiError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing required field", format!("Field '{}' is required", field)))
}

fn company_param(company: &Option<String>) -> std::result::Result<&str, ApiError> {
    let company = company.as_deref().map(str::trim).unwrap_or("");
    if company.is_empty() {
        return Err(ApiError::bad_request(
            "Company parameter is required",
            "Please provide a company name using ?company=CompanyName",
        ));
    }
    if company.chars().count() < MIN_COMPANY_CHARS {
        return Err(ApiError::bad_request(
            "Invalid company name",
            "Company name must be at least 2 characters long",
        ));
    }
    Ok(company)
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "recruiter-sleuth",
        "search_configured": state.sleuth.config().has_search_credentials(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub company: Option<String>,
    pub location: Option<String>,
    pub max_results: Option<usize>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub company: String,
    #[serde(flatten)]
    pub outcome: SearchOutcome,
}

/// GET /api/search
pub async fn search_recruiters(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> std::result::Result<Json<SearchResponse>, ApiError> {
    let company = company_param(&params.company)?;
    let max_results = params
        .max_results
        .unwrap_or(state.sleuth.config().default_recruiter_results);

    let outcome = within_deadline(&state, state.sleuth.search_recruiters(company, max_results)).await?;
    Ok(Json(SearchResponse {
        company: company.to_string(),
        outcome,
    }))
}

/// GET /api/search-jobs
pub async fn search_jobs(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> std::result::Result<Json<SearchResponse>, ApiError> {
    let company = company_param(&params.company)?;
    let max_results = params.max_results.unwrap_or(state.sleuth.config().default_job_results);

    let outcome = within_deadline(
        &state,
        state.sleuth.search_jobs(company, params.location.as_deref(), max_results),
    )
    .await?;
    Ok(Json(SearchResponse {
        company: company.to_string(),
        outcome,
    }))
}

#[derive(Debug, Deserialize)]
pub struct PersonRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub domain: Option<String>,
    pub company: Option<String>,
}

/// POST /api/guess_emails
pub async fn guess_emails(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PersonRequest>, JsonRejection>,
) -> std::result::Result<Json<EmailReport>, ApiError> {
    let request = body(payload)?;
    let first_name = required("first_name", &request.first_name)?;
    let last_name = required("last_name", &request.last_name)?;
    let domain = required("domain", &request.domain)?;

    let report = within_deadline(&state, state.sleuth.guess_emails(first_name, last_name, domain)).await?;
    Ok(Json(report))
}

/// POST /api/find_contact
pub async fn find_contact(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PersonRequest>, JsonRejection>,
) -> std::result::Result<Json<ContactReport>, ApiError> {
    let request = body(payload)?;
    let first_name = required("first_name", &request.first_name)?;
    let last_name = required("last_name", &request.last_name)?;
    let domain = required("domain", &request.domain)?;

    let report = within_deadline(
        &state,
        state
            .sleuth
            .find_contact(first_name, last_name, domain, request.company.as_deref()),
    )
    .await?;
    Ok(Json(report))
}

#[derive(Serialize)]
pub struct PhoneResponse {
    pub first_name: String,
    pub last_name: String,
    pub original_first_name: String,
    pub original_last_name: String,
    pub company: String,
    #[serde(flatten)]
    pub phones: PhoneReport,
}

/// POST /api/find_phone
pub async fn find_phone(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PersonRequest>, JsonRejection>,
) -> std::result::Result<Json<PhoneResponse>, ApiError> {
    let request = body(payload)?;
    let first_name = required("first_name", &request.first_name)?;
    let last_name = required("last_name", &request.last_name)?;
    let company = required("company", &request.company)?;

    let phones = within_deadline(&state, state.sleuth.find_phones(first_name, last_name, company)).await?;
    Ok(Json(PhoneResponse {
        first_name: extract_letters_only(first_name),
        last_name: extract_letters_only(last_name),
        original_first_name: first_name.to_string(),
        original_last_name: last_name.to_string(),
        company: company.to_string(),
        phones,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub profile: SubjectProfile,
    pub location: Option<String>,
    pub max_results: Option<usize>,
}

#[derive(Serialize)]
pub struct RecommendResponse {
    pub target_companies: Vec<String>,
    pub total: usize,
    pub recommendations: Vec<MatchResult>,
}

/// POST /api/recommend
pub async fn recommend(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RecommendRequest>, JsonRejection>,
) -> std::result::Result<Json<RecommendResponse>, ApiError> {
    let request = body(payload)?;
    let companies = target_companies(&request.profile, state.sleuth.config().max_target_companies);

    let recommendations = within_deadline(
        &state,
        state
            .sleuth
            .recommend_recruiters(&request.profile, request.location.as_deref(), request.max_results),
    )
    .await?;
    Ok(Json(RecommendResponse {
        target_companies: companies,
        total: recommendations.len(),
        recommendations,
    }))
}

/// GET /api/cache/stats
pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.sleuth.cache().stats())
}

/// DELETE /api/cache
pub async fn clear_cache(State(state): State<AppState>) -> Json<Value> {
    state.sleuth.cache().clear();
    tracing::info!("Search cache cleared");
    Json(json!({ "message": "Cache cleared successfully" }))
}
