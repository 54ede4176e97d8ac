//! HTTP API over [`RecruiterSleuth`].

mod error;
mod handlers;

pub use error::ApiError;

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::sleuth::RecruiterSleuth;

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub sleuth: Arc<RecruiterSleuth>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/api/search", get(handlers::search_recruiters))
        .route("/api/search-jobs", get(handlers::search_jobs))
        .route("/api/guess_emails", post(handlers::guess_emails))
        .route("/api/find_contact", post(handlers::find_contact))
        .route("/api/find_phone", post(handlers::find_phone))
        .route("/api/recommend", post(handlers::recommend))
        .route("/api/cache/stats", get(handlers::cache_stats))
        .route("/api/cache", delete(handlers::clear_cache))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `server_host:server_port` and serves until the process exits.
pub async fn serve(config: &Config, sleuth: Arc<RecruiterSleuth>) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port)
        .parse()
        .map_err(|e| crate::AppError::Config(format!("Invalid server address: {}", e)))?;

    let app = build_router(AppState { sleuth });
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::TtlCache;
    use crate::core::sleuth::SleuthParts;
    use crate::search::gateway::{SearchError, SearchGateway, SearchRequest};
    use crate::search::{QueryParser, SearchResultItem};
    use crate::utils::dns::tests::StaticResolver;
    use crate::utils::domain::KnownCompanyDomains;
    use crate::utils::fetch::PageFetcher;
    use crate::utils::smtp::MailboxProbe;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    struct SlowGateway;

    #[async_trait]
    impl SearchGateway for SlowGateway {
        async fn execute(&self, _request: &SearchRequest) -> std::result::Result<Vec<SearchResultItem>, SearchError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }
    }

    struct Silent;

    #[async_trait]
    impl PageFetcher for Silent {
        async fn fetch_text(&self, _url: &str) -> Option<String> {
            None
        }
    }

    #[async_trait]
    impl MailboxProbe for Silent {
        async fn probe(&self, _email: &str, _mx_hosts: &[String]) -> bool {
            false
        }
    }

    fn app(search: Option<Arc<dyn SearchGateway>>, deadline: Duration) -> Router {
        let config = Arc::new(Config {
            sleep_between_requests: (0.0, 0.0),
            request_deadline: deadline,
            ..Config::default()
        });
        let parts = SleuthParts {
            search,
            resolver: Arc::new(StaticResolver::new(&[("acme.com", &["mx.acme.com"])])),
            probe: Arc::new(Silent),
            fetcher: Arc::new(Silent),
            domains: Arc::new(KnownCompanyDomains),
            parser: Arc::new(QueryParser::default()),
        };
        let sleuth = RecruiterSleuth::from_parts(Arc::clone(&config), parts, Arc::new(TtlCache::new(config.cache_ttl)));
        build_router(AppState {
            sleuth: Arc::new(sleuth),
        })
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_search_configuration() {
        let response = app(None, Duration::from_secs(5)).oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["search_configured"], false);
    }

    #[tokio::test]
    async fn search_validates_company() {
        let response = app(None, Duration::from_secs(5)).oneshot(get("/api/search")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Please provide a company name using ?company=CompanyName");

        let response = app(None, Duration::from_secs(5))
            .oneshot(get("/api/search-jobs?company=G"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Company name must be at least 2 characters long");
    }

    #[tokio::test]
    async fn search_without_credentials_is_a_server_error() {
        let response = app(None, Duration::from_secs(5))
            .oneshot(get("/api/search?company=Google%20India"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Search not configured");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn slow_search_hits_the_deadline() {
        let response = app(Some(Arc::new(SlowGateway)), Duration::from_millis(50))
            .oneshot(get("/api/search?company=Acme"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn guess_emails_validates_body() {
        let response = app(None, Duration::from_secs(5))
            .oneshot(post_json("/api/guess_emails", "not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Invalid request format");

        let response = app(None, Duration::from_secs(5))
            .oneshot(post_json("/api/guess_emails", r#"{"first_name":"Jane","last_name":"Doe"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "Field 'domain' is required");

        let response = app(None, Duration::from_secs(5))
            .oneshot(post_json(
                "/api/guess_emails",
                r#"{"first_name":"J4ne","last_name":"Doe","domain":"acme.com"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Invalid input");
    }

    #[tokio::test]
    async fn guess_emails_reports_patterns_tested() {
        let response = app(None, Duration::from_secs(5))
            .oneshot(post_json(
                "/api/guess_emails",
                r#"{"first_name":"Jane","last_name":"Doe","domain":"https://www.acme.com"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["domain"], "acme.com");
        assert_eq!(body["mx_hosts_found"], 1);
        assert_eq!(body["valid_emails"], serde_json::json!([]));
        assert!(body["total_patterns_tested"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn cache_endpoints() {
        let router = app(None, Duration::from_secs(5));
        let response = router.clone().oneshot(get("/api/cache/stats")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["total_entries"], 0);

        let response = router
            .oneshot(Request::builder().method("DELETE").uri("/api/cache").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
