//! Page fetching used to find extra text for phone extraction.

use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use crate::utils::text::{strip_html, truncate_chars};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Characters of visible page text kept per fetch.
pub const MAX_PAGE_CHARS: usize = 5000;

/// Fetches a page and returns its visible text.
///
/// Failures of any kind are swallowed and reported as `None`.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Option<String>;
}

pub struct HttpPageFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpPageFetcher {
    /// Builds a fetcher sending the configured browser-like user agent.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.page_fetch_timeout)
            .build()
            .map_err(|e| AppError::Initialization(format!("Failed to build page fetch client: {}", e)))?;
        Ok(Self {
            client,
            timeout: config.page_fetch_timeout,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_text(&self, url: &str) -> Option<String> {
        tracing::debug!(target: "phone_task", "Fetching page {}", url);
        let response = match self.client.get(url).timeout(self.timeout).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(target: "phone_task", "Fetch of {} failed: {}", url, e);
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            tracing::debug!(target: "phone_task", "Fetch of {} returned {}", url, response.status());
            return None;
        }

        match response.text().await {
            Ok(body) => Some(truncate_chars(&strip_html(&body), MAX_PAGE_CHARS)),
            Err(e) => {
                tracing::debug!(target: "phone_task", "Could not read body of {}: {}", url, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode as AxumStatus, response::IntoResponse, routing::get, Router};
    use tokio::net::TcpListener;

    async fn start_test_server() -> String {
        let long_body = format!("<html><body>{}</body></html>", "a ".repeat(4000));
        let app = Router::new()
            .route(
                "/profile",
                get(|| async { "<html><body><h1>Priya</h1><p>Mobile: +91 98765 43210</p></body></html>" }),
            )
            .route("/long", get(move || async move { long_body }))
            .route("/missing", get(|| async { AxumStatus::NOT_FOUND.into_response() }));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn returns_visible_text() {
        let base = start_test_server().await;
        let fetcher = HttpPageFetcher::new(&Config::default()).unwrap();

        let text = fetcher.fetch_text(&format!("{}/profile", base)).await.unwrap();
        assert_eq!(text, "Priya Mobile: +91 98765 43210");
    }

    #[tokio::test]
    async fn truncates_long_pages() {
        let base = start_test_server().await;
        let fetcher = HttpPageFetcher::new(&Config::default()).unwrap();

        let text = fetcher.fetch_text(&format!("{}/long", base)).await.unwrap();
        assert_eq!(text.chars().count(), MAX_PAGE_CHARS);
    }

    #[tokio::test]
    async fn non_200_and_unreachable_are_none() {
        let base = start_test_server().await;
        let fetcher = HttpPageFetcher::new(&Config::default()).unwrap();

        assert!(fetcher.fetch_text(&format!("{}/missing", base)).await.is_none());
        assert!(fetcher.fetch_text("http://127.0.0.1:1/nothing").await.is_none());
    }
}
