//! Sanity checks run on the final `Config`.

use super::{Config, Result};
use crate::core::error::AppError;
use std::time::Duration;

/// Clamps out-of-range values (with a warning) and rejects unusable ones.
pub(crate) fn validate_config(config: &mut Config) -> Result<()> {
    if config.sleep_between_requests.0 < 0.0 || config.sleep_between_requests.1 < 0.0 {
        return Err(AppError::Config(
            "Sleep durations cannot be negative.".to_string(),
        ));
    }
    if config.sleep_between_requests.0 > config.sleep_between_requests.1 {
        tracing::warn!(
            "Min sleep ({:.2}s) > Max sleep ({:.2}s). Setting max sleep = min sleep.",
            config.sleep_between_requests.0,
            config.sleep_between_requests.1
        );
        config.sleep_between_requests.1 = config.sleep_between_requests.0;
    }
    if config.dns_servers.is_empty() {
        tracing::warn!("DNS servers list is empty. Falling back to system resolver configuration.");
    }
    if !config.smtp_sender_email.contains('@') || !config.smtp_sender_email.contains('.') {
        return Err(AppError::Config(format!(
            "Invalid SMTP sender email format: {}",
            config.smtp_sender_email
        )));
    }
    if config.smtp_port == 0 {
        return Err(AppError::Config("SMTP port cannot be 0.".to_string()));
    }
    if config.smtp_timeout.is_zero() {
        tracing::warn!("SMTP timeout was 0. Using 10s.");
        config.smtp_timeout = Duration::from_secs(10);
    }
    if url::Url::parse(&config.search_base_url).is_err() {
        return Err(AppError::Config(format!(
            "Invalid search API base URL: {}",
            config.search_base_url
        )));
    }
    if config.max_recruiter_strategies == 0 {
        tracing::warn!("Recruiter strategy cap was 0. Setting to 1.");
        config.max_recruiter_strategies = 1;
    }
    if config.max_job_strategies == 0 {
        tracing::warn!("Job strategy cap was 0. Setting to 1.");
        config.max_job_strategies = 1;
    }
    if config.default_recruiter_results == 0 {
        tracing::warn!("Default recruiter result count was 0. Setting to 10.");
        config.default_recruiter_results = 10;
    }
    if config.default_job_results == 0 {
        tracing::warn!("Default job result count was 0. Setting to 15.");
        config.default_job_results = 15;
    }
    if config.phone_max_results == 0 {
        tracing::warn!("Phone result cap was 0. Setting to 1.");
        config.phone_max_results = 1;
    }
    if config.max_concurrency == 0 {
        tracing::warn!("Max concurrency was set to 0. Setting to 1.");
        config.max_concurrency = 1;
    }
    if !config.has_search_credentials() {
        tracing::warn!(
            "Search API key or engine id missing. Recruiter, job and phone search will be unavailable."
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_sender_without_domain() {
        let mut config = Config {
            smtp_sender_email: "not-an-address".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            validate_config(&mut config),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn clamps_zero_caps() {
        let mut config = Config {
            max_concurrency: 0,
            max_job_strategies: 0,
            sleep_between_requests: (1.0, 0.5),
            ..Config::default()
        };
        validate_config(&mut config).unwrap();
        assert_eq!(config.max_concurrency, 1);
        assert_eq!(config.max_job_strategies, 1);
        assert_eq!(config.sleep_between_requests, (1.0, 1.0));
    }

    #[test]
    fn rejects_bad_search_url() {
        let mut config = Config {
            search_base_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(validate_config(&mut config).is_err());
    }
}
