//! Reads the TOML configuration file and merges it onto a `Config`.

use super::{Config, ConfigFile};
use anyhow::Context;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Parses a TOML configuration file.
pub(crate) fn load_config_file(file_path: &str) -> anyhow::Result<ConfigFile> {
    let path = Path::new(file_path);
    if !path.is_file() {
        return Err(anyhow::anyhow!(
            "File not found or is not a file: {}",
            file_path
        ));
    }
    tracing::debug!("Reading config file: {}", file_path);
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", file_path))?;

    let parsed: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML configuration from {}", file_path))?;

    tracing::debug!("Parsed configuration file: {}", file_path);
    Ok(parsed)
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Overlays every `Some` field of `file_config` onto `config`.
/// Used for both the file contents and the builder overrides.
pub(crate) fn apply_file_config(config: &mut Config, file_config: &ConfigFile) {
    let network = &file_config.network;
    if let Some(secs) = network.request_timeout {
        config.request_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = network.page_fetch_timeout {
        config.page_fetch_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = network.request_deadline {
        config.request_deadline = Duration::from_secs(secs);
    }
    if let Some(min_sleep) = network.min_sleep {
        config.sleep_between_requests.0 = min_sleep;
    }
    if let Some(max_sleep) = network.max_sleep {
        config.sleep_between_requests.1 = max_sleep;
    }
    if let Some(agent) = non_empty(&network.user_agent) {
        config.user_agent = agent;
    }

    if let Some(secs) = file_config.dns.dns_timeout {
        config.dns_timeout = Duration::from_secs(secs);
    }
    if let Some(ref servers) = file_config.dns.dns_servers {
        if !servers.is_empty() {
            config.dns_servers = servers.clone();
        }
    }

    let smtp = &file_config.smtp;
    if let Some(secs) = smtp.smtp_timeout {
        config.smtp_timeout = Duration::from_secs(secs);
    }
    if let Some(sender) = non_empty(&smtp.smtp_sender_email) {
        config.smtp_sender_email = sender;
    }
    if let Some(port) = smtp.smtp_port {
        config.smtp_port = port;
    }

    let search = &file_config.search;
    if let Some(key) = non_empty(&search.api_key) {
        config.search_api_key = Some(key);
    }
    if let Some(cx) = non_empty(&search.engine_id) {
        config.search_engine_id = Some(cx);
    }
    if let Some(url) = non_empty(&search.base_url) {
        config.search_base_url = url;
    }
    if let Some(n) = search.max_recruiter_strategies {
        config.max_recruiter_strategies = n;
    }
    if let Some(n) = search.max_job_strategies {
        config.max_job_strategies = n;
    }
    if let Some(n) = search.default_recruiter_results {
        config.default_recruiter_results = n;
    }
    if let Some(n) = search.default_job_results {
        config.default_job_results = n;
    }
    if let Some(n) = search.max_recommendations {
        config.max_recommendations = n;
    }
    if let Some(n) = search.max_target_companies {
        config.max_target_companies = n;
    }

    let phone = &file_config.phone;
    if let Some(n) = phone.regional_target {
        config.phone_regional_target = n;
    }
    if let Some(n) = phone.global_target {
        config.phone_global_target = n;
    }
    if let Some(n) = phone.secondary_total {
        config.phone_secondary_total = n;
    }
    if let Some(n) = phone.secondary_after {
        config.phone_secondary_after = n;
    }
    if let Some(n) = phone.max_results {
        config.phone_max_results = n;
    }

    if let Some(concurrency) = file_config.processing.max_concurrency {
        config.max_concurrency = concurrency;
    }
    if let Some(ttl) = file_config.cache.ttl_secs {
        config.cache_ttl = Duration::from_secs(ttl);
    }

    let server = &file_config.server;
    if let Some(host) = non_empty(&server.host) {
        config.server_host = host;
    }
    if let Some(port) = server.port {
        config.server_port = port;
    }
    if let Some(debug) = server.debug {
        config.debug = debug;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_partial_file_and_applies_only_present_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[smtp]
smtp_port = 2525

[phone]
regional_target = 3

[search]
api_key = "  "
"#
        )
        .unwrap();

        let parsed = load_config_file(file.path().to_str().unwrap()).unwrap();
        let mut config = Config::default();
        apply_file_config(&mut config, &parsed);

        assert_eq!(config.smtp_port, 2525);
        assert_eq!(config.phone_regional_target, 3);
        assert_eq!(config.phone_global_target, 1);
        assert!(config.search_api_key.is_none());
        assert_eq!(config.smtp_timeout, Duration::from_secs(10));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_config_file("/definitely/not/here.toml").is_err());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[smtp\nsmtp_port = ").unwrap();
        assert!(load_config_file(file.path().to_str().unwrap()).is_err());
    }
}
