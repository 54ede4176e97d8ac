//! Provides the `ConfigBuilder` for fluent configuration construction.

use super::loading::{apply_file_config, load_config_file};
use super::validation::validate_config;
use super::{Config, ConfigFile, Result};
use crate::AppError;
use std::path::Path;
use std::time::Duration;

const DEFAULT_CONFIG_LOCATIONS: [&str; 2] = ["./recruiter-sleuth.toml", "./config.toml"];

/// Builds a validated `Config` from defaults, an optional TOML file and overrides.
///
/// Overrides always win over file values, which win over defaults.
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
    config_file_path: Option<String>,
    skip_default_files: bool,
    overrides: ConfigFile,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load this TOML file instead of probing the default locations.
    pub fn config_file(mut self, path: impl Into<String>) -> Self {
        self.config_file_path = Some(path.into());
        self
    }

    /// Do not probe `./recruiter-sleuth.toml` / `./config.toml`.
    pub fn skip_default_files(mut self) -> Self {
        self.skip_default_files = true;
        self
    }

    pub fn max_concurrency(mut self, value: usize) -> Self {
        self.overrides.processing.max_concurrency = Some(value);
        self
    }
    pub fn sleep_between_requests(mut self, min: f32, max: f32) -> Self {
        self.overrides.network.min_sleep = Some(min);
        self.overrides.network.max_sleep = Some(max);
        self
    }
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.overrides.network.request_timeout = Some(duration.as_secs());
        self
    }
    pub fn page_fetch_timeout(mut self, duration: Duration) -> Self {
        self.overrides.network.page_fetch_timeout = Some(duration.as_secs());
        self
    }
    pub fn request_deadline(mut self, duration: Duration) -> Self {
        self.overrides.network.request_deadline = Some(duration.as_secs());
        self
    }
    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.overrides.network.user_agent = Some(value.into());
        self
    }
    pub fn dns_timeout(mut self, duration: Duration) -> Self {
        self.overrides.dns.dns_timeout = Some(duration.as_secs());
        self
    }
    pub fn dns_servers(mut self, servers: Vec<String>) -> Self {
        self.overrides.dns.dns_servers = Some(servers);
        self
    }
    pub fn smtp_timeout(mut self, duration: Duration) -> Self {
        self.overrides.smtp.smtp_timeout = Some(duration.as_secs());
        self
    }
    pub fn smtp_sender_email(mut self, value: impl Into<String>) -> Self {
        self.overrides.smtp.smtp_sender_email = Some(value.into());
        self
    }
    pub fn smtp_port(mut self, port: u16) -> Self {
        self.overrides.smtp.smtp_port = Some(port);
        self
    }
    pub fn search_api_key(mut self, key: impl Into<String>) -> Self {
        self.overrides.search.api_key = Some(key.into());
        self
    }
    pub fn search_engine_id(mut self, cx: impl Into<String>) -> Self {
        self.overrides.search.engine_id = Some(cx.into());
        self
    }
    pub fn search_base_url(mut self, url: impl Into<String>) -> Self {
        self.overrides.search.base_url = Some(url.into());
        self
    }
    pub fn max_recommendations(mut self, value: usize) -> Self {
        self.overrides.search.max_recommendations = Some(value);
        self
    }
    /// Phone search stops once both targets are met.
    pub fn phone_early_stop(mut self, regional: usize, global: usize) -> Self {
        self.overrides.phone.regional_target = Some(regional);
        self.overrides.phone.global_target = Some(global);
        self
    }
    pub fn phone_max_results(mut self, value: usize) -> Self {
        self.overrides.phone.max_results = Some(value);
        self
    }
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.overrides.cache.ttl_secs = Some(ttl.as_secs());
        self
    }
    pub fn server_host(mut self, host: impl Into<String>) -> Self {
        self.overrides.server.host = Some(host.into());
        self
    }
    pub fn server_port(mut self, port: u16) -> Self {
        self.overrides.server.port = Some(port);
        self
    }
    pub fn debug(mut self, enable: bool) -> Self {
        self.overrides.server.debug = Some(enable);
        self
    }

    /// Builds the final `Config`, applying file settings, overrides and validation.
    pub fn build(mut self) -> Result<Config> {
        let mut loaded_path: Option<String> = None;

        if let Some(ref path) = self.config_file_path {
            match load_config_file(path) {
                Ok(file_config) => {
                    apply_file_config(&mut self.config, &file_config);
                    loaded_path = Some(path.clone());
                    tracing::info!("Loaded base configuration from specified file: {}", path);
                }
                Err(e) => {
                    tracing::error!("Failed to load specified config file '{}': {}", path, e);
                    return Err(AppError::Config(format!(
                        "Failed to load specified configuration file '{}': {:#}",
                        path, e
                    )));
                }
            }
        } else if !self.skip_default_files {
            for path_str in DEFAULT_CONFIG_LOCATIONS {
                if !Path::new(path_str).exists() {
                    continue;
                }
                match load_config_file(path_str) {
                    Ok(file_config) => {
                        apply_file_config(&mut self.config, &file_config);
                        loaded_path = Some(path_str.to_string());
                        tracing::info!(
                            "Loaded base configuration from default location: {}",
                            path_str
                        );
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Failed to load or parse default config '{}': {:#}",
                            path_str,
                            e
                        );
                    }
                }
            }
            if loaded_path.is_none() {
                tracing::debug!("No configuration file found. Using defaults and overrides.");
            }
        }

        apply_file_config(&mut self.config, &self.overrides);
        self.config.loaded_config_path = loaded_path;
        validate_config(&mut self.config)?;

        tracing::debug!("Configuration built: {:?}", self.config);
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn overrides_beat_file_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[smtp]\nsmtp_port = 2525\nsmtp_timeout = 4\n[processing]\nmax_concurrency = 9"
        )
        .unwrap();

        let config = ConfigBuilder::new()
            .config_file(file.path().to_str().unwrap())
            .smtp_port(2626)
            .build()
            .unwrap();

        assert_eq!(config.smtp_port, 2626);
        assert_eq!(config.smtp_timeout, Duration::from_secs(4));
        assert_eq!(config.max_concurrency, 9);
        assert!(config.loaded_config_path.is_some());
    }

    #[test]
    fn explicit_missing_file_fails() {
        let result = ConfigBuilder::new()
            .config_file("/nope/recruiter-sleuth.toml")
            .build();
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn credentials_flow_through() {
        let config = ConfigBuilder::new()
            .skip_default_files()
            .search_api_key("k")
            .search_engine_id("cx")
            .phone_early_stop(3, 2)
            .build()
            .unwrap();
        assert!(config.has_search_credentials());
        assert_eq!(config.phone_regional_target, 3);
        assert_eq!(config.phone_global_target, 2);
    }
}
