//! Runtime configuration: defaults, the TOML file shape, and the builder.

mod builder;
mod loading;
mod validation;

pub use builder::ConfigBuilder;

pub(crate) use crate::core::error::Result;

use rand::Rng;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_SEARCH_BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Browser-like user agent sent with search and page-fetch requests.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Fully resolved settings used by every component.
#[derive(Clone)]
pub struct Config {
    // Network
    pub request_timeout: Duration,
    pub page_fetch_timeout: Duration,
    pub request_deadline: Duration,
    pub sleep_between_requests: (f32, f32),
    pub user_agent: String,

    // DNS
    pub dns_timeout: Duration,
    pub dns_servers: Vec<String>,

    // SMTP
    pub smtp_timeout: Duration,
    pub smtp_sender_email: String,
    pub smtp_port: u16,

    // Search
    pub search_api_key: Option<String>,
    pub search_engine_id: Option<String>,
    pub search_base_url: String,
    pub max_recruiter_strategies: usize,
    pub max_job_strategies: usize,
    pub default_recruiter_results: usize,
    pub default_job_results: usize,
    pub max_recommendations: usize,
    pub max_target_companies: usize,

    // Phone search stopping policy
    pub phone_regional_target: usize,
    pub phone_global_target: usize,
    pub phone_secondary_total: usize,
    pub phone_secondary_after: usize,
    pub phone_max_results: usize,

    // Processing
    pub max_concurrency: usize,
    pub cache_ttl: Duration,

    // Server
    pub server_host: String,
    pub server_port: u16,
    pub debug: bool,

    pub loaded_config_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            page_fetch_timeout: Duration::from_secs(10),
            request_deadline: Duration::from_secs(120),
            sleep_between_requests: (0.1, 0.5),
            user_agent: DEFAULT_USER_AGENT.to_string(),

            dns_timeout: Duration::from_secs(5),
            dns_servers: vec![
                "8.8.8.8".to_string(),
                "8.8.4.4".to_string(),
                "1.1.1.1".to_string(),
            ],

            smtp_timeout: Duration::from_secs(10),
            smtp_sender_email: "no-reply@recruitersleuth.app".to_string(),
            smtp_port: 25,

            search_api_key: None,
            search_engine_id: None,
            search_base_url: DEFAULT_SEARCH_BASE_URL.to_string(),
            max_recruiter_strategies: 10,
            max_job_strategies: 8,
            default_recruiter_results: 10,
            default_job_results: 15,
            max_recommendations: 8,
            max_target_companies: 5,

            phone_regional_target: 2,
            phone_global_target: 1,
            phone_secondary_total: 5,
            phone_secondary_after: 10,
            phone_max_results: 3,

            max_concurrency: 5,
            cache_ttl: Duration::from_secs(24 * 60 * 60),

            server_host: "0.0.0.0".to_string(),
            server_port: 5000,
            debug: false,

            loaded_config_path: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Config")
            .field("request_timeout", &self.request_timeout)
            .field("page_fetch_timeout", &self.page_fetch_timeout)
            .field("request_deadline", &self.request_deadline)
            .field("sleep_between_requests", &self.sleep_between_requests)
            .field("dns_timeout", &self.dns_timeout)
            .field("dns_servers", &self.dns_servers)
            .field("smtp_timeout", &self.smtp_timeout)
            .field("smtp_sender_email", &self.smtp_sender_email)
            .field("smtp_port", &self.smtp_port)
            .field("search_api_key", &redacted(&self.search_api_key))
            .field("search_engine_id", &redacted(&self.search_engine_id))
            .field("search_base_url", &self.search_base_url)
            .field("max_recruiter_strategies", &self.max_recruiter_strategies)
            .field("max_job_strategies", &self.max_job_strategies)
            .field("phone_regional_target", &self.phone_regional_target)
            .field("phone_global_target", &self.phone_global_target)
            .field("phone_max_results", &self.phone_max_results)
            .field("max_concurrency", &self.max_concurrency)
            .field("cache_ttl", &self.cache_ttl)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("debug", &self.debug)
            .field("loaded_config_path", &self.loaded_config_path)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Domain announced in the SMTP greeting, taken from the sender address.
    pub fn helo_domain(&self) -> &str {
        self.smtp_sender_email
            .rsplit_once('@')
            .map(|(_, domain)| domain)
            .unwrap_or("localhost")
    }

    pub fn has_search_credentials(&self) -> bool {
        self.search_api_key.as_deref().is_some_and(|k| !k.is_empty())
            && self.search_engine_id.as_deref().is_some_and(|c| !c.is_empty())
    }
}

/// Random pause between consecutive search strategies.
pub fn get_random_sleep_duration(config: &Config) -> Duration {
    let (min, max) = config.sleep_between_requests;
    if max <= 0.0 {
        return Duration::ZERO;
    }
    let secs = if max > min {
        rand::thread_rng().gen_range(min..max)
    } else {
        min
    };
    Duration::from_secs_f32(secs)
}

/// Shape of the TOML configuration file. Every field is optional.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct ConfigFile {
    pub network: NetworkConfig,
    pub dns: DnsConfig,
    pub smtp: SmtpConfig,
    pub search: SearchConfig,
    pub phone: PhoneConfig,
    pub processing: ProcessingConfig,
    pub cache: CacheConfig,
    pub server: ServerConfig,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct NetworkConfig {
    pub request_timeout: Option<u64>,
    pub page_fetch_timeout: Option<u64>,
    pub request_deadline: Option<u64>,
    pub min_sleep: Option<f32>,
    pub max_sleep: Option<f32>,
    pub user_agent: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct DnsConfig {
    pub dns_timeout: Option<u64>,
    pub dns_servers: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct SmtpConfig {
    pub smtp_timeout: Option<u64>,
    pub smtp_sender_email: Option<String>,
    pub smtp_port: Option<u16>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub api_key: Option<String>,
    pub engine_id: Option<String>,
    pub base_url: Option<String>,
    pub max_recruiter_strategies: Option<usize>,
    pub max_job_strategies: Option<usize>,
    pub default_recruiter_results: Option<usize>,
    pub default_job_results: Option<usize>,
    pub max_recommendations: Option<usize>,
    pub max_target_companies: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct PhoneConfig {
    pub regional_target: Option<usize>,
    pub global_target: Option<usize>,
    pub secondary_total: Option<usize>,
    pub secondary_after: Option<usize>,
    pub max_results: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct ProcessingConfig {
    pub max_concurrency: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub debug: Option<bool>,
}
