//! MX resolution with alternate-domain fallback.

use crate::core::config::Config;
use crate::core::models::MxRecordSet;
use crate::utils::domain::CompanyDomainLookup;

use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use trust_dns_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// Resolves a domain to its mail exchangers.
///
/// Implementations never fail: NXDOMAIN, timeouts and empty answers all
/// produce an empty [`MxRecordSet`].
#[async_trait]
pub trait MxResolver: Send + Sync {
    async fn resolve(&self, domain: &str) -> MxRecordSet;
}

/// Builds the async resolver from the configured name servers.
/// Falls back to the resolver's built-in defaults if none of them parse.
pub(crate) fn create_resolver(config: &Config) -> TokioAsyncResolver {
    let mut resolver_config = ResolverConfig::new();
    for server in &config.dns_servers {
        match server.trim().parse::<IpAddr>() {
            Ok(ip) => resolver_config.add_name_server(NameServerConfig::new(
                SocketAddr::new(ip, 53),
                Protocol::Udp,
            )),
            Err(_) => {
                tracing::warn!(target: "dns_task", "Ignoring invalid DNS server address '{}'", server)
            }
        }
    }
    if resolver_config.name_servers().is_empty() {
        tracing::debug!(target: "dns_task", "No usable DNS servers configured, using resolver defaults");
        resolver_config = ResolverConfig::default();
    }

    let mut opts = ResolverOpts::default();
    opts.timeout = config.dns_timeout;
    opts.attempts = 2;

    TokioAsyncResolver::tokio(resolver_config, opts)
}

pub struct DnsMxResolver {
    resolver: TokioAsyncResolver,
}

impl DnsMxResolver {
    pub fn new(config: &Config) -> Self {
        Self {
            resolver: create_resolver(config),
        }
    }
}

#[async_trait]
impl MxResolver for DnsMxResolver {
    async fn resolve(&self, domain: &str) -> MxRecordSet {
        let fqdn = format!("{}.", domain.trim_end_matches('.'));
        match self.resolver.mx_lookup(fqdn.as_str()).await {
            Ok(lookup) => {
                let mut records: Vec<(u16, String)> = lookup
                    .iter()
                    .map(|mx| {
                        (
                            mx.preference(),
                            mx.exchange().to_utf8().trim_end_matches('.').to_string(),
                        )
                    })
                    .filter(|(_, host)| !host.is_empty())
                    .collect();
                records.sort_by_key(|(preference, _)| *preference);

                let mut hosts: Vec<String> = Vec::with_capacity(records.len());
                for (_, host) in records {
                    if !hosts.contains(&host) {
                        hosts.push(host);
                    }
                }
                tracing::debug!(target: "dns_task", "MX for {}: {:?}", domain, hosts);
                MxRecordSet {
                    domain: domain.to_string(),
                    hosts,
                }
            }
            Err(e) => {
                tracing::debug!(target: "dns_task", "MX lookup for {} failed: {}", domain, e);
                MxRecordSet::empty(domain)
            }
        }
    }
}

/// Outcome of resolving a domain and, if needed, its alternates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxResolution {
    /// Records for the effective domain; empty if nothing resolved.
    pub records: MxRecordSet,
    pub original_domain: String,
    pub alternatives_tried: Vec<String>,
}

impl MxResolution {
    pub fn effective_domain(&self) -> &str {
        &self.records.domain
    }

    pub fn used_alternate(&self) -> bool {
        !self.records.is_empty() && self.records.domain != self.original_domain
    }
}

/// Resolves `domain`; if it has no MX hosts, tries each alternate in order and
/// adopts the first one that does.
pub async fn resolve_with_fallback(
    resolver: &dyn MxResolver,
    lookup: &dyn CompanyDomainLookup,
    domain: &str,
) -> MxResolution {
    let primary = resolver.resolve(domain).await;
    if !primary.is_empty() {
        return MxResolution {
            records: primary,
            original_domain: domain.to_string(),
            alternatives_tried: Vec::new(),
        };
    }

    tracing::info!(target: "dns_task", "No MX records for {}, trying alternate domains", domain);
    let mut tried = Vec::new();
    for alternate in lookup.alternates(domain) {
        tried.push(alternate.clone());
        let records = resolver.resolve(&alternate).await;
        if !records.is_empty() {
            tracing::info!(target: "dns_task", "Using alternate domain {} for {}", alternate, domain);
            return MxResolution {
                records,
                original_domain: domain.to_string(),
                alternatives_tried: tried,
            };
        }
    }

    MxResolution {
        records: MxRecordSet::empty(domain),
        original_domain: domain.to_string(),
        alternatives_tried: tried,
    }
}
