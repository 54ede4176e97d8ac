//! Domain normalisation and the static company-domain knowledge tables.

use crate::core::error::{AppError, Result};
use url::Url;

/// Reduces a domain or website URL to a bare lower-case host without `www.`.
///
/// Accepts `acme.com`, `www.acme.com`, `https://acme.com/careers` and similar.
/// Returns `Err(AppError::DomainExtraction)` for empty input or hosts without a dot.
pub(crate) fn get_domain_from_url(website_url_or_domain: &str) -> Result<String> {
    let trimmed = website_url_or_domain.trim();
    if trimmed.is_empty() {
        return Err(AppError::DomainExtraction(
            "Input string is empty".to_string(),
        ));
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&with_scheme).map_err(|e| {
        tracing::debug!("Failed to parse '{}' as URL: {}", with_scheme, e);
        AppError::UrlParse(e)
    })?;

    let host = url.host_str().filter(|h| !h.is_empty()).ok_or_else(|| {
        AppError::DomainExtraction(format!("Could not extract host from: {}", trimmed))
    })?;

    let domain = host.strip_prefix("www.").unwrap_or(host).to_lowercase();
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(AppError::DomainExtraction(format!(
            "Extracted domain appears invalid: {}",
            domain
        )));
    }
    Ok(domain)
}

/// Normalised company token used to key the alias table: ".com" removed, lower-cased.
pub fn company_token(domain: &str) -> String {
    domain.trim().to_lowercase().replace(".com", "")
}

/// Lower-cased entity name with everything but letters and digits removed,
/// used to guess career-site domains (`Goldman Sachs` -> `goldmansachs`).
pub fn slug_company(entity: &str) -> String {
    entity
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Knowledge about which domains a company actually receives mail on.
pub trait CompanyDomainLookup: Send + Sync {
    /// Known alias domains for a normalised company token, in preference order.
    fn aliases(&self, token: &str) -> Option<&'static [&'static str]>;

    /// Best-guess primary web domain for a free-text company name.
    fn primary_domain(&self, company: &str) -> String;

    /// Up to five domains to try when `domain` has no mail exchangers.
    ///
    /// Known aliases come first; otherwise generic corporate variants of the
    /// base name are synthesised. The original domain is never included.
    fn alternates(&self, domain: &str) -> Vec<String> {
        let original = domain.trim().to_lowercase();
        let base = company_token(&original);

        let candidates: Vec<String> = match self.aliases(&base) {
            Some(known) => known.iter().map(|d| d.to_string()).collect(),
            None => vec![
                format!("{base}.com"),
                format!("{base}group.com"),
                format!("{base}corp.com"),
                format!("{base}inc.com"),
                format!("the{base}.com"),
            ],
        };

        let mut alternates: Vec<String> = Vec::new();
        for candidate in candidates {
            if candidate != original && !alternates.contains(&candidate) {
                alternates.push(candidate);
            }
        }
        alternates.truncate(5);
        alternates
    }
}

/// The built-in table of corporate domain aliases.
#[derive(Debug, Default, Clone, Copy)]
pub struct KnownCompanyDomains;

const DOMAIN_ALIASES: &[(&str, &[&str])] = &[
    ("natwest", &["natwest.com", "natwestgroup.com", "rbs.com"]),
    ("rbs", &["rbs.com", "natwest.com", "natwestgroup.com"]),
    ("microsoft", &["microsoft.com"]),
    ("google", &["google.com", "alphabet.com"]),
    ("amazon", &["amazon.com", "aboutamazon.com"]),
    ("apple", &["apple.com"]),
    ("meta", &["meta.com", "facebook.com"]),
    ("facebook", &["meta.com", "facebook.com"]),
    ("netflix", &["netflix.com"]),
    ("tesla", &["tesla.com"]),
    ("uber", &["uber.com"]),
    ("airbnb", &["airbnb.com"]),
    ("spotify", &["spotify.com"]),
    ("adobe", &["adobe.com"]),
    ("salesforce", &["salesforce.com"]),
    ("oracle", &["oracle.com"]),
    ("ibm", &["ibm.com"]),
    ("intel", &["intel.com"]),
    ("nvidia", &["nvidia.com"]),
    ("paypal", &["paypal.com"]),
    ("visa", &["visa.com"]),
    ("mastercard", &["mastercard.com"]),
    ("jpmorgan", &["jpmorganchase.com", "jpmorgan.com"]),
    ("goldmansachs", &["gs.com", "goldmansachs.com"]),
    ("morganstanley", &["morganstanley.com"]),
    ("citi", &["citi.com", "citigroup.com"]),
    ("bankofamerica", &["bankofamerica.com", "bofa.com"]),
    ("wellsfargo", &["wellsfargo.com"]),
    ("hsbc", &["hsbc.com", "hsbc.co.uk"]),
    ("barclays", &["barclays.com", "barclays.co.uk"]),
    ("lloyds", &["lloydsbank.com", "lloydsbankinggroup.com"]),
    ("santander", &["santander.com", "santander.co.uk"]),
    ("deutsche", &["db.com", "deutsche-bank.com"]),
    ("ubs", &["ubs.com"]),
    ("creditsuisse", &["credit-suisse.com"]),
];

const PRIMARY_DOMAINS: &[(&str, &str)] = &[
    ("natwest", "natwest.com"),
    ("google", "google.com"),
    ("microsoft", "microsoft.com"),
    ("amazon", "amazon.com"),
    ("meta", "meta.com"),
    ("facebook", "meta.com"),
    ("apple", "apple.com"),
    ("netflix", "netflix.com"),
    ("uber", "uber.com"),
    ("salesforce", "salesforce.com"),
    ("oracle", "oracle.com"),
    ("ibm", "ibm.com"),
];

impl CompanyDomainLookup for KnownCompanyDomains {
    fn aliases(&self, token: &str) -> Option<&'static [&'static str]> {
        DOMAIN_ALIASES
            .iter()
            .find(|(key, _)| *key == token)
            .map(|(_, domains)| *domains)
    }

    fn primary_domain(&self, company: &str) -> String {
        let lower = company.trim().to_lowercase();
        if let Some((_, domain)) = PRIMARY_DOMAINS.iter().find(|(key, _)| lower.contains(key)) {
            return domain.to_string();
        }
        let stripped = lower
            .replace(' ', "")
            .replace("group", "")
            .replace("inc", "")
            .replace("ltd", "");
        format!("{}.com", slug_company(&stripped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bare_domains() {
        assert_eq!(
            get_domain_from_url("https://www.example.com").unwrap(),
            "example.com"
        );
        assert_eq!(get_domain_from_url("example.com").unwrap(), "example.com");
        assert_eq!(
            get_domain_from_url("https://EXAMPLE.com/careers?x=1").unwrap(),
            "example.com"
        );
        assert_eq!(
            get_domain_from_url(" jobs.example.co.uk ").unwrap(),
            "jobs.example.co.uk"
        );
    }

    #[test]
    fn rejects_unusable_domains() {
        assert!(get_domain_from_url("").is_err());
        assert!(get_domain_from_url("https://").is_err());
        assert!(get_domain_from_url("example").is_err());
        assert!(get_domain_from_url(".com").is_err());
    }

    #[test]
    fn table_alternates_exclude_original() {
        let alternates = KnownCompanyDomains.alternates("rbs.com");
        assert_eq!(alternates, vec!["natwest.com", "natwestgroup.com"]);
    }

    #[test]
    fn generic_alternates_for_unknown_company() {
        let alternates = KnownCompanyDomains.alternates("Widgetly.io");
        assert_eq!(
            alternates,
            vec![
                "widgetly.io.com",
                "widgetly.iogroup.com",
                "widgetly.iocorp.com",
                "widgetly.ioinc.com",
                "thewidgetly.io.com"
            ]
        );

        let alternates = KnownCompanyDomains.alternates("widgetly.com");
        assert_eq!(alternates.len(), 4);
        assert!(!alternates.contains(&"widgetly.com".to_string()));
        assert_eq!(alternates[0], "widgetlygroup.com");
    }

    #[test]
    fn primary_domain_lookup_and_fallback() {
        assert_eq!(KnownCompanyDomains.primary_domain("Facebook"), "meta.com");
        assert_eq!(KnownCompanyDomains.primary_domain("NatWest Group"), "natwest.com");
        assert_eq!(
            KnownCompanyDomains.primary_domain("Acme Widgets Ltd"),
            "acmewidgets.com"
        );
    }

    #[test]
    fn slugs_entities() {
        assert_eq!(slug_company("Goldman Sachs"), "goldmansachs");
        assert_eq!(slug_company("AT&T"), "att");
    }
}
