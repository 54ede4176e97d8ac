//! # Recruiter Sleuth Core Library
//!
//! Finds public recruiter profiles and job postings for a company, and discovers
//! contact details (SMTP-verified email guesses, phone numbers) for a person.
//!
//! Used directly as a library, or through the `recruiter-sleuth` binary which
//! exposes every operation as a subcommand and as an HTTP API.

mod core;
pub mod search;
pub mod server;
mod utils;

pub use crate::core::cache::{CacheStats, TtlCache};
pub use crate::core::config::{Config, ConfigBuilder, ConfigFile};
pub use crate::core::error::{AppError, Result};
pub use crate::core::matcher::{
    target_companies, validate_recruiter_profile, ExperienceLevel, MatchResult, ProfileMatcher,
    SubjectProfile,
};
pub use crate::core::models::{
    Contact, ContactReport, EmailCandidate, EmailReport, MxRecordSet, PhoneReport,
    ProcessingResult, ValidatedContact, ValidationOutcome,
};
pub use crate::core::sleuth::{RecruiterSleuth, SleuthParts};
pub use crate::search::SearchOutcome;
pub use crate::utils::dns::{DnsMxResolver, MxResolver};
pub use crate::utils::domain::{CompanyDomainLookup, KnownCompanyDomains};
pub use crate::utils::fetch::{HttpPageFetcher, PageFetcher};
pub use crate::utils::phone::{extract_phone_numbers, format_phone_number, PhoneCandidate, PhoneRegion};
pub use crate::utils::smtp::{MailboxProbe, SmtpVerifier};

use crate::utils::domain::get_domain_from_url;
use crate::utils::patterns::{extract_letters_only, validate_name_format};
use crate::utils::smtp::test_smtp_connectivity;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;

/// Builds a `RecruiterSleuth` with the production DNS, SMTP, search and page-fetch clients.
pub fn initialize_sleuth(config: &Config) -> Result<RecruiterSleuth> {
    RecruiterSleuth::new(config)
}

/// Checks that outbound SMTP on the configured port reaches a well-known mail host.
pub async fn check_smtp_connectivity(config: &Config) -> Result<()> {
    test_smtp_connectivity(config).await
}

/// Validates one contact record and runs contact discovery for it.
pub async fn find_single_contact(sleuth: &RecruiterSleuth, contact: Contact) -> ProcessingResult {
    let task_id = format!(
        "Contact: {} / {}",
        contact
            .full_name
            .as_deref()
            .or(contact.last_name.as_deref())
            .unwrap_or("N/A"),
        contact
            .domain
            .as_deref()
            .or(contact.company_domain.as_deref())
            .unwrap_or("N/A")
    );
    tracing::info!(target: "find_single_contact", "[{}] Starting processing.", task_id);

    let validated = match validate_contact_input(&contact) {
        Ok(vc) => vc,
        Err(reason) => {
            tracing::warn!(target: "find_single_contact", "[{}] Skipping record. Reason: {}", task_id, reason);
            return ProcessingResult::skipped(contact, reason);
        }
    };

    let discovery = sleuth
        .find_contact(
            &validated.original_first_name,
            &validated.original_last_name,
            &validated.domain,
            validated.company.as_deref(),
        )
        .await;

    match discovery {
        Ok(report) => {
            let result = ProcessingResult::success(contact, report);
            tracing::info!(target: "find_single_contact",
                "[{}] Finished: {} email(s), {} phone number(s).",
                task_id,
                result.discovery.as_ref().map_or(0, |d| d.email.valid_emails.len()),
                result.discovery.as_ref().map_or(0, |d| d.phones.phone_numbers.len())
            );
            result
        }
        Err(e) => {
            tracing::error!(target: "find_single_contact", "[{}] Error during contact discovery: {}", task_id, e);
            ProcessingResult::error(contact, format!("Core processing error: {}", e))
        }
    }
}

/// Runs contact discovery for many records, at most `max_concurrency` at a time.
///
/// Invalid records come back as skipped results without touching the network.
/// Output order follows completion, not input.
pub async fn process_contacts(
    config: Arc<Config>,
    sleuth: Arc<RecruiterSleuth>,
    contacts: Vec<Contact>,
) -> Vec<ProcessingResult> {
    let total_records = contacts.len();
    if total_records == 0 {
        return Vec::new();
    }

    let mut tasks = FuturesUnordered::new();
    let mut results = Vec::with_capacity(total_records);

    for contact in contacts {
        if let Err(reason) = validate_contact_input(&contact) {
            results.push(ProcessingResult::skipped(contact, reason));
            continue;
        }

        while tasks.len() >= config.max_concurrency {
            match tasks.next().await {
                Some(Ok(processing_result)) => results.push(processing_result),
                Some(Err(e)) => tracing::error!("A processing task failed to join: {}", e),
                None => break,
            }
        }

        let sleuth = Arc::clone(&sleuth);
        tasks.push(tokio::spawn(async move {
            find_single_contact(&sleuth, contact).await
        }));
    }

    while let Some(join_result) = tasks.next().await {
        match join_result {
            Ok(processing_result) => results.push(processing_result),
            Err(e) => tracing::error!("A processing task failed to join during final drain: {}", e),
        }
    }

    results
}

/// Fills in first/last from `full_name` when needed and reduces the domain input.
///
/// A single-word full name is used as both first and last name.
pub fn validate_contact_input(record: &Contact) -> std::result::Result<ValidatedContact, String> {
    let mut first_name = record.first_name.as_deref().unwrap_or("").trim().to_string();
    let mut last_name = record.last_name.as_deref().unwrap_or("").trim().to_string();
    let full_name = record.full_name.as_deref().unwrap_or("").trim();
    let domain_input = record
        .domain
        .as_deref()
        .or(record.company_domain.as_deref())
        .unwrap_or("")
        .trim();

    if first_name.is_empty() || last_name.is_empty() {
        let name_parts: Vec<&str> = full_name.split_whitespace().collect();
        match name_parts.as_slice() {
            [] => {}
            [only] => {
                if first_name.is_empty() {
                    first_name = only.to_string();
                }
                if last_name.is_empty() {
                    last_name = only.to_string();
                }
            }
            [first, .., last] => {
                if first_name.is_empty() {
                    first_name = first.to_string();
                }
                if last_name.is_empty() {
                    last_name = last.to_string();
                }
            }
        }
    }

    let mut missing_parts = Vec::new();
    if first_name.is_empty() {
        missing_parts.push("first name");
    }
    if last_name.is_empty() {
        missing_parts.push("last name");
    }
    if domain_input.is_empty() {
        missing_parts.push("domain");
    }
    if !missing_parts.is_empty() {
        return Err(format!("Missing {}", missing_parts.join(", ")));
    }

    if !validate_name_format(&first_name) || !validate_name_format(&last_name) {
        return Err(format!(
            "Invalid characters in name '{} {}'",
            first_name, last_name
        ));
    }

    let domain = get_domain_from_url(domain_input)
        .map_err(|e| format!("Cannot extract domain from '{}': {}", domain_input, e))?;

    Ok(ValidatedContact {
        first_name: extract_letters_only(&first_name),
        last_name: extract_letters_only(&last_name),
        original_first_name: first_name,
        original_last_name: last_name,
        domain,
        company: record
            .company
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(first: Option<&str>, last: Option<&str>, full: Option<&str>, domain: Option<&str>) -> Contact {
        Contact {
            first_name: first.map(str::to_string),
            last_name: last.map(str::to_string),
            full_name: full.map(str::to_string),
            domain: domain.map(str::to_string),
            ..Contact::default()
        }
    }

    #[test]
    fn full_name_fills_missing_parts() {
        let validated =
            validate_contact_input(&contact(None, None, Some("Mary Ann O'Neil"), Some("https://www.acme.com/about")))
                .unwrap();
        assert_eq!(validated.original_first_name, "Mary");
        assert_eq!(validated.original_last_name, "O'Neil");
        assert_eq!(validated.last_name, "oneil");
        assert_eq!(validated.domain, "acme.com");
    }

    #[test]
    fn single_word_name_is_used_twice() {
        let validated = validate_contact_input(&contact(None, None, Some("Cher"), Some("acme.com"))).unwrap();
        assert_eq!(validated.first_name, "cher");
        assert_eq!(validated.last_name, "cher");
    }

    #[test]
    fn reports_every_missing_part() {
        let reason = validate_contact_input(&contact(None, None, None, None)).unwrap_err();
        assert_eq!(reason, "Missing first name, last name, domain");
    }

    #[test]
    fn company_website_stands_in_for_domain() {
        let record = Contact {
            company_domain: Some("http://globex.io".into()),
            company: Some("  Globex ".into()),
            ..contact(Some("Hank"), Some("Scorpio"), None, None)
        };
        let validated = validate_contact_input(&record).unwrap();
        assert_eq!(validated.domain, "globex.io");
        assert_eq!(validated.company.as_deref(), Some("Globex"));
    }

    #[test]
    fn rejects_bad_names_and_domains() {
        assert!(validate_contact_input(&contact(Some("J4ne"), Some("Doe"), None, Some("acme.com")))
            .unwrap_err()
            .starts_with("Invalid characters"));
        assert!(validate_contact_input(&contact(Some("Jane"), Some("Doe"), None, Some("localhost")))
            .unwrap_err()
            .starts_with("Cannot extract domain"));
    }

    #[tokio::test]
    async fn invalid_records_are_skipped_without_network() {
        let config = Arc::new(Config::default());
        let sleuth = Arc::new(initialize_sleuth(&config).unwrap());
        let results = process_contacts(
            Arc::clone(&config),
            sleuth,
            vec![
                contact(None, None, None, Some("acme.com")),
                contact(Some("Jane"), None, None, None),
            ],
        )
        .await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.skipped));
        assert!(results.iter().all(|r| r.discovery.is_none()));
    }
}
