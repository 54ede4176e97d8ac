//! Data carried between the contact-discovery stages and returned to callers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// A contact record as supplied by callers (CLI batch files, HTTP bodies).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Contact {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub domain: Option<String>,
    pub company_domain: Option<String>,
    pub company: Option<String>,
    #[serde(flatten)]
    pub other_fields: HashMap<String, Value>,
}

/// A contact that passed input validation.
///
/// `first_name` / `last_name` are reduced to lower-case letters; the
/// `original_*` fields keep the caller's spelling for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedContact {
    pub first_name: String,
    pub last_name: String,
    pub original_first_name: String,
    pub original_last_name: String,
    pub domain: String,
    pub company: Option<String>,
}

/// One generated email address guess.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EmailCandidate {
    pub local_part: String,
    pub domain: String,
}

impl EmailCandidate {
    pub fn address(&self) -> String {
        format!("{}@{}", self.local_part, self.domain)
    }
}

impl fmt::Display for EmailCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local_part, self.domain)
    }
}

/// Mail exchangers for a domain in preference order. Empty means resolution failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MxRecordSet {
    pub domain: String,
    pub hosts: Vec<String>,
}

impl MxRecordSet {
    pub fn empty(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            hosts: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub email: String,
    pub accepted: bool,
}

/// Result of guessing and probing addresses for one person.
#[derive(Debug, Clone, Serialize, Default)]
pub struct EmailReport {
    pub first_name: String,
    pub last_name: String,
    pub original_first_name: String,
    pub original_last_name: String,
    /// The domain that was actually probed. Differs from `original_domain`
    /// when an alternate domain had mail exchangers.
    pub domain: String,
    pub original_domain: String,
    pub valid_emails: Vec<String>,
    pub total_patterns_tested: usize,
    pub mx_hosts_found: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternatives_tried: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct PhoneReport {
    pub phone_numbers: Vec<String>,
    pub indian_phone_numbers: Vec<String>,
    pub global_phone_numbers: Vec<String>,
    pub search_queries_used: usize,
}

/// Combined email and phone discovery for one person.
#[derive(Debug, Clone, Serialize, Default)]
pub struct ContactReport {
    #[serde(flatten)]
    pub email: EmailReport,
    pub company: Option<String>,
    #[serde(flatten)]
    pub phones: PhoneReport,
}

/// Outcome of one record in batch processing.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingResult {
    #[serde(flatten)]
    pub contact_input: Contact,
    pub discovery: Option<ContactReport>,
    pub skipped: bool,
    pub skip_reason: Option<String>,
    pub error: Option<String>,
}

impl ProcessingResult {
    pub(crate) fn skipped(contact: Contact, reason: String) -> Self {
        Self {
            contact_input: contact,
            discovery: None,
            skipped: true,
            skip_reason: Some(reason),
            error: None,
        }
    }

    pub(crate) fn error(contact: Contact, error_msg: String) -> Self {
        Self {
            contact_input: contact,
            discovery: None,
            skipped: false,
            skip_reason: None,
            error: Some(error_msg),
        }
    }

    pub(crate) fn success(contact: Contact, report: ContactReport) -> Self {
        Self {
            contact_input: contact,
            discovery: Some(report),
            skipped: false,
            skip_reason: None,
            error: None,
        }
    }

    pub fn found_email(&self) -> bool {
        self.discovery
            .as_ref()
            .is_some_and(|d| !d.email.valid_emails.is_empty())
    }

    pub fn found_phone(&self) -> bool {
        self.discovery
            .as_ref()
            .is_some_and(|d| !d.phones.phone_numbers.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_report_flattens_both_halves() {
        let report = ContactReport {
            email: EmailReport {
                domain: "acme.com".into(),
                valid_emails: vec!["jane@acme.com".into()],
                ..Default::default()
            },
            company: Some("Acme".into()),
            phones: PhoneReport {
                phone_numbers: vec!["+91 98765 43210".into()],
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["domain"], "acme.com");
        assert_eq!(json["valid_emails"][0], "jane@acme.com");
        assert_eq!(json["phone_numbers"][0], "+91 98765 43210");
        assert!(json.get("message").is_none());
    }

    #[test]
    fn contact_keeps_unknown_fields() {
        let contact: Contact = serde_json::from_str(
            r#"{"first_name":"Jane","last_name":"Doe","domain":"example.com","crm_id":42}"#,
        )
        .unwrap();
        assert_eq!(contact.other_fields.get("crm_id"), Some(&Value::from(42)));
    }
}
