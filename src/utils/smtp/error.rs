//! Maps lettre SMTP errors onto probe verdicts.

use super::result::SmtpProbeResult;
use lettre::transport::smtp::Error as SmtpError;
use once_cell::sync::Lazy;
use regex::Regex;

static REPLY_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([2-5]\d\d)\b").expect("static reply code regex"));

fn reply_code(text: &str) -> Option<u16> {
    REPLY_CODE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// A 4xx/5xx reply becomes `Rejected` with its code; anything that prevented
/// a reply (timeouts, refused connections, I/O, TLS) becomes `Unreachable`.
pub(crate) fn handle_smtp_error(error: &SmtpError, server: &str) -> SmtpProbeResult {
    let text = error.to_string();

    if error.is_timeout() {
        tracing::warn!(target: "smtp_task", "SMTP timeout talking to {}: {}", server, text);
        return SmtpProbeResult::unreachable(server, format!("Timed out: {}", text));
    }

    if error.is_permanent() || error.is_transient() {
        let code = reply_code(&text);
        if error.is_transient() {
            tracing::info!(target: "smtp_task", "Transient SMTP reply from {} (greylisting?): {}", server, text);
        } else {
            tracing::debug!(target: "smtp_task", "Permanent SMTP reply from {}: {}", server, text);
        }
        return SmtpProbeResult::rejected(server, code, text);
    }

    let lower = text.to_lowercase();
    if lower.contains("connection refused") || lower.contains("network is unreachable") {
        tracing::warn!(target: "smtp_task",
            "Could not reach {}: {}. Outbound SMTP may be blocked on this network.", server, text);
    } else {
        tracing::debug!(target: "smtp_task", "SMTP client error with {}: {}", server, text);
    }
    SmtpProbeResult::unreachable(server, text)
}
