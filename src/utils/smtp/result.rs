//! Result of probing one mailbox on one mail exchanger.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostVerdict {
    /// The server answered RCPT TO with exactly 250.
    Accepted,
    /// The server answered, but not with 250.
    Rejected,
    /// No usable answer: connect failure, timeout, protocol error.
    Unreachable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpProbeResult {
    pub host: String,
    pub verdict: HostVerdict,
    pub code: Option<u16>,
    pub message: String,
}

impl SmtpProbeResult {
    pub(crate) fn accepted(host: &str, message: impl Into<String>) -> Self {
        Self {
            host: host.to_string(),
            verdict: HostVerdict::Accepted,
            code: Some(250),
            message: message.into(),
        }
    }

    pub(crate) fn rejected(host: &str, code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            host: host.to_string(),
            verdict: HostVerdict::Rejected,
            code,
            message: message.into(),
        }
    }

    pub(crate) fn unreachable(host: &str, message: impl Into<String>) -> Self {
        Self {
            host: host.to_string(),
            verdict: HostVerdict::Unreachable,
            code: None,
            message: message.into(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.verdict == HostVerdict::Accepted
    }
}
