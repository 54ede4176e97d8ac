//! SMTP mailbox probing.

mod client;
mod error;
mod result;

pub use client::{test_smtp_connectivity, MailboxProbe, SmtpVerifier};
pub use result::{HostVerdict, SmtpProbeResult};

#[cfg(test)]
pub(crate) use client::mock_server;
