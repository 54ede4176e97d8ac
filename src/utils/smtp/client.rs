//! Partial SMTP dialogue used to test whether a mailbox exists.

use super::error::handle_smtp_error;
use super::result::SmtpProbeResult;
use crate::core::config::Config;
use crate::core::error::{AppError, Result};

use async_trait::async_trait;
use lettre::transport::smtp::client::SmtpConnection;
use lettre::transport::smtp::commands::{Mail, Rcpt};
use lettre::transport::smtp::extension::ClientId;
use lettre::Address;
use std::net::ToSocketAddrs;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Tests deliverability of one address against a list of mail exchangers.
///
/// Implementations never fail: any host-level problem means "try the next host".
#[async_trait]
pub trait MailboxProbe: Send + Sync {
    /// True as soon as any host accepts the recipient. Hosts are tried in order.
    async fn probe(&self, email: &str, mx_hosts: &[String]) -> bool;
}

/// Probes mailboxes with `EHLO` / `MAIL FROM` / `RCPT TO` / `QUIT`. No message is ever sent.
///
/// A single 250 is taken at face value. Catch-all domains accept every
/// recipient and greylisting servers defer legitimate ones, so a `true`
/// here means "the server did not object", not "the mailbox exists".
#[derive(Clone)]
pub struct SmtpVerifier {
    config: Arc<Config>,
}

impl SmtpVerifier {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Runs one dialogue against `host` on the configured port.
    ///
    /// lettre's connection is blocking, so the dialogue runs on the blocking
    /// pool under an overall per-host deadline. A dialogue that overruns is
    /// abandoned and its result never read.
    pub async fn probe_host(&self, email: &str, host: &str) -> SmtpProbeResult {
        let config = Arc::clone(&self.config);
        let email_owned = email.to_string();
        let host_owned = host.to_string();

        let task = tokio::task::spawn_blocking(move || {
            probe_host_blocking(&config, &email_owned, &host_owned)
        });

        match tokio::time::timeout(self.config.smtp_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => {
                tracing::error!(target: "smtp_task", "SMTP probe task for {} failed: {}", host, join_error);
                SmtpProbeResult::unreachable(host, format!("Probe task failed: {}", join_error))
            }
            Err(_) => {
                tracing::warn!(target: "smtp_task",
                    "SMTP probe of <{}> at {} exceeded {:?}", email, host, self.config.smtp_timeout);
                SmtpProbeResult::unreachable(host, "Probe deadline exceeded")
            }
        }
    }
}

#[async_trait]
impl MailboxProbe for SmtpVerifier {
    async fn probe(&self, email: &str, mx_hosts: &[String]) -> bool {
        for host in mx_hosts {
            let result = self.probe_host(email, host).await;
            tracing::debug!(target: "smtp_task",
                "<{}> at {}: {:?} {:?} {}", email, host, result.verdict, result.code, result.message);
            if result.is_accepted() {
                tracing::info!(target: "smtp_task", "<{}> accepted by {}", email, host);
                return true;
            }
        }
        false
    }
}

fn probe_host_blocking(config: &Config, email: &str, host: &str) -> SmtpProbeResult {
    let sender = match Address::from_str(&config.smtp_sender_email) {
        Ok(addr) => addr,
        Err(e) => {
            return SmtpProbeResult::unreachable(host, format!("Invalid sender address: {}", e))
        }
    };
    let recipient = match Address::from_str(email) {
        Ok(addr) => addr,
        Err(e) => {
            return SmtpProbeResult::rejected(host, None, format!("Invalid recipient: {}", e))
        }
    };

    let socket_addr = match (host, config.smtp_port)
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
    {
        Some(addr) => addr,
        None => {
            tracing::debug!(target: "smtp_task", "Could not resolve MX host {}", host);
            return SmtpProbeResult::unreachable(host, "Could not resolve host");
        }
    };

    let helo_name = ClientId::Domain(config.helo_domain().to_string());
    tracing::debug!(target: "smtp_task", "Connecting to {} ({}) for <{}>", host, socket_addr, email);

    let mut smtp_conn = match SmtpConnection::connect(
        socket_addr,
        Some(config.smtp_timeout),
        &helo_name,
        None,
        None,
    ) {
        Ok(conn) => conn,
        Err(e) => return handle_smtp_error(&e, host),
    };

    if let Err(e) = smtp_conn.command(Mail::new(Some(sender), vec![])) {
        let result = handle_smtp_error(&e, host);
        smtp_conn.quit().ok();
        return result;
    }

    let result = match smtp_conn.command(Rcpt::new(recipient, vec![])) {
        Ok(response) => {
            let code = response.code().to_string().parse::<u16>().ok();
            let message = response.message().collect::<Vec<&str>>().join(" ");
            if code == Some(250) {
                SmtpProbeResult::accepted(host, message)
            } else {
                SmtpProbeResult::rejected(host, code, message)
            }
        }
        Err(e) => handle_smtp_error(&e, host),
    };

    smtp_conn.quit().ok();
    result
}

/// Connects to a well-known mail exchanger on the configured port to check
/// whether outbound SMTP is possible from this network.
pub async fn test_smtp_connectivity(config: &Config) -> Result<()> {
    let test_server = "gmail-smtp-in.l.google.com";
    let port = config.smtp_port;
    tracing::info!("Testing outbound SMTP (port {}) connectivity to {}...", port, test_server);

    let timeout = Duration::from_secs(5);
    let helo_name = ClientId::Domain(config.helo_domain().to_string());

    let attempt = tokio::task::spawn_blocking(move || {
        let socket_addr = (test_server, port)
            .to_socket_addrs()
            .map_err(|e| AppError::Config(format!("DNS resolution failed for {}: {}", test_server, e)))?
            .next()
            .ok_or_else(|| {
                AppError::Config(format!("Could not resolve any IP address for {}", test_server))
            })?;
        let mut conn = SmtpConnection::connect(socket_addr, Some(timeout), &helo_name, None, None)?;
        conn.quit().ok();
        Ok::<(), AppError>(())
    });

    match tokio::time::timeout(timeout * 2, attempt).await {
        Ok(joined) => {
            joined??;
            tracing::info!("SMTP connectivity test successful (connected to {}).", test_server);
            Ok(())
        }
        Err(_) => Err(AppError::SmtpInconclusive(format!(
            "SMTP connection to {} timed out - port {} is likely blocked.",
            test_server, port
        ))),
    }
}


#[cfg(test)]
mod tests {
    use super::mock_server::spawn_mock_smtp;
    use super::*;
    use crate::utils::smtp::result::HostVerdict;

    fn verifier_for_port(port: u16) -> SmtpVerifier {
        SmtpVerifier::new(Arc::new(Config {
            smtp_port: port,
            smtp_timeout: Duration::from_secs(5),
            ..Config::default()
        }))
    }

    #[tokio::test]
    async fn accepted_recipient_returns_250() {
        let (port, _) = spawn_mock_smtp(&["jane.doe@example.com"]);
        let verifier = verifier_for_port(port);

        let result = verifier.probe_host("jane.doe@example.com", "127.0.0.1").await;
        assert_eq!(result.verdict, HostVerdict::Accepted);
        assert_eq!(result.code, Some(250));
    }

    #[tokio::test]
    async fn unknown_recipient_is_rejected_with_code() {
        let (port, _) = spawn_mock_smtp(&["jane.doe@example.com"]);
        let verifier = verifier_for_port(port);

        let result = verifier.probe_host("john@example.com", "127.0.0.1").await;
        assert_eq!(result.verdict, HostVerdict::Rejected);
        assert_eq!(result.code, Some(550));
    }

    #[tokio::test]
    async fn probe_short_circuits_on_first_accept() {
        let (port, log) = spawn_mock_smtp(&["jane.doe@example.com"]);
        let verifier = verifier_for_port(port);
        let hosts = vec!["127.0.0.1".to_string(), "127.0.0.1".to_string()];

        assert!(verifier.probe("jane.doe@example.com", &hosts).await);
        assert_eq!(log.lock().len(), 1);

        assert!(!verifier.probe("nobody@example.com", &hosts).await);
        assert_eq!(log.lock().len(), 3);
    }

    #[tokio::test]
    async fn closed_port_is_not_an_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let verifier = verifier_for_port(port);

        let result = verifier.probe_host("jane.doe@example.com", "127.0.0.1").await;
        assert_eq!(result.verdict, HostVerdict::Unreachable);
        assert!(!verifier.probe("jane.doe@example.com", &["127.0.0.1".to_string()]).await);
    }

    #[tokio::test]
    async fn empty_host_list_is_not_accepted() {
        let verifier = verifier_for_port(25);
        assert!(!verifier.probe("jane.doe@example.com", &[]).await);
    }
}
