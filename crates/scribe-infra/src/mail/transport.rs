//! Mail transports.

use async_trait::async_trait;
use serde::Serialize;

use scribe_core::ports::MailError;

/// A rendered message ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Delivers rendered mail.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

/// Logs mail instead of delivering it (development default).
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        tracing::info!(
            from = %mail.from,
            subject = %mail.subject,
            body_len = mail.html.len(),
            "mail not delivered (log transport)"
        );
        tracing::debug!(html = %mail.html, "mail body");
        Ok(())
    }
}

/// Posts mail as JSON to an HTTP relay.
#[cfg(feature = "mail-relay")]
pub struct HttpRelayTransport {
    url: String,
    client: reqwest::Client,
}

#[cfg(feature = "mail-relay")]
impl HttpRelayTransport {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[cfg(feature = "mail-relay")]
#[async_trait]
impl MailTransport for HttpRelayTransport {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        self.client
            .post(&self.url)
            .json(&mail)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| MailError::Delivery(e.to_string()))?;

        Ok(())
    }
}
