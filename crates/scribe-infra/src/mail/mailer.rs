use std::sync::Arc;

use async_trait::async_trait;

use scribe_core::ports::{MailError, Mailer};

use super::templates::MailTemplate;
use super::transport::{LogTransport, MailTransport, OutgoingMail};

/// Sender identity and link base for account mail.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub client_url: String,
    pub from: String,
}

impl MailConfig {
    pub fn from_env() -> Self {
        let root = std::env::var("ROOT_EMAIL").unwrap_or_else(|_| "admin@localhost".to_string());
        Self {
            client_url: std::env::var("CLIENT_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            from: format!("Admin {root}"),
        }
    }
}

/// Renders account mail from the built-in templates and hands it to a transport.
pub struct TemplatedMailer {
    config: MailConfig,
    transport: Arc<dyn MailTransport>,
}

impl TemplatedMailer {
    pub fn new(config: MailConfig, transport: Arc<dyn MailTransport>) -> Self {
        Self { config, transport }
    }

    /// Log transport, used when no relay is configured.
    pub fn logging(config: MailConfig) -> Self {
        Self::new(config, Arc::new(LogTransport))
    }

    async fn deliver(&self, template: MailTemplate, to: &str, token: &str) -> Result<(), MailError> {
        let url = template.link(&self.config.client_url, token);
        let mail = OutgoingMail {
            from: self.config.from.clone(),
            to: to.to_string(),
            subject: template.subject().to_string(),
            html: template.render(&url),
        };

        self.transport.send(mail).await?;
        tracing::debug!(subject = template.subject(), "account mail sent");
        Ok(())
    }
}

#[async_trait]
impl Mailer for TemplatedMailer {
    async fn confirm_email(&self, to: &str, token: &str) -> Result<(), MailError> {
        self.deliver(MailTemplate::Confirmation, to, token).await
    }

    async fn reset_password(&self, to: &str, token: &str) -> Result<(), MailError> {
        self.deliver(MailTemplate::ResetPassword, to, token).await
    }
}
