//! Outbound mail port.

use async_trait::async_trait;

/// Sends the templated account emails. Links embed `token`.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn confirm_email(&self, to: &str, token: &str) -> Result<(), MailError>;

    async fn reset_password(&self, to: &str, token: &str) -> Result<(), MailError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Failed to render template: {0}")]
    Template(String),

    #[error("Failed to deliver mail: {0}")]
    Delivery(String),
}
