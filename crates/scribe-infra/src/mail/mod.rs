//! Outbound account mail: templates, transports and the [`Mailer`] adapter.
//!
//! [`Mailer`]: scribe_core::ports::Mailer

mod mailer;
mod templates;
mod transport;

pub use mailer::{MailConfig, TemplatedMailer};
pub use templates::MailTemplate;
pub use transport::{LogTransport, MailTransport, OutgoingMail};

#[cfg(feature = "mail-relay")]
pub use transport::HttpRelayTransport;
