//! Outbound email
//!
//! One SMTP transport is built at startup and shared by every request.
//! Sends report success as a `bool`, log failures, and never retry.

pub mod templates;

use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use nawa_common::config::SmtpSettings;
use nawa_common::db::WorkshopRegistration;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

pub use templates::{render_workshop_confirmation, RenderedEmail};

/// Applied to connect, command and send phases
const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Port that speaks TLS from the first byte (everything else uses STARTTLS)
const IMPLICIT_TLS_PORT: u16 = 465;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Shared mail sender; disabled when no SMTP relay is configured
#[derive(Clone, Default)]
pub struct Mailer {
    inner: Option<Arc<SmtpMailer>>,
}

struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    /// A mailer that sends nothing
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    /// Build the transport. No connection is opened until the first send.
    pub fn from_settings(settings: Option<&SmtpSettings>) -> Result<Self, EmailError> {
        let Some(settings) = settings else {
            return Ok(Self::disabled());
        };

        let builder = if settings.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
        };
        let mut builder = builder.port(settings.port).timeout(Some(SMTP_TIMEOUT));
        if let (Some(user), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        let from: Mailbox = settings.from.parse()?;

        Ok(Self {
            inner: Some(Arc::new(SmtpMailer {
                transport: builder.build(),
                from,
            })),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }

    /// `true` when the relay accepts a connection (and login, if configured)
    pub async fn test_connection(&self) -> bool {
        let Some(mailer) = &self.inner else {
            return false;
        };
        match mailer.transport.test_connection().await {
            Ok(connected) => connected,
            Err(e) => {
                warn!("SMTP connection test failed: {}", e);
                false
            }
        }
    }

    /// Send the registration confirmation to the registrant
    pub async fn send_workshop_confirmation(&self, registration: &WorkshopRegistration) -> bool {
        let Some(mailer) = &self.inner else {
            warn!(
                "SMTP not configured, no confirmation sent for workshop registration #{}",
                registration.id
            );
            return false;
        };

        let email = render_workshop_confirmation(registration);
        match mailer.send(&registration.email, email).await {
            Ok(()) => {
                info!("Confirmation sent for workshop registration #{}", registration.id);
                true
            }
            Err(e) => {
                error!(
                    "Failed to send confirmation for workshop registration #{}: {}",
                    registration.id, e
                );
                false
            }
        }
    }
}

impl SmtpMailer {
    async fn send(&self, to: &str, email: RenderedEmail) -> Result<(), EmailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(email.subject)
            .multipart(MultiPart::alternative_plain_html(email.text, email.html))?;
        self.transport.send(message).await?;
        Ok(())
    }
}
