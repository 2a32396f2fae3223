//! Outbound email.
//!
//! Messages are rendered here and handed to a [`Mailer`]. The shipped
//! transport logs messages instead of sending them; SMTP delivery can be
//! plugged in behind the same trait.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info};

use common::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// A rendered email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Recipient email address
    pub to: String,
    /// Email subject line
    pub subject: String,
    /// Plain text body
    pub body: String,
    /// Link the recipient is expected to follow, if any
    pub action_url: Option<String>,
}

impl EmailMessage {
    /// Verification message carrying a link with the one-time token.
    pub fn verification(to: &str, base_url: &str, token: &str) -> Self {
        let link = format!("{}/verify-email?token={}", base_url, token);
        Self {
            to: to.to_string(),
            subject: "Verify your email address".to_string(),
            body: format!(
                "Welcome!\n\nPlease confirm your email address by opening the link below:\n\n{}\n",
                link
            ),
            action_url: Some(link),
        }
    }

    /// Password reset message carrying a link with the one-time token.
    pub fn password_reset(to: &str, base_url: &str, token: &str) -> Self {
        let link = format!("{}/reset-password?token={}", base_url, token);
        Self {
            to: to.to_string(),
            subject: "Reset your password".to_string(),
            body: format!(
                "A password reset was requested for your account.\n\n\
                 Open the link below to choose a new password:\n\n{}\n\n\
                 If you did not request this, you can ignore this email.\n",
                link
            ),
            action_url: Some(link),
        }
    }
}

/// Mail transport abstraction.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> AppResult<()>;
}

/// Development transport: writes every message to the log.
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> AppResult<()> {
        info!(
            "=== EMAIL (not sent) ===\n\
             From: {}\n\
             To: {}\n\
             Subject: {}\n\
             Body:\n{}\n\
             ========================",
            self.from,
            message.to,
            message.subject,
            message.body
        );
        Ok(())
    }
}

/// Fire-and-forget wrapper: `send` only enqueues, a worker task delivers.
///
/// Delivery failures are logged by the worker and never reach the caller.
pub struct BackgroundMailer {
    queue: mpsc::UnboundedSender<EmailMessage>,
}

impl BackgroundMailer {
    /// Spawn the delivery worker on the current tokio runtime.
    pub fn spawn(transport: Arc<dyn Mailer>) -> Self {
        let (queue, mut pending) = mpsc::unbounded_channel::<EmailMessage>();

        tokio::spawn(async move {
            while let Some(message) = pending.recv().await {
                let to = message.to.clone();
                if let Err(e) = transport.send(message).await {
                    error!(to = %to, error = %e, "Email delivery failed");
                }
            }
            info!("Email worker stopped");
        });

        Self { queue }
    }
}

#[async_trait]
impl Mailer for BackgroundMailer {
    async fn send(&self, message: EmailMessage) -> AppResult<()> {
        self.queue
            .send(message)
            .map_err(|_| AppError::internal("Email worker is not running"))
    }
}
