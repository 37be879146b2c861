use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::ports::{MailError, MailMessage, MailSender};

/// Writes outgoing mail to the log instead of delivering it. The default
/// sender for development deployments. Bodies carry live confirmation codes,
/// so they only appear at `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailSender;

#[async_trait]
impl MailSender for LogMailSender {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            "Outgoing mail"
        );
        debug!(to = %message.to, body = %message.body, "Outgoing mail body");
        Ok(())
    }
}
