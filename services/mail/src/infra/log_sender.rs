use tracing::info;

use crate::domain::ports::{MailSendError, MailSender};
use crate::domain::types::OutgoingMail;

/// Development sender: records the message in the log instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct LogMailSender;

impl MailSender for LogMailSender {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailSendError> {
        info!(
            to = %mail.to,
            subject = %mail.subject,
            body_len = mail.body.len(),
            "mail transport disabled, message logged only"
        );
        Ok(())
    }
}
