use crate::domain::ports::{MailSendError, MailSender};
use crate::domain::types::OutgoingMail;
use crate::infra::gmail::GmailMailSender;
use crate::infra::log_sender::LogMailSender;

/// Sender chosen at startup from configuration.
#[derive(Clone)]
pub enum Mailer {
    Gmail(GmailMailSender),
    Log(LogMailSender),
}

impl Mailer {
    pub fn transport_name(&self) -> &'static str {
        match self {
            Self::Gmail(_) => "gmail",
            Self::Log(_) => "log",
        }
    }
}

impl MailSender for Mailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailSendError> {
        match self {
            Self::Gmail(sender) => sender.send(mail).await,
            Self::Log(sender) => sender.send(mail).await,
        }
    }
}
