use std::future::Future;

use crate::domain::types::OutgoingMail;

/// Failure reported by a mail sender.
#[derive(Debug, thiserror::Error)]
pub enum MailSendError {
    /// Provider credentials can no longer be refreshed; an operator has to
    /// re-run the out-of-band authorization step.
    #[error("mail provider authorization expired")]
    AuthorizationExpired,
    #[error("mail transport failed: {0}")]
    Transport(#[from] anyhow::Error),
}

/// Port for dispatching plain-text email.
///
/// Declared with an explicit `Send` future so handlers stay generic over the
/// sender; implementors can still write `async fn send`.
pub trait MailSender: Send + Sync {
    fn send(
        &self,
        mail: &OutgoingMail,
    ) -> impl Future<Output = Result<(), MailSendError>> + Send;
}
