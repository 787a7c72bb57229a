use tracing::info;

use crate::domain::ports::MailSender;
use crate::domain::types::{CONFIRM_SUBJECT, OutgoingMail, normalize_email};
use crate::error::MailServiceError;
use crate::infra::registry::ConfirmationRegistry;

pub struct SendEmailInput {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug)]
pub struct SendEmailOutput {
    /// Present only for confirmation mails.
    pub confirmation_code: Option<String>,
}

pub struct SendEmailUseCase<M>
where
    M: MailSender,
{
    pub mailer: M,
    pub registry: ConfirmationRegistry,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, MailServiceError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(MailServiceError::MissingField(field))
}

impl<M> SendEmailUseCase<M>
where
    M: MailSender,
{
    pub async fn execute(&self, input: SendEmailInput) -> Result<SendEmailOutput, MailServiceError> {
        // 1. All three fields are required
        let to = normalize_email(&required(input.to, "to")?);
        let subject = required(input.subject, "subject")?;
        let body = required(input.body, "body")?;

        // 2. Confirmation mails get a fresh code appended to the body.
        // The code stays registered even if dispatch below fails; a resend
        // replaces it.
        let (body, confirmation_code) = if subject == CONFIRM_SUBJECT {
            let code = self.registry.issue(&to);
            (format!("{body} {code}"), Some(code))
        } else {
            (body, None)
        };

        // 3. Dispatch
        let mail = OutgoingMail { to, subject, body };
        self.mailer.send(&mail).await?;

        info!(
            to = %mail.to,
            confirmation = confirmation_code.is_some(),
            outstanding = self.registry.len(),
            "email sent"
        );
        Ok(SendEmailOutput { confirmation_code })
    }
}
