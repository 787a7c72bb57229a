use tracing::info;

use crate::domain::types::{ConfirmOutcome, normalize_email};
use crate::error::MailServiceError;
use crate::infra::registry::ConfirmationRegistry;

pub struct ConfirmEmailInput {
    pub email: Option<String>,
    pub code: Option<String>,
}

pub struct ConfirmEmailUseCase {
    pub registry: ConfirmationRegistry,
}

impl ConfirmEmailUseCase {
    pub fn execute(&self, input: ConfirmEmailInput) -> Result<(), MailServiceError> {
        let email = normalize_email(input.email.as_deref().unwrap_or_default());
        let code = input.code.unwrap_or_default();

        match self.registry.validate(&email, &code)? {
            ConfirmOutcome::NotFound => Err(MailServiceError::ConfirmationCodeNotFound),
            ConfirmOutcome::Mismatch => Err(MailServiceError::ConfirmationCodeMismatch),
            ConfirmOutcome::Confirmed => {
                info!(email = %email, outstanding = self.registry.len(), "email confirmed");
                Ok(())
            }
        }
    }
}
