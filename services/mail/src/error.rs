use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::domain::ports::MailSendError;
use crate::infra::registry::RegistryError;

/// Mail service error variants.
#[derive(Debug, thiserror::Error)]
pub enum MailServiceError {
    #[error("missing {0}")]
    MissingField(&'static str),
    #[error("confirmation code not found or expired")]
    ConfirmationCodeNotFound,
    #[error("invalid confirmation code")]
    ConfirmationCodeMismatch,
    #[error("mail provider authorization expired, reauthorization required")]
    ReauthorizationRequired,
    #[error("failed to send email")]
    DeliveryFailed(#[source] anyhow::Error),
}

impl MailServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::ConfirmationCodeNotFound => "CONFIRMATION_CODE_NOT_FOUND",
            Self::ConfirmationCodeMismatch => "CONFIRMATION_CODE_MISMATCH",
            Self::ReauthorizationRequired => "REAUTHORIZATION_REQUIRED",
            Self::DeliveryFailed(_) => "DELIVERY_FAILED",
        }
    }
}

impl From<RegistryError> for MailServiceError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::MissingField(field) => Self::MissingField(field),
        }
    }
}

impl From<MailSendError> for MailServiceError {
    fn from(err: MailSendError) -> Self {
        match err {
            MailSendError::AuthorizationExpired => Self::ReauthorizationRequired,
            MailSendError::Transport(e) => Self::DeliveryFailed(e),
        }
    }
}

impl IntoResponse for MailServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingField(_)
            | Self::ConfirmationCodeNotFound
            | Self::ConfirmationCodeMismatch => StatusCode::BAD_REQUEST,
            Self::ReauthorizationRequired => StatusCode::UNAUTHORIZED,
            Self::DeliveryFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // 4xx are expected client errors and TraceLayer already records them.
        // 5xx keep their cause in the log only; the body stays generic.
        match &self {
            Self::DeliveryFailed(e) => {
                tracing::error!(error = %e, kind = self.kind(), "request failed");
            }
            Self::ReauthorizationRequired => {
                tracing::warn!(kind = self.kind(), "mail provider needs reauthorization");
            }
            _ => {}
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if matches!(self, Self::ReauthorizationRequired) {
            body["need_reauthorization"] = serde_json::Value::Bool(true);
        }
        (status, axum::Json(body)).into_response()
    }
}
