use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};

use crate::domain::ports::MailSender;
use crate::error::MailServiceError;
use crate::state::AppState;
use crate::usecase::confirm_email::{ConfirmEmailInput, ConfirmEmailUseCase};
use crate::usecase::send_email::{SendEmailInput, SendEmailUseCase};

/// Header carrying the address being confirmed.
pub const X_USER_EMAIL: &str = "x-user-email";

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_code: Option<String>,
}

// ── POST /email/send ─────────────────────────────────────────────────────────

// Fields and the body itself are optional so anything missing maps to
// MISSING_FIELD instead of an extractor rejection.
#[derive(Deserialize, Default)]
pub struct SendEmailRequest {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
}

pub async fn send_email<M>(
    State(state): State<AppState<M>>,
    req: Option<Json<SendEmailRequest>>,
) -> Result<(StatusCode, Json<MessageResponse>), MailServiceError>
where
    M: MailSender + Clone + 'static,
{
    let req = req.map(|Json(req)| req).unwrap_or_default();
    let usecase = SendEmailUseCase {
        mailer: state.mailer(),
        registry: state.registry(),
    };
    let output = usecase
        .execute(SendEmailInput {
            to: req.to,
            subject: req.subject,
            body: req.body,
        })
        .await?;
    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: "email sent",
            confirmation_code: output.confirmation_code,
        }),
    ))
}

// ── POST /email/confirm ──────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct ConfirmEmailRequest {
    pub code: Option<String>,
}

pub async fn confirm_email<M>(
    State(state): State<AppState<M>>,
    headers: HeaderMap,
    req: Option<Json<ConfirmEmailRequest>>,
) -> Result<(StatusCode, Json<MessageResponse>), MailServiceError>
where
    M: MailSender + Clone + 'static,
{
    let req = req.map(|Json(req)| req).unwrap_or_default();
    let email = headers
        .get(X_USER_EMAIL)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let usecase = ConfirmEmailUseCase {
        registry: state.registry(),
    };
    usecase.execute(ConfirmEmailInput {
        email,
        code: req.code,
    })?;
    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: "email confirmed",
            confirmation_code: None,
        }),
    ))
}
