use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use postbox_mail::domain::ports::{MailSendError, MailSender};
use postbox_mail::domain::types::OutgoingMail;
use postbox_mail::infra::registry::ConfirmationRegistry;
use postbox_mail::router::build_router;
use postbox_mail::state::AppState;

// ── MockMailSender ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub enum MockFailure {
    AuthorizationExpired,
    Transport,
}

#[derive(Clone, Default)]
pub struct MockMailSender {
    pub sent: Arc<Mutex<Vec<OutgoingMail>>>,
    pub failure: Option<MockFailure>,
}

impl MockMailSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(failure: MockFailure) -> Self {
        Self {
            sent: Arc::default(),
            failure: Some(failure),
        }
    }

    /// Returns a shared handle to the recorded messages for post-execution inspection.
    pub fn sent_handle(&self) -> Arc<Mutex<Vec<OutgoingMail>>> {
        Arc::clone(&self.sent)
    }
}

impl MailSender for MockMailSender {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailSendError> {
        match self.failure {
            Some(MockFailure::AuthorizationExpired) => Err(MailSendError::AuthorizationExpired),
            Some(MockFailure::Transport) => {
                Err(anyhow::anyhow!("connection reset by peer").into())
            }
            None => {
                self.sent.lock().unwrap().push(mail.clone());
                Ok(())
            }
        }
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub const TEST_TTL: Duration = Duration::from_secs(600);

pub fn test_registry() -> ConfirmationRegistry {
    ConfirmationRegistry::new(TEST_TTL)
}

pub fn test_app(mailer: MockMailSender, registry: ConfirmationRegistry) -> Router {
    build_router(AppState { mailer, registry })
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    user_email: Option<&str>,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::post(uri).header("content-type", "application/json");
    if let Some(email) = user_email {
        builder = builder.header("x-user-email", email);
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

/// POST with no body and no content type.
pub async fn post_empty(
    app: &Router,
    uri: &str,
    user_email: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::post(uri);
    if let Some(email) = user_email {
        builder = builder.header("x-user-email", email);
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
