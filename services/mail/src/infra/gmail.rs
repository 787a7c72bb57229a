//! Gmail API sender authenticated with an OAuth2 refresh token.
//!
//! The access token is fetched lazily on first send and cached until shortly
//! before it expires. A refresh rejected with `invalid_grant` surfaces as
//! [`MailSendError::AuthorizationExpired`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::domain::ports::{MailSendError, MailSender};
use crate::domain::types::OutgoingMail;

pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_API_URL: &str = "https://gmail.googleapis.com";

/// Per-request timeout for token refreshes and sends. The token lock is held
/// across a refresh, so this also bounds how long other sends can wait.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Refresh this long before the provider-reported expiry.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct GmailCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone)]
pub struct GmailEndpoints {
    pub token_url: String,
    pub api_url: String,
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

struct GmailInner {
    http: Client,
    from: String,
    credentials: GmailCredentials,
    endpoints: GmailEndpoints,
    token: Mutex<Option<AccessToken>>,
}

#[derive(Clone)]
pub struct GmailMailSender {
    inner: Arc<GmailInner>,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Deserialize)]
struct OAuthErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Serialize)]
struct SendRequest {
    raw: String,
}

impl GmailMailSender {
    /// HTTP client with connect and request timeouts for the Gmail endpoints.
    pub fn http_client(timeout: Duration) -> reqwest::Result<Client> {
        Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .build()
    }

    pub fn new(
        http: Client,
        from: String,
        credentials: GmailCredentials,
        endpoints: GmailEndpoints,
    ) -> Self {
        Self {
            inner: Arc::new(GmailInner {
                http,
                from,
                credentials,
                endpoints,
                token: Mutex::new(None),
            }),
        }
    }

    async fn access_token(&self) -> Result<String, MailSendError> {
        let mut cached = self.inner.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| Instant::now() < t.expires_at) {
            return Ok(token.value.clone());
        }
        let token = self.refresh().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn invalidate_token(&self) {
        *self.inner.token.lock().await = None;
    }

    async fn refresh(&self) -> Result<AccessToken, MailSendError> {
        let creds = &self.inner.credentials;
        let resp = self
            .inner
            .http
            .post(&self.inner.endpoints.token_url)
            .form(&RefreshRequest {
                grant_type: "refresh_token",
                client_id: &creds.client_id,
                client_secret: &creds.client_secret,
                refresh_token: &creds.refresh_token,
            })
            .send()
            .await
            .context("token endpoint unreachable")?;

        let status = resp.status();
        if !status.is_success() {
            let err: Option<OAuthErrorResponse> = resp.json().await.ok();
            return match err {
                Some(e) if e.error == "invalid_grant" => {
                    warn!(
                        description = e.error_description.as_deref().unwrap_or(""),
                        "gmail refresh token rejected"
                    );
                    Err(MailSendError::AuthorizationExpired)
                }
                Some(e) => Err(anyhow!("token refresh failed ({status}): {}", e.error).into()),
                None => Err(anyhow!("token refresh failed ({status})").into()),
            };
        }

        let body: RefreshResponse = resp
            .json()
            .await
            .context("malformed token endpoint response")?;
        debug!(expires_in = body.expires_in, "gmail access token refreshed");
        let lifetime = Duration::from_secs(body.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        Ok(AccessToken {
            value: body.access_token,
            expires_at: Instant::now() + lifetime,
        })
    }

    async fn post_message(&self, token: &str, raw: &str) -> Result<StatusCode, MailSendError> {
        let url = format!(
            "{}/gmail/v1/users/me/messages/send",
            self.inner.endpoints.api_url.trim_end_matches('/')
        );
        let resp = self
            .inner
            .http
            .post(url)
            .bearer_auth(token)
            .json(&SendRequest {
                raw: raw.to_owned(),
            })
            .send()
            .await
            .context("gmail api unreachable")?;
        Ok(resp.status())
    }
}

impl MailSender for GmailMailSender {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailSendError> {
        let raw = URL_SAFE_NO_PAD.encode(render_message(&self.inner.from, mail));

        let token = self.access_token().await?;
        let mut status = self.post_message(&token, &raw).await?;
        if status == StatusCode::UNAUTHORIZED {
            // Access token revoked before its advertised expiry; retry once.
            self.invalidate_token().await;
            let token = self.access_token().await?;
            status = self.post_message(&token, &raw).await?;
        }
        if !status.is_success() {
            return Err(anyhow!("gmail api rejected message ({status})").into());
        }
        Ok(())
    }
}

/// Strip CR/LF so values cannot inject extra headers.
fn header_value(value: &str) -> String {
    value.chars().filter(|c| *c != '\r' && *c != '\n').collect()
}

/// RFC 2047 encoded-word for non-ASCII header text.
fn encode_header_text(value: &str) -> String {
    let value = header_value(value);
    if value.is_ascii() {
        value
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(value))
    }
}

/// Render a plain-text RFC 5322 message.
pub fn render_message(from: &str, mail: &OutgoingMail) -> String {
    format!(
        "From: {}\r\nTo: {}\r\nSubject: {}\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{}",
        header_value(from),
        header_value(&mail.to),
        encode_header_text(&mail.subject),
        mail.body
    )
}
