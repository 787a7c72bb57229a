use std::time::Duration;

use serde::Deserialize;

use postbox_core::config::Config;

use crate::domain::types::{CONFIRMATION_TTL_SECS, MAX_CONFIRMATION_TTL_SECS};
use crate::infra::gmail::{DEFAULT_API_URL, DEFAULT_TOKEN_URL, GmailCredentials, GmailEndpoints};

fn default_port() -> u16 {
    5000
}

fn default_confirmation_ttl_secs() -> u64 {
    CONFIRMATION_TTL_SECS
}

fn default_gmail_token_url() -> String {
    DEFAULT_TOKEN_URL.to_owned()
}

fn default_gmail_api_url() -> String {
    DEFAULT_API_URL.to_owned()
}

/// Values that deserialize but cannot be used.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("CONFIRMATION_TTL_SECS must be between 1 and {max}, got {value}")]
    InvalidConfirmationTtl { value: u64, max: u64 },
}

/// Mail service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct MailConfig {
    /// TCP port to listen on (default 5000). Env var: `PORT`.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Sender address placed in the `From` header. Env var: `MAIL_USER`.
    pub mail_user: String,
    /// Lifetime of a confirmation code in seconds (default 600, 1..=86400).
    #[serde(default = "default_confirmation_ttl_secs")]
    pub confirmation_ttl_secs: u64,
    pub gmail_client_id: Option<String>,
    pub gmail_client_secret: Option<String>,
    /// OAuth2 refresh token. Without it the service only logs outgoing mail.
    pub gmail_refresh_token: Option<String>,
    #[serde(default = "default_gmail_token_url")]
    pub gmail_token_url: String,
    #[serde(default = "default_gmail_api_url")]
    pub gmail_api_url: String,
}

impl Config for MailConfig {}

impl MailConfig {
    pub fn confirmation_ttl(&self) -> Result<Duration, ConfigError> {
        match self.confirmation_ttl_secs {
            value @ 1..=MAX_CONFIRMATION_TTL_SECS => Ok(Duration::from_secs(value)),
            value => Err(ConfigError::InvalidConfirmationTtl {
                value,
                max: MAX_CONFIRMATION_TTL_SECS,
            }),
        }
    }

    /// Gmail credentials when all three OAuth values are set.
    pub fn gmail_credentials(&self) -> Option<GmailCredentials> {
        Some(GmailCredentials {
            client_id: self.gmail_client_id.clone()?,
            client_secret: self.gmail_client_secret.clone()?,
            refresh_token: self.gmail_refresh_token.clone()?,
        })
    }

    pub fn gmail_endpoints(&self) -> GmailEndpoints {
        GmailEndpoints {
            token_url: self.gmail_token_url.clone(),
            api_url: self.gmail_api_url.clone(),
        }
    }
}
