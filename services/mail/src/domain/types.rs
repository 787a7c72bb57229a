use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Subject that turns an outgoing message into a confirmation mail.
pub const CONFIRM_SUBJECT: &str = "Confirm";

/// Confirmation code length in characters.
pub const CONFIRMATION_CODE_LEN: usize = 6;

/// Default confirmation code time-to-live in seconds (10 minutes).
pub const CONFIRMATION_TTL_SECS: u64 = 600;

/// Upper bound for a configured confirmation code time-to-live (one day).
pub const MAX_CONFIRMATION_TTL_SECS: u64 = 86_400;

/// Alphabet for confirmation codes (upper-case base-36).
pub const CONFIRMATION_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// The single outstanding confirmation code for one email address.
#[derive(Debug, Clone)]
pub struct ConfirmationEntry {
    pub email: String,
    pub code: String,
    /// Identifies this entry instance; a replacement for the same email gets a
    /// new value, so stale cleanup tasks can tell they no longer own the slot.
    pub generation: u64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Instant,
}

impl ConfirmationEntry {
    pub fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Result of checking a submitted confirmation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Never issued, already consumed, or expired.
    NotFound,
    /// A live code exists for the email but differs from the submitted one.
    Mismatch,
    /// Codes matched; the entry has been consumed.
    Confirmed,
}

/// Plain-text message handed to a [`MailSender`](crate::domain::ports::MailSender).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Canonical registry key for an address: surrounding whitespace removed,
/// lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Canonical form of a human-entered code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
