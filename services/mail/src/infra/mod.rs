pub mod gmail;
pub mod log_sender;
pub mod mailer;
pub mod registry;
