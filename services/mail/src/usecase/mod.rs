pub mod confirm_email;
pub mod send_email;
