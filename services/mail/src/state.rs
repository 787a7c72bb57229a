use crate::domain::ports::MailSender;
use crate::infra::registry::ConfirmationRegistry;

/// Shared application state passed to every handler via axum `State`.
///
/// Generic over the mail sender so tests can swap in a recording mock.
#[derive(Clone)]
pub struct AppState<M> {
    pub mailer: M,
    pub registry: ConfirmationRegistry,
}

impl<M> AppState<M>
where
    M: MailSender + Clone,
{
    pub fn mailer(&self) -> M {
        self.mailer.clone()
    }

    pub fn registry(&self) -> ConfirmationRegistry {
        self.registry.clone()
    }
}
