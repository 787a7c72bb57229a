use tracing::info;

use postbox_core::config::Config;
use postbox_core::tracing::init_tracing;

use postbox_mail::config::MailConfig;
use postbox_mail::infra::gmail::{DEFAULT_HTTP_TIMEOUT, GmailMailSender};
use postbox_mail::infra::log_sender::LogMailSender;
use postbox_mail::infra::mailer::Mailer;
use postbox_mail::infra::registry::ConfirmationRegistry;
use postbox_mail::router::build_router;
use postbox_mail::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing("info,tower_http=info");

    dotenvy::dotenv().ok();
    let config = MailConfig::from_env().expect("failed to load config from environment");
    let ttl = config.confirmation_ttl().expect("invalid confirmation TTL");

    let mailer = match config.gmail_credentials() {
        Some(credentials) => Mailer::Gmail(GmailMailSender::new(
            GmailMailSender::http_client(DEFAULT_HTTP_TIMEOUT)
                .expect("failed to build HTTP client"),
            config.mail_user.clone(),
            credentials,
            config.gmail_endpoints(),
        )),
        None => Mailer::Log(LogMailSender),
    };
    info!(transport = mailer.transport_name(), "mail transport selected");

    let registry = ConfirmationRegistry::new(ttl);
    info!(ttl_secs = registry.ttl().as_secs(), "confirmation registry ready");

    let state = AppState { mailer, registry };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("mail service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
