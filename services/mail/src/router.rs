use axum::{Router, routing::post};
use tower_http::trace::TraceLayer;

use postbox_core::health::health_routes;
use postbox_core::middleware::{cors_layer, request_id_layer};

use crate::domain::ports::MailSender;
use crate::handlers::email::{confirm_email, send_email};
use crate::state::AppState;

pub fn build_router<M>(state: AppState<M>) -> Router
where
    M: MailSender + Clone + 'static,
{
    Router::new()
        // Email
        .route("/email/send", post(send_email::<M>))
        .route("/email/confirm", post(confirm_email::<M>))
        .with_state(state)
        // Health
        .merge(health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .layer(request_id_layer())
}
