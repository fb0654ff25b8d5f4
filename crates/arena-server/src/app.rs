//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;
use crate::static_files;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `request_timeout` - Time after which a request is answered with 408
pub(crate) fn create_router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    let mut router = Router::new();

    if state.tournaments.is_some() {
        router = router.route(
            "/api/tournaments",
            get(handlers::tournaments::list_tournaments),
        );
    }

    // Static mounts and SPA fallback
    router = router.merge(static_files::static_router());

    let router = security::SECURITY_HEADERS
        .into_iter()
        .fold(router, |router, (name, value)| {
            router.layer(security::header_layer(name, value))
        });

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    request_timeout,
                ))
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}
