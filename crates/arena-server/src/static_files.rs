//! Static file serving.
//!
//! Resolves every request that no API route claimed against the mount
//! table, then falls back to the entry-point document for client-side
//! routing.

use std::sync::Arc;

use arena_assets::ResolveError;
use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};

use crate::error::ServerError;
use crate::state::AppState;

/// Content type of the entry-point document.
const ENTRY_POINT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Create router for static file serving with SPA fallback.
pub(crate) fn static_router() -> Router<Arc<AppState>> {
    Router::new().fallback(serve_asset)
}

/// Serve a static asset or fall back to the entry point for SPA routing.
async fn serve_asset(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
) -> Result<Response, ServerError> {
    if method != Method::GET && method != Method::HEAD {
        return Err(ServerError::MethodNotAllowed(method));
    }

    let path = uri.path();
    let (content, content_type) = match state.mounts.resolve(path).await {
        Ok(Some(asset)) => (asset.content.into_owned(), asset.content_type),
        Ok(None) => {
            // SPA fallback: any unmatched path gets the entry point
            let index = tokio::fs::read(&state.entry_point).await?;
            (index, ENTRY_POINT_CONTENT_TYPE)
        }
        Err(ResolveError::Malformed(reason)) => {
            tracing::debug!(path, reason = %reason, "Rejected malformed path");
            return Err(ServerError::MalformedPath(path.to_owned()));
        }
        Err(ResolveError::Io(e)) => return Err(ServerError::Io(e)),
    };

    let length = HeaderValue::from(content.len());
    let body = if method == Method::HEAD {
        Body::empty()
    } else {
        Body::from(content)
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (header::CONTENT_LENGTH, length),
        ],
        body,
    )
        .into_response())
}
