use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{info, warn};

use super::context::{normalize_path, RequestContext};
use super::response::HandlerResponse;
use super::router::RouteTable;
use crate::error::ApiError;

/// Everything the dispatcher needs per request
#[derive(Clone)]
pub struct DispatchState {
    pub routes: Arc<RouteTable>,
    pub max_body_bytes: usize,
}

/// Single entry point for every request.
///
/// Buffers the whole body, builds the request context, resolves the handler from
/// the route table, and serializes the handler's one response.
pub async fn dispatch(State(state): State<DispatchState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();

    let response = match to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => {
            let ctx = RequestContext::from_parts(&parts, &bytes);
            state.routes.resolve(&ctx.path).handle(&ctx).await
        }
        Err(e) => {
            warn!("Could not buffer request body: {}", e);
            HandlerResponse::from(ApiError::payload_too_large(format!(
                "Request body exceeds {} bytes",
                state.max_body_bytes
            )))
        }
    };

    let method = parts.method.as_str().to_lowercase();
    let path = normalize_path(parts.uri.path());
    let status = response.status_code();

    if status.is_success() || status.is_redirection() {
        info!(method = %method, path = %path, status = status.as_u16(), "request handled");
    } else {
        warn!(method = %method, path = %path, status = status.as_u16(), "request failed");
    }

    response.into_response()
}
