use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::error::ApiError;
use crate::state::SharedState;

/// Pulls the admin key out of `X-Api-Key` or an `Authorization: Bearer`
/// header.
fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        return Some(value.to_string());
    }

    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Guards the `/api/admin` subtree. Every admin route sits behind this
/// layer; the public reserve and raffle routes do not.
pub async fn admin_auth(
    State(state): State<Arc<SharedState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = extract_api_key(&headers)
        .ok_or_else(|| ApiError::Unauthorized("missing API key".to_string()))?;

    if provided != state.config.server.admin_api_key {
        return Err(ApiError::Unauthorized("invalid API key".to_string()));
    }

    Ok(next.run(request).await)
}
