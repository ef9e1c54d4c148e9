//! Authentication middleware
//!
//! Extracts the bearer token, resolves it through the injected auth
//! verifier, and attaches the resulting [`Identity`] as a request
//! extension. Applied to every /api route; /health stays open.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::AppState;

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let identity = state
        .auth
        .verify(token)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
