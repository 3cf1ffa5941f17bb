use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use consorciatech_core::AppError;

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn require_internal_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    authorize_bearer(request.headers(), state.internal_events_token.as_str())?;
    Ok(next.run(request).await)
}

pub async fn require_operator_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    authorize_bearer(request.headers(), state.operator_token.as_str())?;
    Ok(next.run(request).await)
}

fn authorize_bearer(headers: &HeaderMap, expected: &str) -> Result<(), AppError> {
    let presented = bearer_token(headers)
        .ok_or_else(|| AppError::Unauthorized("Token de acesso ausente.".to_owned()))?;

    if expected.is_empty() || !constant_time_eq(presented.as_bytes(), expected.as_bytes()) {
        return Err(AppError::Unauthorized("Token de acesso inválido.".to_owned()));
    }

    Ok(())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Compares two secrets without short-circuiting on the first differing byte.
fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }

    left.iter()
        .zip(right)
        .fold(0_u8, |difference, (left, right)| difference | (left ^ right))
        == 0
}
