use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::dto::{AccountCreatedEventRequest, UserProfileResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::json_body;

const INVALID_EVENT_MESSAGE: &str = "Evento inválido.";

/// Receives one account-created notification.
///
/// Answers `204` once the profile is stored, `400` for events that can never
/// succeed and `5xx` when the store failed and redelivery may help.
pub async fn account_created_handler(
    State(state): State<AppState>,
    payload: Result<Json<AccountCreatedEventRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let event = json_body(payload, INVALID_EVENT_MESSAGE)?;

    state
        .provisioning_service
        .handle_account_created(event.into())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn user_profile_handler(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> ApiResult<Json<UserProfileResponse>> {
    let profile = state.provisioning_service.find_profile(uid.as_str()).await?;

    Ok(Json(UserProfileResponse::from(profile)))
}
