use axum::Json;
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use consorciatech_application::WhatsAppMessage;
use consorciatech_core::AppError;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;
use tracing::warn;

use crate::dto::{
    ConversionEventRequest, DownloadQuery, SignUploadRequest, SignedUploadResponse,
    UpdateRulesRequest, WhatsAppNotificationRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::json_body;

const INVALID_BODY_MESSAGE: &str = "Requisição inválida.";

/// Characters left unescaped in an RFC 5987 `ext-value`.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

pub async fn postal_code_handler(
    State(state): State<AppState>,
    Path(cep): Path<String>,
) -> ApiResult<Json<Value>> {
    let address = state.integration_service.lookup_postal_code(cep.as_str()).await?;
    Ok(Json(address))
}

pub async fn validate_email_handler(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<Value>> {
    let verdict = state.integration_service.validate_email(email.as_str()).await?;
    Ok(Json(verdict))
}

/// Streams a stored file back as an attachment.
pub async fn download_handler(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> ApiResult<Response> {
    let file = state.integration_service.download(query.file.as_deref()).await?;

    let content_type = file
        .content_type
        .as_deref()
        .and_then(|value| HeaderValue::from_str(value).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&attachment_disposition(file.file_name.as_str()))
        .map_err(|error| AppError::Internal(format!("invalid download file name: {error}")))?;

    let mut response = Body::from_stream(file.body).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    if let Some(length) = file.content_length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    }

    Ok(response)
}

/// Builds `Content-Disposition`, adding `filename*` when the name is not plain ASCII.
fn attachment_disposition(file_name: &str) -> String {
    let ascii_name: String = file_name
        .chars()
        .map(|character| {
            if character.is_ascii() && !character.is_ascii_control() && character != '"' {
                character
            } else {
                '_'
            }
        })
        .collect();

    if ascii_name == file_name {
        return format!("attachment; filename=\"{ascii_name}\"");
    }

    format!(
        "attachment; filename=\"{ascii_name}\"; filename*=UTF-8''{}",
        utf8_percent_encode(file_name, ATTR_CHAR)
    )
}

pub async fn pixel_handler(
    State(state): State<AppState>,
    payload: Result<Json<ConversionEventRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let request = json_body(payload, "Evento inválido.")?;
    let response = state
        .integration_service
        .send_conversion_event(request.into())
        .await?;

    Ok(Json(response))
}

pub async fn sign_upload_handler(
    State(state): State<AppState>,
    payload: Result<Json<SignUploadRequest>, JsonRejection>,
) -> ApiResult<Json<SignedUploadResponse>> {
    let request = json_body(payload, INVALID_BODY_MESSAGE)?;
    let signed = state.integration_service.sign_upload(request.params_to_sign)?;

    Ok(Json(SignedUploadResponse::from(signed)))
}

pub async fn update_rules_handler(
    State(state): State<AppState>,
    payload: Result<Json<UpdateRulesRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let request = json_body(payload, "Regras não informadas.")?;
    state
        .integration_service
        .update_security_rules(request.rules.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Queues a WhatsApp message; delivery failures are only logged.
pub async fn whatsapp_notification_handler(
    State(state): State<AppState>,
    payload: Result<Json<WhatsAppNotificationRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let request = json_body(payload, INVALID_BODY_MESSAGE)?;
    let message = WhatsAppMessage::new(request.phone.as_str(), request.message.as_str())?;

    let integration_service = state.integration_service.clone();
    tokio::spawn(async move {
        if let Err(error) = integration_service.send_whatsapp(&message).await {
            warn!(phone = message.phone(), error = %error, "whatsapp notification failed");
        }
    });

    Ok(StatusCode::ACCEPTED)
}
