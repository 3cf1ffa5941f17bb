use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use consorciatech_core::AppError;
use serde::Serialize;
use tracing::{error, warn};
use ts_rs::TS;

const INTERNAL_ERROR_MESSAGE: &str = "Erro interno do servidor.";
const UNAVAILABLE_MESSAGE: &str = "Serviço externo indisponível.";

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    pub error: String,
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Upstream { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|status| status.is_client_error() || status.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            AppError::Unavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match self.0 {
            AppError::Validation(message)
            | AppError::NotFound(message)
            | AppError::Unauthorized(message)
            | AppError::Forbidden(message) => message,
            AppError::Upstream { status, message } => {
                warn!(upstream_status = status, error = %message, "upstream request failed");
                message
            }
            AppError::Unavailable(detail) => {
                warn!(error = %detail, "dependency unavailable");
                UNAVAILABLE_MESSAGE.to_owned()
            }
            AppError::Internal(detail) => {
                error!(error = %detail, "internal error");
                INTERNAL_ERROR_MESSAGE.to_owned()
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use consorciatech_core::AppError;
    use serde_json::{Value, json};

    use super::ApiError;

    async fn render(error: AppError) -> (StatusCode, Value) {
        let response = ApiError::from(error).into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        let body = serde_json::from_slice(&body).unwrap_or(Value::Null);

        (status, body)
    }

    #[tokio::test]
    async fn validation_message_is_returned_verbatim() {
        let (status, body) = render(AppError::Validation("CEP inválido.".to_owned())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "CEP inválido." }));
    }

    #[tokio::test]
    async fn upstream_status_is_relayed() {
        let (status, body) = render(AppError::Upstream {
            status: 429,
            message: "rate limited".to_owned(),
        })
        .await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], json!("rate limited"));
    }

    #[tokio::test]
    async fn non_error_upstream_status_becomes_bad_gateway() {
        let (status, _) = render(AppError::Upstream {
            status: 302,
            message: "redirect".to_owned(),
        })
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn unavailable_dependency_is_bad_gateway() {
        let (status, body) = render(AppError::Unavailable("connect refused".to_owned())).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], json!("Serviço externo indisponível."));
    }

    #[tokio::test]
    async fn internal_detail_is_not_leaked() {
        let (status, body) =
            render(AppError::Internal("failed to upsert user profile: pool closed".to_owned()))
                .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Erro interno do servidor." }));
    }
}
