use axum::Json;
use axum::extract::rejection::JsonRejection;
use consorciatech_core::AppError;

use crate::error::ApiResult;

pub mod events;
pub mod health;
pub mod integrations;

#[cfg(test)]
mod test_support;

/// Unwraps a JSON body, reporting any rejection through the error envelope.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>, message: &str) -> ApiResult<T> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected request body");
            Err(AppError::Validation(message.to_owned()).into())
        }
    }
}
