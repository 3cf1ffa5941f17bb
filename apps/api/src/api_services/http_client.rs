use std::time::Duration;

use consorciatech_core::AppError;

/// Builds the one outbound HTTP client shared by every adapter.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("consorciatech-api/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build http client: {error}")))
}
