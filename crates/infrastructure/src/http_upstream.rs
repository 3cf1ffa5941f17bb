//! Shared response handling for outbound HTTP adapters.

use consorciatech_core::{AppError, AppResult};
use serde_json::Value;

/// Sends a request and maps transport failures to [`AppError::Unavailable`].
pub(crate) async fn send(
    request: reqwest::RequestBuilder,
    service: &str,
) -> AppResult<reqwest::Response> {
    request
        .send()
        .await
        .map_err(|error| AppError::Unavailable(format!("{service} request failed: {error}")))
}

/// Fails with [`AppError::Upstream`] unless the response status is a success.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
    service: &str,
) -> AppResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AppError::Upstream {
        status: status.as_u16(),
        message: upstream_message(service, body.as_str()),
    })
}

/// Reads a successful JSON body.
pub(crate) async fn read_json(response: reqwest::Response, service: &str) -> AppResult<Value> {
    let response = ensure_success(response, service).await?;
    response.json::<Value>().await.map_err(|error| {
        AppError::Unavailable(format!("{service} returned an unreadable body: {error}"))
    })
}

/// Picks a readable message out of an upstream error body.
fn upstream_message(service: &str, body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let message = parsed.as_ref().and_then(|value| {
        value
            .pointer("/error/message")
            .or_else(|| value.get("error"))
            .or_else(|| value.get("message"))
            .and_then(Value::as_str)
            .map(str::to_owned)
    });

    match message {
        Some(message) if !message.trim().is_empty() => message,
        _ if body.trim().is_empty() => format!("{service} request failed"),
        _ => format!("{service} request failed: {}", truncate(body.trim(), 200)),
    }
}

fn truncate(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((index, _)) => &value[..index],
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::upstream_message;

    #[test]
    fn nested_error_message_is_preferred() {
        let body = r#"{"error":{"message":"Invalid OAuth access token","code":190}}"#;
        assert_eq!(
            upstream_message("pixel", body),
            "Invalid OAuth access token"
        );
    }

    #[test]
    fn flat_error_message_is_used() {
        assert_eq!(
            upstream_message("email validation", r#"{"error":"invalid api key"}"#),
            "invalid api key"
        );
    }

    #[test]
    fn plain_text_body_is_truncated_into_the_message() {
        let body = "x".repeat(500);
        let message = upstream_message("storage", body.as_str());
        assert!(message.starts_with("storage request failed: "));
        assert!(message.len() < 260);
    }

    #[test]
    fn empty_body_falls_back_to_service_name() {
        assert_eq!(upstream_message("cep", " "), "cep request failed");
    }
}
