use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use consorciatech_application::EmailVerifier;
use consorciatech_core::{AppError, AppResult};
use consorciatech_domain::EmailAddress;

use crate::http_upstream;

/// Email deliverability check against an API-key authenticated HTTP service.
pub struct HttpEmailVerifier {
    http_client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl HttpEmailVerifier {
    /// Creates a verifier calling `{api_url}?api_key=..&email=..`.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        api_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }

    fn verify_url(&self, email: &EmailAddress) -> AppResult<Url> {
        Url::parse_with_params(
            self.api_url.as_str(),
            &[
                ("api_key", self.api_key.as_str()),
                ("email", email.as_str()),
            ],
        )
        .map_err(|error| AppError::Internal(format!("invalid email validation api url: {error}")))
    }
}

#[async_trait]
impl EmailVerifier for HttpEmailVerifier {
    async fn verify(&self, email: &EmailAddress) -> AppResult<Value> {
        let url = self.verify_url(email)?;
        let response = http_upstream::send(self.http_client.get(url), "email validation").await?;
        http_upstream::read_json(response, "email validation").await
    }
}
