use async_trait::async_trait;
use serde_json::json;

use consorciatech_application::{WhatsAppMessage, WhatsAppSender};
use consorciatech_core::AppResult;

use crate::http_upstream;

/// WhatsApp gateway client posting `{phone, message}` with a bearer token.
pub struct HttpWhatsAppSender {
    http_client: reqwest::Client,
    api_url: String,
    api_token: String,
}

impl HttpWhatsAppSender {
    /// Creates a sender for the given gateway endpoint.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        api_url: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            api_url: api_url.into(),
            api_token: api_token.into(),
        }
    }
}

#[async_trait]
impl WhatsAppSender for HttpWhatsAppSender {
    async fn send(&self, message: &WhatsAppMessage) -> AppResult<()> {
        let request = self
            .http_client
            .post(self.api_url.as_str())
            .bearer_auth(self.api_token.as_str())
            .json(&json!({
                "phone": message.phone(),
                "message": message.body(),
            }));

        let response = http_upstream::send(request, "whatsapp").await?;
        http_upstream::ensure_success(response, "whatsapp").await?;
        Ok(())
    }
}
