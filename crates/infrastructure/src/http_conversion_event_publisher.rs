use async_trait::async_trait;
use serde_json::{Value, json};
use url::Url;

use consorciatech_application::{ConversionEvent, ConversionEventPublisher};
use consorciatech_core::{AppError, AppResult};

use crate::http_upstream;

/// Connection settings for the ads-conversion (pixel) API.
#[derive(Debug, Clone)]
pub struct ConversionApiSettings {
    /// API origin, e.g. `https://graph.facebook.com`.
    pub base_url: String,
    /// API version path segment, e.g. `v19.0`.
    pub api_version: String,
    /// Pixel identifier.
    pub pixel_id: String,
    /// Server-side access token.
    pub access_token: String,
    /// Routes events to the test console when set.
    pub test_event_code: Option<String>,
}

/// Publishes conversion events to the pixel events endpoint.
pub struct HttpConversionEventPublisher {
    http_client: reqwest::Client,
    settings: ConversionApiSettings,
}

impl HttpConversionEventPublisher {
    /// Creates a publisher with the given API settings.
    #[must_use]
    pub fn new(http_client: reqwest::Client, settings: ConversionApiSettings) -> Self {
        Self {
            http_client,
            settings,
        }
    }

    fn events_url(&self) -> AppResult<Url> {
        let url = format!(
            "{}/{}/{}/events",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.api_version.trim_matches('/'),
            self.settings.pixel_id
        );

        Url::parse_with_params(
            url.as_str(),
            &[("access_token", self.settings.access_token.as_str())],
        )
        .map_err(|error| AppError::Internal(format!("invalid pixel api url: {error}")))
    }

    fn payload(&self, event: ConversionEvent) -> Value {
        let mut payload = json!({ "data": [event] });
        if let (Some(code), Some(object)) = (
            self.settings.test_event_code.as_deref(),
            payload.as_object_mut(),
        ) {
            object.insert("test_event_code".to_owned(), Value::String(code.to_owned()));
        }

        payload
    }
}

#[async_trait]
impl ConversionEventPublisher for HttpConversionEventPublisher {
    async fn publish(&self, event: ConversionEvent) -> AppResult<Value> {
        let url = self.events_url()?;
        let request = self.http_client.post(url).json(&self.payload(event));
        let response = http_upstream::send(request, "pixel").await?;
        http_upstream::read_json(response, "pixel").await
    }
}

#[cfg(test)]
mod tests {
    use consorciatech_application::ConversionEvent;
    use serde_json::{Map, json};

    use super::{ConversionApiSettings, HttpConversionEventPublisher};

    fn publisher(test_event_code: Option<&str>) -> HttpConversionEventPublisher {
        HttpConversionEventPublisher::new(
            reqwest::Client::new(),
            ConversionApiSettings {
                base_url: "https://graph.facebook.com/".to_owned(),
                api_version: "v19.0".to_owned(),
                pixel_id: "123456".to_owned(),
                access_token: "tok".to_owned(),
                test_event_code: test_event_code.map(str::to_owned),
            },
        )
    }

    fn event() -> ConversionEvent {
        ConversionEvent {
            event_name: "Lead".to_owned(),
            event_time: 1_700_000_000,
            event_id: "evt-1".to_owned(),
            action_source: "website".to_owned(),
            event_source_url: None,
            user_data: Map::new(),
            custom_data: None,
        }
    }

    #[test]
    fn events_url_includes_version_pixel_and_token() {
        let url = publisher(None).events_url();
        assert_eq!(
            url.ok().map(String::from),
            Some("https://graph.facebook.com/v19.0/123456/events?access_token=tok".to_owned())
        );
    }

    #[test]
    fn payload_wraps_event_in_data_array() {
        let payload = publisher(None).payload(event());

        assert_eq!(payload["data"][0]["event_name"], json!("Lead"));
        assert_eq!(payload["data"][0]["event_time"], json!(1_700_000_000));
        assert!(payload.get("test_event_code").is_none());
        assert!(payload["data"][0].get("custom_data").is_none());
    }

    #[test]
    fn test_event_code_is_forwarded_when_configured() {
        let payload = publisher(Some("TEST123")).payload(event());
        assert_eq!(payload["test_event_code"], json!("TEST123"));
    }
}
