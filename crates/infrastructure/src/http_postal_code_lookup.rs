use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use consorciatech_application::PostalCodeLookup;
use consorciatech_core::{AppError, AppResult};
use consorciatech_domain::PostalCode;

use crate::http_upstream;

/// Public postal code directory used when none is configured.
pub const DEFAULT_POSTAL_CODE_API_BASE_URL: &str = "https://viacep.com.br/ws";

/// Postal code lookup against a ViaCEP-compatible JSON API.
pub struct HttpPostalCodeLookup {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpPostalCodeLookup {
    /// Creates a lookup client for `{base_url}/{cep}/json/`.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    fn lookup_url(&self, postal_code: &PostalCode) -> AppResult<Url> {
        Url::parse(&format!("{}/{}/json/", self.base_url, postal_code.as_str())).map_err(
            |error| AppError::Internal(format!("invalid postal code API base url: {error}")),
        )
    }
}

#[async_trait]
impl PostalCodeLookup for HttpPostalCodeLookup {
    async fn lookup(&self, postal_code: &PostalCode) -> AppResult<Value> {
        let url = self.lookup_url(postal_code)?;
        let response = http_upstream::send(self.http_client.get(url), "postal code lookup").await?;
        http_upstream::read_json(response, "postal code lookup").await
    }
}

#[cfg(test)]
mod tests {
    use consorciatech_domain::PostalCode;

    use super::HttpPostalCodeLookup;

    #[test]
    fn lookup_url_uses_bare_digits() {
        let lookup = HttpPostalCodeLookup::new(reqwest::Client::new(), "https://viacep.com.br/ws/");
        let postal_code = PostalCode::parse("01310-930").unwrap_or_else(|error| panic!("{error}"));

        let url = lookup.lookup_url(&postal_code);

        assert_eq!(
            url.ok().map(String::from),
            Some("https://viacep.com.br/ws/01310930/json/".to_owned())
        );
    }
}
