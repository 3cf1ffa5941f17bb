//! Ports for the stateless third-party integrations behind the proxy routes.

use std::collections::BTreeMap;
use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::Serialize;
use serde_json::{Map, Value};

use consorciatech_core::{AppError, AppResult};
use consorciatech_domain::{EmailAddress, PostalCode};

/// Chunked response body relayed from an upstream service.
pub type ByteStream = Pin<Box<dyn Stream<Item = AppResult<Vec<u8>>> + Send>>;

/// File fetched from the storage backend, ready to be streamed to a client.
pub struct DownloadedFile {
    /// Upstream content type, if reported.
    pub content_type: Option<String>,
    /// Upstream content length, if reported.
    pub content_length: Option<u64>,
    /// File name suggested to the client.
    pub file_name: String,
    /// Response body.
    pub body: ByteStream,
}

impl std::fmt::Debug for DownloadedFile {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("DownloadedFile")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

/// Conversion event ready for the ads-conversion API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionEvent {
    /// Event name, e.g. `Lead` or `Purchase`.
    pub event_name: String,
    /// Unix timestamp in seconds.
    pub event_time: i64,
    /// Deduplication identifier.
    pub event_id: String,
    /// Where the conversion happened, e.g. `website`.
    pub action_source: String,
    /// Page URL the event originated from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_source_url: Option<String>,
    /// Normalised and hashed customer information.
    pub user_data: Map<String, Value>,
    /// Free-form event parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<Value>,
}

/// Signature for a client-side asset upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedUpload {
    /// Hex digest over the sorted parameters and the API secret.
    pub signature: String,
    /// Timestamp parameter included in the signature.
    pub timestamp: String,
    /// Public API key the client sends alongside the signature.
    pub api_key: String,
    /// Cloud account the upload targets.
    pub cloud_name: String,
    /// Digest algorithm the upload service must verify with.
    pub signature_algorithm: &'static str,
}

/// WhatsApp text message with a normalised destination number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhatsAppMessage {
    phone: String,
    body: String,
}

impl WhatsAppMessage {
    /// Validates a destination number and message body.
    ///
    /// Formatting characters are stripped from the number; 10 to 15 digits
    /// must remain.
    pub fn new(phone: &str, body: &str) -> AppResult<Self> {
        let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
        let has_foreign_characters = phone
            .chars()
            .any(|character| !character.is_ascii_digit() && !"+-() .".contains(character));

        if has_foreign_characters || !(10..=15).contains(&digits.len()) {
            return Err(AppError::Validation("Telefone inválido.".to_owned()));
        }

        if body.trim().is_empty() {
            return Err(AppError::Validation("Mensagem vazia.".to_owned()));
        }

        Ok(Self {
            phone: digits,
            body: body.to_owned(),
        })
    }

    /// Returns the destination digits, country code included.
    #[must_use]
    pub fn phone(&self) -> &str {
        self.phone.as_str()
    }

    /// Returns the message text.
    #[must_use]
    pub fn body(&self) -> &str {
        self.body.as_str()
    }
}

/// Postal code (CEP) address lookup.
#[async_trait]
pub trait PostalCodeLookup: Send + Sync {
    /// Returns the raw upstream payload for a postal code.
    async fn lookup(&self, postal_code: &PostalCode) -> AppResult<Value>;
}

/// Third-party email deliverability check.
#[async_trait]
pub trait EmailVerifier: Send + Sync {
    /// Returns the upstream verdict payload.
    async fn verify(&self, email: &EmailAddress) -> AppResult<Value>;
}

/// Authenticated pass-through to the file storage backend.
#[async_trait]
pub trait FileProxy: Send + Sync {
    /// Opens a download for a storage path or URL.
    async fn fetch(&self, file: &str) -> AppResult<DownloadedFile>;
}

/// Ads-conversion API client.
#[async_trait]
pub trait ConversionEventPublisher: Send + Sync {
    /// Publishes one conversion event and returns the upstream response.
    async fn publish(&self, event: ConversionEvent) -> AppResult<Value>;
}

/// Signs client-side upload parameters.
pub trait UploadSigner: Send + Sync {
    /// Signs the parameters. They must already contain a `timestamp`.
    fn sign(&self, params: &BTreeMap<String, String>) -> AppResult<SignedUpload>;
}

/// Writable security-rules file.
#[async_trait]
pub trait SecurityRulesStore: Send + Sync {
    /// Replaces the rules file contents.
    async fn overwrite(&self, rules: &str) -> AppResult<()>;
}

/// WhatsApp gateway client.
#[async_trait]
pub trait WhatsAppSender: Send + Sync {
    /// Sends one text message.
    async fn send(&self, message: &WhatsAppMessage) -> AppResult<()>;
}

#[cfg(test)]
mod tests {
    use super::WhatsAppMessage;

    #[test]
    fn whatsapp_number_is_reduced_to_digits() {
        let message = WhatsAppMessage::new("+55 (11) 98765-4321", "Olá");
        assert_eq!(
            message.ok().as_ref().map(WhatsAppMessage::phone),
            Some("5511987654321")
        );
    }

    #[test]
    fn whatsapp_number_with_letters_is_rejected() {
        assert!(WhatsAppMessage::new("55 11 CALL-ME-NOW", "Olá").is_err());
    }

    #[test]
    fn short_whatsapp_number_is_rejected() {
        assert!(WhatsAppMessage::new("98765", "Olá").is_err());
    }

    #[test]
    fn blank_whatsapp_body_is_rejected() {
        assert!(WhatsAppMessage::new("5511987654321", "  ").is_err());
    }
}
