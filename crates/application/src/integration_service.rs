//! Input validation and payload shaping for the proxy routes.
//!
//! Each operation validates a single parameter, makes exactly one call
//! through its port, and hands the result back. Nothing is retried, cached
//! or batched.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use consorciatech_core::{AppError, AppResult};
use consorciatech_domain::{EmailAddress, PostalCode};

use crate::{
    ConversionEventPublisher, DownloadedFile, EmailVerifier, FileProxy, PostalCodeLookup,
    SecurityRulesStore, SignedUpload, UploadSigner, WhatsAppMessage, WhatsAppSender,
};

mod conversion;
mod upload_params;

pub use conversion::ConversionEventInput;

/// Message returned when the postal code service has no address.
pub const POSTAL_CODE_NOT_FOUND_MESSAGE: &str = "CEP não encontrado.";

/// Largest accepted security-rules document, in bytes.
pub const MAX_SECURITY_RULES_BYTES: usize = 256 * 1024;

/// Adapters used by [`IntegrationService`].
#[derive(Clone)]
pub struct IntegrationAdapters {
    /// Postal code lookup.
    pub postal_code_lookup: Arc<dyn PostalCodeLookup>,
    /// Email verdict provider.
    pub email_verifier: Arc<dyn EmailVerifier>,
    /// Storage download pass-through.
    pub file_proxy: Arc<dyn FileProxy>,
    /// Ads-conversion API client.
    pub conversion_publisher: Arc<dyn ConversionEventPublisher>,
    /// Upload parameter signer.
    pub upload_signer: Arc<dyn UploadSigner>,
    /// Security-rules file writer.
    pub security_rules_store: Arc<dyn SecurityRulesStore>,
    /// WhatsApp gateway client.
    pub whatsapp_sender: Arc<dyn WhatsAppSender>,
}

/// Application service behind the stateless proxy routes.
#[derive(Clone)]
pub struct IntegrationService {
    adapters: IntegrationAdapters,
}

impl IntegrationService {
    /// Creates a new integration service.
    #[must_use]
    pub fn new(adapters: IntegrationAdapters) -> Self {
        Self { adapters }
    }

    /// Looks up the address for a postal code.
    ///
    /// Array payloads are unwrapped to their first element. An empty array or
    /// an `erro` flag from the upstream service becomes [`AppError::NotFound`].
    pub async fn lookup_postal_code(&self, raw_postal_code: &str) -> AppResult<Value> {
        let postal_code = PostalCode::parse(raw_postal_code)?;
        let payload = self.adapters.postal_code_lookup.lookup(&postal_code).await?;

        unwrap_postal_code_payload(payload)
    }

    /// Asks the email verifier for a deliverability verdict.
    pub async fn validate_email(&self, raw_email: &str) -> AppResult<Value> {
        let email = EmailAddress::new(raw_email)
            .map_err(|_| AppError::Validation("E-mail inválido.".to_owned()))?;

        self.adapters.email_verifier.verify(&email).await
    }

    /// Opens a pass-through download for a storage path.
    pub async fn download(&self, file: Option<&str>) -> AppResult<DownloadedFile> {
        let file = file
            .map(str::trim)
            .filter(|file| !file.is_empty())
            .ok_or_else(|| AppError::Validation("Arquivo não informado.".to_owned()))?;

        self.adapters.file_proxy.fetch(file).await
    }

    /// Normalises, hashes and publishes one conversion event.
    pub async fn send_conversion_event(&self, input: ConversionEventInput) -> AppResult<Value> {
        let event = input.into_event(chrono::Utc::now().timestamp())?;

        self.adapters.conversion_publisher.publish(event).await
    }

    /// Signs upload parameters, adding a `timestamp` when the client sent none.
    pub fn sign_upload(&self, params: Map<String, Value>) -> AppResult<SignedUpload> {
        let mut params: BTreeMap<String, String> = upload_params::stringify(params)?;
        params
            .entry("timestamp".to_owned())
            .or_insert_with(|| chrono::Utc::now().timestamp().to_string());

        self.adapters.upload_signer.sign(&params)
    }

    /// Replaces the deployed security-rules file.
    pub async fn update_security_rules(&self, rules: &str) -> AppResult<()> {
        if rules.trim().is_empty() {
            return Err(AppError::Validation("Regras não informadas.".to_owned()));
        }

        if rules.len() > MAX_SECURITY_RULES_BYTES {
            return Err(AppError::Validation(format!(
                "rules document must not exceed {MAX_SECURITY_RULES_BYTES} bytes"
            )));
        }

        self.adapters.security_rules_store.overwrite(rules).await
    }

    /// Sends a WhatsApp message.
    pub async fn send_whatsapp(&self, message: &WhatsAppMessage) -> AppResult<()> {
        self.adapters.whatsapp_sender.send(message).await
    }
}

fn unwrap_postal_code_payload(payload: Value) -> AppResult<Value> {
    let address = match payload {
        Value::Array(entries) => entries.into_iter().next(),
        other => Some(other),
    };

    match address {
        Some(Value::Object(address)) if !is_error_marker(&address) => Ok(Value::Object(address)),
        _ => Err(AppError::NotFound(POSTAL_CODE_NOT_FOUND_MESSAGE.to_owned())),
    }
}

fn is_error_marker(address: &Map<String, Value>) -> bool {
    match address.get("erro") {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(flag)) => flag == "true",
        _ => false,
    }
}
