use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use consorciatech_application::{
    ConversionEvent, ConversionEventPublisher, DownloadedFile, EmailVerifier, FileProxy,
    IntegrationAdapters, IntegrationService, PostalCodeLookup, ProvisioningService,
    SecurityRulesStore, SignedUpload, StoredUserProfile, UploadSigner, UserProfileRepository,
    WhatsAppMessage, WhatsAppSender,
};
use consorciatech_core::{AppError, AppResult};
use consorciatech_domain::{AccountId, EmailAddress, PostalCode, UserProfile};
use consorciatech_infrastructure::InMemoryUserProfileRepository;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::state::AppState;

pub(crate) const INTERNAL_TOKEN: &str = "events-secret";
pub(crate) const OPERATOR_TOKEN: &str = "operator-secret";

pub(crate) struct FakePostalCodeLookup {
    pub payload: Mutex<Value>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl PostalCodeLookup for FakePostalCodeLookup {
    async fn lookup(&self, _postal_code: &PostalCode) -> AppResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.payload.lock().await.clone())
    }
}

struct RejectingEmailVerifier;

#[async_trait]
impl EmailVerifier for RejectingEmailVerifier {
    async fn verify(&self, _email: &EmailAddress) -> AppResult<Value> {
        Err(AppError::Upstream {
            status: 401,
            message: "invalid api key".to_owned(),
        })
    }
}

struct ChunkedFileProxy;

#[async_trait]
impl FileProxy for ChunkedFileProxy {
    async fn fetch(&self, file: &str) -> AppResult<DownloadedFile> {
        let chunks: Vec<AppResult<Vec<u8>>> = vec![Ok(b"%PDF-".to_vec()), Ok(b"1.7".to_vec())];

        Ok(DownloadedFile {
            content_type: Some("application/pdf".to_owned()),
            content_length: Some(8),
            file_name: file.rsplit('/').next().unwrap_or(file).to_owned(),
            body: Box::pin(futures::stream::iter(chunks)),
        })
    }
}

#[derive(Default)]
pub(crate) struct RecordingConversionPublisher {
    pub published: Mutex<Vec<ConversionEvent>>,
}

#[async_trait]
impl ConversionEventPublisher for RecordingConversionPublisher {
    async fn publish(&self, event: ConversionEvent) -> AppResult<Value> {
        self.published.lock().await.push(event);
        Ok(json!({ "events_received": 1, "fbtrace_id": "trace" }))
    }
}

struct FixedSigner;

impl UploadSigner for FixedSigner {
    fn sign(&self, params: &BTreeMap<String, String>) -> AppResult<SignedUpload> {
        Ok(SignedUpload {
            signature: "signed".to_owned(),
            timestamp: params.get("timestamp").cloned().unwrap_or_default(),
            api_key: "1234".to_owned(),
            cloud_name: "demo".to_owned(),
            signature_algorithm: "sha256",
        })
    }
}

#[derive(Default)]
pub(crate) struct RecordingRulesStore {
    pub written: Mutex<Option<String>>,
}

#[async_trait]
impl SecurityRulesStore for RecordingRulesStore {
    async fn overwrite(&self, rules: &str) -> AppResult<()> {
        *self.written.lock().await = Some(rules.to_owned());
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingWhatsAppSender {
    pub sent: Mutex<Vec<WhatsAppMessage>>,
}

#[async_trait]
impl WhatsAppSender for RecordingWhatsAppSender {
    async fn send(&self, message: &WhatsAppMessage) -> AppResult<()> {
        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}

/// Profile store that is always unreachable.
#[derive(Default)]
pub(crate) struct UnavailableUserProfileRepository {
    pub writes: AtomicUsize,
}

#[async_trait]
impl UserProfileRepository for UnavailableUserProfileRepository {
    async fn upsert_merge(&self, _profile: &UserProfile) -> AppResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(AppError::Unavailable("profile store offline".to_owned()))
    }

    async fn find_by_id(&self, _id: &AccountId) -> AppResult<Option<StoredUserProfile>> {
        Err(AppError::Unavailable("profile store offline".to_owned()))
    }
}

pub(crate) struct TestApp {
    pub user_profiles: Arc<dyn UserProfileRepository>,
    pub postal_code_lookup: Arc<FakePostalCodeLookup>,
    pub conversion_publisher: Arc<RecordingConversionPublisher>,
    pub rules_store: Arc<RecordingRulesStore>,
    pub whatsapp_sender: Arc<RecordingWhatsAppSender>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_profile_store(Arc::new(InMemoryUserProfileRepository::new()))
    }

    pub fn with_profile_store(user_profiles: Arc<dyn UserProfileRepository>) -> Self {
        Self {
            user_profiles,
            postal_code_lookup: Arc::new(FakePostalCodeLookup {
                payload: Mutex::new(json!({})),
                calls: AtomicUsize::new(0),
            }),
            conversion_publisher: Arc::new(RecordingConversionPublisher::default()),
            rules_store: Arc::new(RecordingRulesStore::default()),
            whatsapp_sender: Arc::new(RecordingWhatsAppSender::default()),
        }
    }

    pub async fn with_postal_code_payload(self, payload: Value) -> Self {
        *self.postal_code_lookup.payload.lock().await = payload;
        self
    }

    pub fn state(&self) -> AppState {
        AppState {
            provisioning_service: ProvisioningService::new(self.user_profiles.clone()),
            integration_service: IntegrationService::new(IntegrationAdapters {
                postal_code_lookup: self.postal_code_lookup.clone(),
                email_verifier: Arc::new(RejectingEmailVerifier),
                file_proxy: Arc::new(ChunkedFileProxy),
                conversion_publisher: self.conversion_publisher.clone(),
                upload_signer: Arc::new(FixedSigner),
                security_rules_store: self.rules_store.clone(),
                whatsapp_sender: self.whatsapp_sender.clone(),
            }),
            postgres_pool: None,
            internal_events_token: INTERNAL_TOKEN.to_owned(),
            operator_token: OPERATOR_TOKEN.to_owned(),
        }
    }
}

/// Reads a response body as JSON.
pub(crate) async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}
