use std::sync::Arc;

use consorciatech_application::{
    IntegrationAdapters, IntegrationService, ProvisioningService, UserProfileRepository,
};
use consorciatech_core::AppError;
use consorciatech_infrastructure::{
    CloudinaryUploadSigner, FilesystemSecurityRulesStore, HttpConversionEventPublisher,
    HttpEmailVerifier, HttpFileProxy, HttpPostalCodeLookup, HttpWhatsAppSender,
    InMemoryUserProfileRepository, PostgresUserProfileRepository,
};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

pub fn build_app_state(
    config: &ApiConfig,
    postgres_pool: Option<PgPool>,
    http_client: reqwest::Client,
) -> Result<AppState, AppError> {
    let user_profile_repository: Arc<dyn UserProfileRepository> = match postgres_pool.clone() {
        Some(pool) => Arc::new(PostgresUserProfileRepository::new(pool)),
        None => Arc::new(InMemoryUserProfileRepository::new()),
    };

    let integration_service = IntegrationService::new(IntegrationAdapters {
        postal_code_lookup: Arc::new(HttpPostalCodeLookup::new(
            http_client.clone(),
            config.cep_api_base_url.as_str(),
        )),
        email_verifier: Arc::new(HttpEmailVerifier::new(
            http_client.clone(),
            config.email_validation.api_url.as_str(),
            config.email_validation.api_key.as_str(),
        )),
        file_proxy: Arc::new(HttpFileProxy::new(
            http_client.clone(),
            config.download.base_url.as_str(),
            config.download.bearer_token.as_str(),
        )?),
        conversion_publisher: Arc::new(HttpConversionEventPublisher::new(
            http_client.clone(),
            config.pixel.clone(),
        )),
        upload_signer: Arc::new(CloudinaryUploadSigner::new(
            config.cloudinary.cloud_name.as_str(),
            config.cloudinary.api_key.as_str(),
            config.cloudinary.api_secret.as_str(),
        )),
        security_rules_store: Arc::new(FilesystemSecurityRulesStore::new(
            config.security_rules_path.clone(),
        )),
        whatsapp_sender: Arc::new(HttpWhatsAppSender::new(
            http_client,
            config.whatsapp.api_url.as_str(),
            config.whatsapp.api_token.as_str(),
        )),
    });

    Ok(AppState {
        provisioning_service: ProvisioningService::new(user_profile_repository),
        integration_service,
        postgres_pool,
        internal_events_token: config.internal_events_token.clone(),
        operator_token: config.operator_token.clone(),
    })
}
