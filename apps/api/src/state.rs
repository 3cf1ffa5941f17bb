use consorciatech_application::{IntegrationService, ProvisioningService};
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub provisioning_service: ProvisioningService,
    pub integration_service: IntegrationService,
    pub postgres_pool: Option<PgPool>,
    pub internal_events_token: String,
    pub operator_token: String,
}
