mod common;
mod integrations;
mod users;

pub use common::{HealthDependencyStatus, HealthResponse};
pub use integrations::{
    ConversionEventRequest, DownloadQuery, SignUploadRequest, SignedUploadResponse,
    UpdateRulesRequest, WhatsAppNotificationRequest,
};
pub use users::{AccountCreatedEventRequest, UserProfileResponse};
