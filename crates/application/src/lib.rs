//! Application services and ports.

#![forbid(unsafe_code)]

mod integration_ports;
mod integration_service;
mod provisioning_service;
mod user_profile_ports;

pub use integration_ports::{
    ByteStream, ConversionEvent, ConversionEventPublisher, DownloadedFile, EmailVerifier,
    FileProxy, PostalCodeLookup, SecurityRulesStore, SignedUpload, UploadSigner, WhatsAppMessage,
    WhatsAppSender,
};
pub use integration_service::{
    ConversionEventInput, IntegrationAdapters, IntegrationService, MAX_SECURITY_RULES_BYTES,
    POSTAL_CODE_NOT_FOUND_MESSAGE,
};
pub use provisioning_service::ProvisioningService;
pub use user_profile_ports::{StoredUserProfile, UserProfileRepository};
