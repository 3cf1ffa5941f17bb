//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod cloudinary_upload_signer;
mod filesystem_security_rules_store;
mod http_conversion_event_publisher;
mod http_email_verifier;
mod http_file_proxy;
mod http_postal_code_lookup;
mod http_upstream;
mod http_whatsapp_sender;
mod in_memory_user_profile_repository;
mod postgres_user_profile_repository;

pub use cloudinary_upload_signer::CloudinaryUploadSigner;
pub use filesystem_security_rules_store::FilesystemSecurityRulesStore;
pub use http_conversion_event_publisher::{ConversionApiSettings, HttpConversionEventPublisher};
pub use http_email_verifier::HttpEmailVerifier;
pub use http_file_proxy::HttpFileProxy;
pub use http_postal_code_lookup::{DEFAULT_POSTAL_CODE_API_BASE_URL, HttpPostalCodeLookup};
pub use http_whatsapp_sender::HttpWhatsAppSender;
pub use in_memory_user_profile_repository::InMemoryUserProfileRepository;
pub use postgres_user_profile_repository::PostgresUserProfileRepository;
