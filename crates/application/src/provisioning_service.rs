//! Account provisioning on signup.
//!
//! Reacts to account-created events by writing the user profile document.
//! Delivery is at least once; the write is a merge at a deterministic key so
//! a redelivered event converges on the same document. Failures are logged
//! and returned unchanged so the delivering platform decides on redelivery.

use std::sync::Arc;

use tracing::{error, info, warn};

use consorciatech_core::{AppError, AppResult};
use consorciatech_domain::{AccountCreatedEvent, AccountId, UserProfile};

use crate::{StoredUserProfile, UserProfileRepository};

/// Application service that provisions user profiles for new accounts.
#[derive(Clone)]
pub struct ProvisioningService {
    user_profile_repository: Arc<dyn UserProfileRepository>,
}

impl ProvisioningService {
    /// Creates a new provisioning service.
    #[must_use]
    pub fn new(user_profile_repository: Arc<dyn UserProfileRepository>) -> Self {
        Self {
            user_profile_repository,
        }
    }

    /// Handles one account-created event.
    ///
    /// A missing identifier fails with [`AppError::Validation`] before any
    /// write. Store failures are returned as-is; nothing is retried here.
    pub async fn handle_account_created(&self, event: AccountCreatedEvent) -> AppResult<()> {
        let profile = match UserProfile::provision(&event) {
            Ok(profile) => profile,
            Err(error) => {
                warn!(error = %error, "rejected malformed account-created event");
                return Err(error);
            }
        };

        if let Err(error) = self.user_profile_repository.upsert_merge(&profile).await {
            error!(
                uid = %profile.id(),
                error = %error,
                redelivery_may_succeed = error.is_retryable(),
                "failed to persist provisioned user profile"
            );
            return Err(error);
        }

        info!(
            uid = %profile.id(),
            role = profile.role().as_str(),
            "user profile provisioned"
        );

        Ok(())
    }

    /// Returns the stored profile for an account.
    pub async fn find_profile(&self, uid: &str) -> AppResult<StoredUserProfile> {
        let id = AccountId::new(uid)?;

        self.user_profile_repository
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user profile '{id}' does not exist")))
    }
}
