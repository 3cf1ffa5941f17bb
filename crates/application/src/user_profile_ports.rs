//! Document store port for user profiles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use consorciatech_core::AppResult;
use consorciatech_domain::{AccountId, PermissionMatrix, UserProfile, UserRole};

/// User profile document as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUserProfile {
    /// Document key, equal to the account identifier.
    pub id: AccountId,
    /// Email address, if ever provided.
    pub email: Option<String>,
    /// Display name.
    pub name: String,
    /// Assigned role.
    pub role: UserRole,
    /// Granted permissions per resource category.
    pub permissions: PermissionMatrix,
    /// Store-assigned creation time. Set once on first write.
    pub created_at: DateTime<Utc>,
    /// Store-assigned time of the most recent write.
    pub updated_at: DateTime<Utc>,
}

/// Repository port for user profile documents keyed by account identifier.
#[async_trait]
pub trait UserProfileRepository: Send + Sync {
    /// Writes the profile at key `profile.id()` as one atomic merge.
    ///
    /// Present fields overwrite, absent optional fields keep their stored
    /// value, permission entries merge per category, and `created_at` is
    /// assigned by the store on first insert only.
    async fn upsert_merge(&self, profile: &UserProfile) -> AppResult<()>;

    /// Finds a profile by account identifier.
    async fn find_by_id(&self, id: &AccountId) -> AppResult<Option<StoredUserProfile>>;
}
