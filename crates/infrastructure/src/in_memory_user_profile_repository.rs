use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use consorciatech_application::{StoredUserProfile, UserProfileRepository};
use consorciatech_core::AppResult;
use consorciatech_domain::{AccountId, UserProfile};

/// In-memory user profile store for local development and tests.
#[derive(Default)]
pub struct InMemoryUserProfileRepository {
    documents: RwLock<HashMap<AccountId, StoredUserProfile>>,
}

impl InMemoryUserProfileRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserProfileRepository for InMemoryUserProfileRepository {
    async fn upsert_merge(&self, profile: &UserProfile) -> AppResult<()> {
        let now = Utc::now();
        let mut documents = self.documents.write().await;

        if let Some(existing) = documents.get_mut(profile.id()) {
            if let Some(email) = profile.email() {
                existing.email = Some(email.to_owned());
            }
            existing.name = profile.name().to_owned();
            existing.role = profile.role();
            existing.permissions.merge_from(profile.permissions());
            existing.updated_at = now;
            return Ok(());
        }

        documents.insert(
            profile.id().clone(),
            StoredUserProfile {
                id: profile.id().clone(),
                email: profile.email().map(str::to_owned),
                name: profile.name().to_owned(),
                role: profile.role(),
                permissions: profile.permissions().clone(),
                created_at: now,
                updated_at: now,
            },
        );

        Ok(())
    }

    async fn find_by_id(&self, id: &AccountId) -> AppResult<Option<StoredUserProfile>> {
        Ok(self.documents.read().await.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use consorciatech_application::UserProfileRepository;
    use consorciatech_domain::{AccountCreatedEvent, AccountId, UserProfile, UserRole};

    use super::InMemoryUserProfileRepository;

    fn profile(uid: &str, email: Option<&str>, display_name: Option<&str>) -> UserProfile {
        let event = AccountCreatedEvent {
            uid: Some(uid.to_owned()),
            email: email.map(str::to_owned),
            display_name: display_name.map(str::to_owned),
        };

        UserProfile::provision(&event).unwrap_or_else(|error| panic!("{error}"))
    }

    #[tokio::test]
    async fn second_write_merges_without_touching_creation_time() {
        let repository = InMemoryUserProfileRepository::new();
        let id = AccountId::new("abc123").unwrap_or_else(|error| panic!("{error}"));

        assert!(
            repository
                .upsert_merge(&profile("abc123", Some("ana@consorcia.tech"), Some("Ana")))
                .await
                .is_ok()
        );
        let first = repository.find_by_id(&id).await.ok().flatten();

        assert!(
            repository
                .upsert_merge(&profile("abc123", None, Some("Ana Souza")))
                .await
                .is_ok()
        );
        let second = repository.find_by_id(&id).await.ok().flatten();

        let (Some(first), Some(second)) = (first, second) else {
            panic!("profile missing");
        };
        assert_eq!(first.created_at, second.created_at);
        assert_eq!(second.email.as_deref(), Some("ana@consorcia.tech"));
        assert_eq!(second.name, "Ana Souza");
        assert_eq!(second.role, UserRole::Admin);
        assert!(second.permissions.is_full());
    }

    #[tokio::test]
    async fn unknown_profile_reads_as_none() {
        let repository = InMemoryUserProfileRepository::new();
        let id = AccountId::new("nobody").unwrap_or_else(|error| panic!("{error}"));

        assert!(matches!(repository.find_by_id(&id).await, Ok(None)));
    }
}
