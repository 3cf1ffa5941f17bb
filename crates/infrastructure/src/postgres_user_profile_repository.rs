//! PostgreSQL-backed user profile store.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use tracing::warn;

use consorciatech_application::{StoredUserProfile, UserProfileRepository};
use consorciatech_core::{AppError, AppResult};
use consorciatech_domain::{
    AccountId, CrudPermissions, PermissionMatrix, ResourceCategory, UserProfile, UserRole,
};

/// PostgreSQL implementation of the user profile repository port.
#[derive(Clone)]
pub struct PostgresUserProfileRepository {
    pool: PgPool,
}

impl PostgresUserProfileRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserProfileRow {
    id: String,
    email: Option<String>,
    name: String,
    role: String,
    permissions: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserProfileRow> for StoredUserProfile {
    type Error = AppError;

    fn try_from(row: UserProfileRow) -> Result<Self, Self::Error> {
        let permissions = permissions_from_json(row.id.as_str(), row.permissions);

        Ok(Self {
            id: AccountId::new(row.id)?,
            email: row.email,
            name: row.name,
            role: UserRole::parse(row.role.as_str())?,
            permissions,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl UserProfileRepository for PostgresUserProfileRepository {
    async fn upsert_merge(&self, profile: &UserProfile) -> AppResult<()> {
        let permissions = serde_json::to_value(profile.permissions()).map_err(|error| {
            AppError::Internal(format!("failed to encode permission matrix: {error}"))
        })?;

        sqlx::query(
            r#"
            INSERT INTO user_profiles (id, email, name, role, permissions)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET email = COALESCE(EXCLUDED.email, user_profiles.email),
                name = EXCLUDED.name,
                role = EXCLUDED.role,
                permissions = user_profiles.permissions || EXCLUDED.permissions,
                updated_at = now()
            "#,
        )
        .bind(profile.id().as_str())
        .bind(profile.email())
        .bind(profile.name())
        .bind(profile.role().as_str())
        .bind(permissions)
        .execute(&self.pool)
        .await
        .map_err(|error| store_error(error, "upsert user profile"))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &AccountId) -> AppResult<Option<StoredUserProfile>> {
        let row = sqlx::query_as::<_, UserProfileRow>(
            r#"
            SELECT id, email, name, role, permissions, created_at, updated_at
            FROM user_profiles
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| store_error(error, "find user profile"))?;

        row.map(StoredUserProfile::try_from).transpose()
    }
}

/// Reads a stored permission object, skipping categories this build does not know.
fn permissions_from_json(id: &str, value: Value) -> PermissionMatrix {
    let Value::Object(entries) = value else {
        warn!(uid = id, "stored permissions are not an object; treating as empty");
        return PermissionMatrix::empty();
    };

    entries
        .into_iter()
        .filter_map(|(key, flags)| {
            let category = match ResourceCategory::from_str(key.as_str()) {
                Ok(category) => category,
                Err(_) => {
                    warn!(uid = id, category = %key, "ignoring unknown permission category");
                    return None;
                }
            };

            match serde_json::from_value::<CrudPermissions>(flags) {
                Ok(flags) => Some((category, flags)),
                Err(error) => {
                    warn!(
                        uid = id,
                        category = %key,
                        error = %error,
                        "ignoring malformed permission entry"
                    );
                    None
                }
            }
        })
        .collect()
}

fn store_error(error: sqlx::Error, operation: &str) -> AppError {
    match error {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => {
            AppError::Unavailable(format!("failed to {operation}: {error}"))
        }
        other => AppError::Internal(format!("failed to {operation}: {other}")),
    }
}
