use std::collections::BTreeMap;

use consorciatech_application::StoredUserProfile;
use consorciatech_domain::{AccountCreatedEvent, CrudPermissions};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Account-created notification delivered by the identity platform.
#[derive(Debug, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/account-created-event-request.ts"
)]
pub struct AccountCreatedEventRequest {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl From<AccountCreatedEventRequest> for AccountCreatedEvent {
    fn from(value: AccountCreatedEventRequest) -> Self {
        Self {
            uid: value.uid,
            email: value.email,
            display_name: value.display_name,
        }
    }
}

/// CRUD flags for one resource category.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/crud-permissions-response.ts"
)]
pub struct CrudPermissionsResponse {
    pub create: bool,
    pub read: bool,
    pub update: bool,
    pub delete: bool,
}

impl From<CrudPermissions> for CrudPermissionsResponse {
    fn from(value: CrudPermissions) -> Self {
        Self {
            create: value.create,
            read: value.read,
            update: value.update,
            delete: value.delete,
        }
    }
}

/// API representation of a stored user profile.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-profile-response.ts"
)]
pub struct UserProfileResponse {
    pub id: String,
    pub email: Option<String>,
    pub name: String,
    #[ts(type = "\"User\" | \"Admin\"")]
    pub role: String,
    pub permissions: BTreeMap<String, CrudPermissionsResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<StoredUserProfile> for UserProfileResponse {
    fn from(value: StoredUserProfile) -> Self {
        Self {
            id: value.id.as_str().to_owned(),
            email: value.email,
            name: value.name,
            role: value.role.as_str().to_owned(),
            permissions: value
                .permissions
                .iter()
                .map(|(category, permissions)| {
                    (
                        category.as_str().to_owned(),
                        CrudPermissionsResponse::from(permissions),
                    )
                })
                .collect(),
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}
