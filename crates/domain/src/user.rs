//! User profile domain types and provisioning rules.

use consorciatech_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::PermissionMatrix;

/// Name stored when an account carries neither a display name nor an email.
pub const DEFAULT_PROFILE_NAME: &str = "Usuário";

/// Opaque account identifier assigned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(NonEmptyString);

impl AccountId {
    /// Creates a validated account identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        NonEmptyString::new(value)
            .map(Self)
            .map_err(|_| AppError::Validation("account identifier must not be empty".to_owned()))
    }

    /// Returns the identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs basic structural validation: non-empty, contains exactly one `@`,
    /// local part and domain are non-empty, domain contains at least one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        };

        if domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if trimmed.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// CRM role assigned to a user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    /// Default low-privilege role.
    User,
    /// Administrator with the full permission matrix.
    Admin,
}

impl UserRole {
    /// Returns the storage string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Admin => "Admin",
        }
    }

    /// Parses a storage string into a role.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "User" => Ok(Self::User),
            "Admin" => Ok(Self::Admin),
            _ => Err(AppError::Validation(format!("unknown user role '{value}'"))),
        }
    }

    /// Orders roles by privilege; a higher rank grants more.
    #[must_use]
    pub fn privilege_rank(&self) -> u8 {
        match self {
            Self::User => 0,
            Self::Admin => 1,
        }
    }
}

/// Account-created notification emitted by the identity provider.
///
/// Delivered at least once; `uid` is optional on the wire so a malformed
/// event can be rejected explicitly instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCreatedEvent {
    /// Unique account identifier.
    pub uid: Option<String>,
    /// Email address, if the provider knows one.
    pub email: Option<String>,
    /// Display name, if the provider knows one.
    pub display_name: Option<String>,
}

/// Profile fields owned by the provisioning workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    id: AccountId,
    email: Option<String>,
    name: String,
    role: UserRole,
    permissions: PermissionMatrix,
}

impl UserProfile {
    /// Creates a profile from already validated parts.
    ///
    /// Admin profiles always carry an entry for every resource category.
    pub fn new(
        id: AccountId,
        email: Option<String>,
        name: impl Into<String>,
        role: UserRole,
        permissions: PermissionMatrix,
    ) -> AppResult<Self> {
        if role == UserRole::Admin && !permissions.covers_all_categories() {
            return Err(AppError::Validation(
                "admin profiles must define permissions for every resource category".to_owned(),
            ));
        }

        Ok(Self {
            id,
            email,
            name: name.into(),
            role,
            permissions,
        })
    }

    /// Derives the profile written when an account is first observed.
    pub fn provision(event: &AccountCreatedEvent) -> AppResult<Self> {
        let id = AccountId::new(event.uid.clone().unwrap_or_default())?;
        let email = non_blank(event.email.as_deref());
        let name = non_blank(event.display_name.as_deref())
            .or_else(|| email.clone())
            .unwrap_or_else(|| DEFAULT_PROFILE_NAME.to_owned());

        Self::new(id, email, name, UserRole::Admin, PermissionMatrix::full())
    }

    /// Returns the account identifier, which is also the document key.
    #[must_use]
    pub fn id(&self) -> &AccountId {
        &self.id
    }

    /// Returns the email, if known.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the derived display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the assigned role.
    #[must_use]
    pub fn role(&self) -> UserRole {
        self.role
    }

    /// Returns the granted permission matrix.
    #[must_use]
    pub fn permissions(&self) -> &PermissionMatrix {
        &self.permissions
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}
