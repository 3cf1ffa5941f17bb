//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod permission;
mod postal_code;
mod user;

pub use permission::{CrudPermissions, PermissionMatrix, ResourceCategory};
pub use postal_code::{INVALID_POSTAL_CODE_MESSAGE, PostalCode};
pub use user::{
    AccountCreatedEvent, AccountId, DEFAULT_PROFILE_NAME, EmailAddress, UserProfile, UserRole,
};
