use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use consorciatech_application::{SignedUpload, UploadSigner};
use consorciatech_core::{AppError, AppResult};

/// Parameters the upload service never includes in the signed string.
const UNSIGNED_PARAMS: [&str; 4] = ["file", "cloud_name", "resource_type", "api_key"];

/// Signs Cloudinary upload parameters with the account API secret.
pub struct CloudinaryUploadSigner {
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl CloudinaryUploadSigner {
    /// Creates a signer for one cloud account.
    #[must_use]
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }
}

/// Builds `k1=v1&k2=v2` over the signable parameters in key order.
fn string_to_sign(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .filter(|(key, value)| !value.is_empty() && !UNSIGNED_PARAMS.contains(&key.as_str()))
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

impl UploadSigner for CloudinaryUploadSigner {
    fn sign(&self, params: &BTreeMap<String, String>) -> AppResult<SignedUpload> {
        let timestamp = params.get("timestamp").cloned().ok_or_else(|| {
            AppError::Validation("upload parameters require a timestamp".to_owned())
        })?;

        let mut hasher = Sha256::new();
        hasher.update(string_to_sign(params).as_bytes());
        hasher.update(self.api_secret.as_bytes());

        Ok(SignedUpload {
            signature: hex::encode(hasher.finalize()),
            timestamp,
            api_key: self.api_key.clone(),
            cloud_name: self.cloud_name.clone(),
            signature_algorithm: "sha256",
        })
    }
}
