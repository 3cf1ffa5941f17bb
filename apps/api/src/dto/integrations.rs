use consorciatech_application::{ConversionEventInput, SignedUpload};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

/// Query string of the download route.
#[derive(Debug, Default, Deserialize)]
pub struct DownloadQuery {
    pub file: Option<String>,
}

/// Conversion event submitted by the CRM frontend.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/conversion-event-request.ts"
)]
pub struct ConversionEventRequest {
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    #[ts(type = "Record<string, unknown> | null")]
    pub user_data: Option<Map<String, Value>>,
    #[serde(default)]
    #[ts(type = "Record<string, unknown> | null")]
    pub custom_data: Option<Value>,
    #[serde(default)]
    pub event_source_url: Option<String>,
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub action_source: Option<String>,
}

impl From<ConversionEventRequest> for ConversionEventInput {
    fn from(value: ConversionEventRequest) -> Self {
        Self {
            event_name: value.event_name,
            user_data: value.user_data.unwrap_or_default(),
            custom_data: value.custom_data,
            event_source_url: value.event_source_url,
            event_id: value.event_id,
            action_source: value.action_source,
        }
    }
}

/// Upload parameters to sign.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/sign-upload-request.ts"
)]
pub struct SignUploadRequest {
    #[serde(default)]
    #[ts(type = "Record<string, string | number | boolean | Array<string | number> | null>")]
    pub params_to_sign: Map<String, Value>,
}

/// Signature returned to the uploading client.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/signed-upload-response.ts"
)]
pub struct SignedUploadResponse {
    pub signature: String,
    pub timestamp: String,
    pub api_key: String,
    pub cloud_name: String,
    pub signature_algorithm: String,
}

impl From<SignedUpload> for SignedUploadResponse {
    fn from(value: SignedUpload) -> Self {
        Self {
            signature: value.signature,
            timestamp: value.timestamp,
            api_key: value.api_key,
            cloud_name: value.cloud_name,
            signature_algorithm: value.signature_algorithm.to_owned(),
        }
    }
}

/// Replacement security rules document.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-rules-request.ts"
)]
pub struct UpdateRulesRequest {
    #[serde(default)]
    pub rules: String,
}

/// WhatsApp notification to send.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/whatsapp-notification-request.ts"
)]
pub struct WhatsAppNotificationRequest {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
}
