use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use consorciatech_core::{AppError, AppResult};

use crate::ConversionEvent;

const DEFAULT_ACTION_SOURCE: &str = "website";

/// User data keys the conversion API expects in clear text.
const CLEAR_TEXT_USER_DATA_KEYS: &[&str] = &[
    "client_ip_address",
    "client_user_agent",
    "fbc",
    "fbp",
    "subscription_id",
    "lead_id",
];

/// Conversion event as submitted by the CRM frontend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionEventInput {
    /// Event name, e.g. `Lead`.
    pub event_name: String,
    /// Customer information; hashed before leaving the process.
    pub user_data: Map<String, Value>,
    /// Free-form event parameters.
    pub custom_data: Option<Value>,
    /// Page URL the event originated from.
    pub event_source_url: Option<String>,
    /// Deduplication identifier shared with the browser pixel.
    pub event_id: Option<String>,
    /// Action source override.
    pub action_source: Option<String>,
}

impl ConversionEventInput {
    pub(super) fn into_event(self, event_time: i64) -> AppResult<ConversionEvent> {
        let event_name = self.event_name.trim().to_owned();
        if event_name.is_empty() {
            return Err(AppError::Validation("Evento inválido.".to_owned()));
        }

        let user_data = self
            .user_data
            .into_iter()
            .map(|(key, value)| {
                let value = if CLEAR_TEXT_USER_DATA_KEYS.contains(&key.as_str()) {
                    value
                } else {
                    hash_user_data_value(key.as_str(), value)
                };
                (key, value)
            })
            .collect();

        Ok(ConversionEvent {
            event_name,
            event_time,
            event_id: non_blank(self.event_id)
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            action_source: non_blank(self.action_source)
                .unwrap_or_else(|| DEFAULT_ACTION_SOURCE.to_owned()),
            event_source_url: non_blank(self.event_source_url),
            user_data,
            custom_data: self.custom_data,
        })
    }
}

fn hash_user_data_value(key: &str, value: Value) -> Value {
    match value {
        Value::String(raw) => Value::String(hash_identifier(key, raw.as_str())),
        Value::Number(number) => Value::String(hash_identifier(key, number.to_string().as_str())),
        Value::Array(entries) => Value::Array(
            entries
                .into_iter()
                .map(|entry| hash_user_data_value(key, entry))
                .collect(),
        ),
        other => other,
    }
}

fn hash_identifier(key: &str, raw: &str) -> String {
    if is_sha256_hex(raw) {
        return raw.to_ascii_lowercase();
    }

    let normalized: String = match key {
        "ph" => raw.chars().filter(char::is_ascii_digit).collect(),
        "zp" | "ct" | "st" | "country" | "fn" | "ln" => raw
            .chars()
            .filter(|character| !character.is_whitespace())
            .collect::<String>()
            .to_lowercase(),
        _ => raw.trim().to_lowercase(),
    };

    hex::encode(Sha256::digest(normalized.as_bytes()))
}

fn is_sha256_hex(value: &str) -> bool {
    value.len() == 64 && value.bytes().all(|byte| byte.is_ascii_hexdigit())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
