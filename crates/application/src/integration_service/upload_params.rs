use std::collections::BTreeMap;

use serde_json::{Map, Value};

use consorciatech_core::{AppError, AppResult};

/// Flattens client-supplied upload parameters into their signed string form.
///
/// Nulls and empty strings are dropped since the upload service ignores
/// them when verifying; arrays are joined with commas.
pub(super) fn stringify(params: Map<String, Value>) -> AppResult<BTreeMap<String, String>> {
    let mut flattened = BTreeMap::new();

    for (key, value) in params {
        if key.trim().is_empty() {
            return Err(AppError::Validation(
                "upload parameter names must not be empty".to_owned(),
            ));
        }

        let Some(value) = scalar_to_string(&key, &value)? else {
            continue;
        };

        if !value.is_empty() {
            flattened.insert(key, value);
        }
    }

    Ok(flattened)
}

fn scalar_to_string(key: &str, value: &Value) -> AppResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(value) => Ok(Some(value.clone())),
        Value::Number(value) => Ok(Some(value.to_string())),
        Value::Bool(value) => Ok(Some(value.to_string())),
        Value::Array(entries) => {
            let mut joined = Vec::with_capacity(entries.len());
            for entry in entries {
                match entry {
                    Value::Array(_) | Value::Object(_) => {
                        return Err(nested_value_error(key));
                    }
                    other => {
                        if let Some(value) = scalar_to_string(key, other)? {
                            joined.push(value);
                        }
                    }
                }
            }
            Ok(Some(joined.join(",")))
        }
        Value::Object(_) => Err(nested_value_error(key)),
    }
}

fn nested_value_error(key: &str) -> AppError {
    AppError::Validation(format!("upload parameter '{key}' must not be an object"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::stringify;

    #[test]
    fn scalars_arrays_and_nulls_are_flattened() {
        let params = json!({
            "folder": "proposals",
            "timestamp": 1_700_000_000,
            "tags": ["cnh", "rg"],
            "public_id": null,
            "context": ""
        });

        let flattened = stringify(params.as_object().cloned().unwrap_or_default());
        let flattened = flattened.unwrap_or_else(|error| panic!("rejected: {error}"));

        assert_eq!(flattened.get("folder").map(String::as_str), Some("proposals"));
        assert_eq!(
            flattened.get("timestamp").map(String::as_str),
            Some("1700000000")
        );
        assert_eq!(flattened.get("tags").map(String::as_str), Some("cnh,rg"));
        assert!(!flattened.contains_key("public_id"));
        assert!(!flattened.contains_key("context"));
    }

    #[test]
    fn nested_objects_are_rejected() {
        let params = json!({ "eager": { "width": 10 } });
        assert!(stringify(params.as_object().cloned().unwrap_or_default()).is_err());
    }
}
