use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Parse a raw authority error body and normalize it. A body that is
/// not JSON at all is a malformed payload, distinct from a valid JSON
/// shape we simply do not recognize (which normalizes to empty).
pub fn parse_error_payload(raw: &str) -> CoreResult<Vec<ApiFieldError>> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| CoreError::MalformedPayload(e.to_string()))?;
    Ok(normalize_error_payload(&value))
}

/// One normalized authority error: a global message set when `field`
/// is None, otherwise messages attached to a named field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiFieldError {
    pub field: Option<String>,
    pub messages: Vec<String>,
}

impl ApiFieldError {
    pub fn global(message: impl Into<String>) -> Self {
        Self { field: None, messages: vec![message.into()] }
    }

    pub fn field(field: impl Into<String>, messages: Vec<String>) -> Self {
        Self { field: Some(field.into()), messages }
    }
}

/// Normalize the authority's error payload into a flat error list.
///
/// The wire contract allows three shapes:
///   { "message": "..." }
///   ["...", "..."]
///   { "field": "..." | ["...", "..."], ... }
/// Everything downstream works with the normalized form only.
pub fn normalize_error_payload(payload: &Value) -> Vec<ApiFieldError> {
    match payload {
        Value::String(s) => vec![ApiFieldError::global(s.clone())],
        Value::Array(items) => {
            let messages: Vec<String> = items.iter().filter_map(value_to_message).collect();
            if messages.is_empty() {
                vec![]
            } else {
                vec![ApiFieldError { field: None, messages }]
            }
        }
        Value::Object(map) => {
            // Flat { message } is a single global error
            if map.len() == 1 {
                if let Some(msg) = map.get("message").and_then(Value::as_str) {
                    return vec![ApiFieldError::global(msg.to_string())];
                }
            }
            map.iter()
                .filter_map(|(field, v)| {
                    let messages: Vec<String> = match v {
                        Value::Array(items) => items.iter().filter_map(value_to_message).collect(),
                        other => value_to_message(other).into_iter().collect(),
                    };
                    if messages.is_empty() {
                        None
                    } else {
                        Some(ApiFieldError::field(field.clone(), messages))
                    }
                })
                .collect()
        }
        _ => vec![],
    }
}

fn value_to_message(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
