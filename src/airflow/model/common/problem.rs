//! Maps API error payloads to a one-line message.
//!
//! The legacy API answers with problem+json (`type`, `title`, `status`,
//! `detail`); the current API uses FastAPI's `{"detail": ...}` where `detail`
//! is either a string or a list of validation errors carrying `msg`.

use serde_json::Value;

use crate::airflow::client::base::ResponseBody;
use crate::airflow::config::AirflowVersion;

pub fn api_error_message(version: AirflowVersion, status: u16, body: &ResponseBody) -> String {
    let message = match body {
        ResponseBody::Json(payload) => match version {
            AirflowVersion::V2 => legacy_message(payload),
            AirflowVersion::V3 => current_message(payload),
        },
        ResponseBody::Text(text) if !text.trim().is_empty() => {
            Some(text.trim().chars().take(500).collect())
        }
        _ => None,
    };
    message.unwrap_or_else(|| status_text(status))
}

fn legacy_message(payload: &Value) -> Option<String> {
    let title = payload.get("title").and_then(Value::as_str);
    let detail = payload.get("detail").and_then(Value::as_str);
    match (title, detail) {
        (Some(title), Some(detail)) => Some(format!("{title}: {detail}")),
        (Some(message), None) | (None, Some(message)) => Some(message.to_string()),
        (None, None) => current_message(payload),
    }
}

fn current_message(payload: &Value) -> Option<String> {
    match payload.get("detail")? {
        Value::String(detail) => Some(detail.clone()),
        Value::Array(errors) => {
            let messages: Vec<String> = errors
                .iter()
                .map(|e| {
                    let msg = e.get("msg").and_then(Value::as_str).unwrap_or("invalid value");
                    match e.get("loc").and_then(Value::as_array) {
                        Some(loc) => {
                            let loc: Vec<String> = loc
                                .iter()
                                .map(|part| part.as_str().map_or_else(|| part.to_string(), str::to_string))
                                .collect();
                            format!("{}: {msg}", loc.join("."))
                        }
                        None => msg.to_string(),
                    }
                })
                .collect();
            Some(messages.join("; "))
        }
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn status_text(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map_or_else(|| format!("HTTP {status}"), str::to_string)
}
