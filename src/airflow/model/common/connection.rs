use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const CONNECTIONS_KEY: &str = "connections";
/// Replaces every stored password before a connection leaves the adapter.
pub const REDACTED: &str = "***REDACTED***";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub connection_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Connection {
    #[must_use]
    pub fn redacted(mut self) -> Self {
        if self.password.is_some() {
            self.password = Some(REDACTED.to_string());
        }
        self
    }
}
