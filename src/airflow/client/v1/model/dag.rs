use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Legacy DAG response. `file_token` is how the legacy API addresses a
/// DAG's source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DagResponse {
    pub dag_id: String,
    #[serde(default)]
    pub is_paused: Option<bool>,
    #[serde(default)]
    pub file_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
