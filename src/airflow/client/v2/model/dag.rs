use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DagResponse {
    pub dag_id: String,
    #[serde(default)]
    pub is_paused: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /api/v2/dagSources/{dag_id}` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DagSourceResponse {
    pub content: String,
    #[serde(default)]
    pub version_number: Option<i64>,
}
