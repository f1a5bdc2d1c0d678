use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const IMPORT_ERRORS_KEY: &str = "import_errors";

/// A DAG file the scheduler failed to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_error_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
