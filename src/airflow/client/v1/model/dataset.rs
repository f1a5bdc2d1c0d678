use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DATASETS_KEY: &str = "datasets";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetResponse {
    #[serde(default)]
    pub consuming_dags: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
