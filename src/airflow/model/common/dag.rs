use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::airflow::client::{v1, v2};

pub const DAGS_KEY: &str = "dags";

/// Common DAG model. Only the fields the adapters act on are typed; the rest
/// of the server's payload is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dag {
    pub dag_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_paused: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dag {
    /// Stand-in for a pause toggle answered with an empty body.
    pub fn paused(dag_id: &str, is_paused: bool) -> Self {
        Dag {
            dag_id: dag_id.to_string(),
            is_paused: Some(is_paused),
            extra: Map::new(),
        }
    }
}

// The legacy file token stays visible to callers
impl From<v1::model::dag::DagResponse> for Dag {
    fn from(value: v1::model::dag::DagResponse) -> Self {
        let mut extra = value.extra;
        if let Some(file_token) = value.file_token {
            extra.insert("file_token".to_string(), Value::String(file_token));
        }
        Dag {
            dag_id: value.dag_id,
            is_paused: value.is_paused,
            extra,
        }
    }
}

impl From<v2::model::dag::DagResponse> for Dag {
    fn from(value: v2::model::dag::DagResponse) -> Self {
        Dag {
            dag_id: value.dag_id,
            is_paused: value.is_paused,
            extra: value.extra,
        }
    }
}

/// Source file contents of a DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DagSource {
    pub dag_id: String,
    pub content: String,
}
