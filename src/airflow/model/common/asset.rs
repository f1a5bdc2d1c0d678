use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::airflow::client::v1;

pub const ASSETS_KEY: &str = "assets";

/// Asset (called "dataset" by the legacy API), always exposing the DAGs
/// it schedules as `scheduled_dags`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(default)]
    pub scheduled_dags: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// Legacy datasets: `consuming_dags` becomes `scheduled_dags`
impl From<v1::model::dataset::DatasetResponse> for Asset {
    fn from(value: v1::model::dataset::DatasetResponse) -> Self {
        Asset {
            scheduled_dags: value.consuming_dags,
            extra: value.extra,
        }
    }
}
