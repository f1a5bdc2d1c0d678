use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const VARIABLES_KEY: &str = "variables";
pub const POOLS_KEY: &str = "pools";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
