use async_trait::async_trait;
use serde_json::Value;

use crate::airflow::error::AdapterResult;
use crate::airflow::model::common::{Capability, Collection, ImportError, Page};

/// Server-level information: configuration, version, health and statistics.
#[async_trait]
pub trait ServerOperations: Send + Sync {
    /// Always an object; plain-text configurations are wrapped as `{"config": <text>}`.
    async fn get_config(&self) -> AdapterResult<Value>;
    async fn get_version(&self) -> AdapterResult<Value>;
    async fn get_health(&self) -> AdapterResult<Value>;
    async fn get_dag_stats(&self, dag_ids: &[String]) -> AdapterResult<Capability<Value>>;
    async fn list_import_errors(&self, page: Page) -> AdapterResult<Collection<ImportError>>;
}
