use async_trait::async_trait;
use serde_json::Value;

use crate::airflow::error::AdapterResult;
use crate::airflow::model::common::{Collection, DagRun, Page};

/// Path segment meaning "all DAGs" in run listing endpoints.
pub const ALL_DAGS: &str = "~";

/// Trait for DAG Run operations
#[async_trait]
pub trait DagRunOperations: Send + Sync {
    /// List DAG runs for `dag_id`; pass [`ALL_DAGS`] to list across every DAG.
    async fn list_dag_runs(&self, dag_id: &str, page: Page) -> AdapterResult<Collection<DagRun>>;

    async fn get_dag_run(&self, dag_id: &str, dag_run_id: &str) -> AdapterResult<Option<DagRun>>;

    /// Trigger a new DAG run and return the created run as reported by the server.
    async fn trigger_dag_run(&self, dag_id: &str, conf: Option<Value>) -> AdapterResult<Value>;
}
