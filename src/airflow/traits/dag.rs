use async_trait::async_trait;

use crate::airflow::error::AdapterResult;
use crate::airflow::model::common::{Collection, Dag, DagSource, Page};

/// Trait for DAG operations
#[async_trait]
pub trait DagOperations: Send + Sync {
    async fn list_dags(&self, page: Page) -> AdapterResult<Collection<Dag>>;

    /// `None` when the DAG does not exist.
    async fn get_dag(&self, dag_id: &str) -> AdapterResult<Option<Dag>>;

    /// Get DAG source code (via the `file_token` on the legacy API, by `dag_id` on the current one)
    async fn get_dag_source(&self, dag_id: &str) -> AdapterResult<Option<DagSource>>;

    async fn pause_dag(&self, dag_id: &str, is_paused: bool) -> AdapterResult<Dag>;
}
