use async_trait::async_trait;
use serde_json::Value;

use crate::airflow::error::AdapterResult;
use crate::airflow::model::common::{Collection, Page, TaskInstance};

#[async_trait]
pub trait TaskInstanceOperations: Send + Sync {
    async fn list_task_instances(
        &self,
        dag_id: &str,
        dag_run_id: &str,
        page: Page,
    ) -> AdapterResult<Collection<TaskInstance>>;

    async fn get_task_instance(
        &self,
        dag_id: &str,
        dag_run_id: &str,
        task_id: &str,
    ) -> AdapterResult<Option<TaskInstance>>;

    /// Task definitions of a DAG (not instances).
    async fn list_tasks(&self, dag_id: &str) -> AdapterResult<Collection<Value>>;
}
