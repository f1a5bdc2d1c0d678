use async_trait::async_trait;
use log::debug;
use serde_json::Value;

use crate::airflow::error::AdapterResult;
use crate::airflow::model::common::{decode, Collection, Page, TaskInstance};
use crate::airflow::traits::TaskInstanceOperations;

use super::V2Adapter;

#[async_trait]
impl TaskInstanceOperations for V2Adapter {
    async fn list_task_instances(
        &self,
        dag_id: &str,
        dag_run_id: &str,
        page: Page,
    ) -> AdapterResult<Collection<TaskInstance>> {
        let task_instances: Collection<TaskInstance> = self
            .api
            .get_collection(
                &Self::endpoint(&format!("dags/{dag_id}/dagRuns/{dag_run_id}/taskInstances")),
                "task_instances",
                page.to_query(),
            )
            .await?;
        debug!(
            "Fetched {} task instances, offset: {}, total: {}",
            task_instances.len(),
            page.offset,
            task_instances.total_entries
        );
        Ok(task_instances)
    }

    async fn get_task_instance(
        &self,
        dag_id: &str,
        dag_run_id: &str,
        task_id: &str,
    ) -> AdapterResult<Option<TaskInstance>> {
        self.api
            .get_optional(&Self::endpoint(&format!(
                "dags/{dag_id}/dagRuns/{dag_run_id}/taskInstances/{task_id}"
            )))
            .await?
            .map(decode)
            .transpose()
    }

    async fn list_tasks(&self, dag_id: &str) -> AdapterResult<Collection<Value>> {
        self.api
            .get_collection(&Self::endpoint(&format!("dags/{dag_id}/tasks")), "tasks", Vec::new())
            .await
    }
}
