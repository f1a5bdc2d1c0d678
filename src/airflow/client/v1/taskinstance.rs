use async_trait::async_trait;
use log::debug;
use serde_json::Value;

use crate::airflow::error::AdapterResult;
use crate::airflow::model::common::{decode, Collection, Page, TaskInstance};
use crate::airflow::traits::TaskInstanceOperations;

use super::V1Adapter;

#[async_trait]
impl TaskInstanceOperations for V1Adapter {
    async fn list_task_instances(
        &self,
        dag_id: &str,
        dag_run_id: &str,
        page: Page,
    ) -> AdapterResult<Collection<TaskInstance>> {
        let task_instances: Collection<TaskInstance> = self
            .api
            .get_collection(
                &format!("dags/{dag_id}/dagRuns/{dag_run_id}/taskInstances"),
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
            .get_optional(&format!(
                "dags/{dag_id}/dagRuns/{dag_run_id}/taskInstances/{task_id}"
            ))
            .await?
            .map(decode)
            .transpose()
    }

    async fn list_tasks(&self, dag_id: &str) -> AdapterResult<Collection<Value>> {
        self.api
            .get_collection(&format!("dags/{dag_id}/tasks"), "tasks", Vec::new())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::scripted_adapter;
    use super::*;
    use crate::airflow::model::common::RunState;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_task_instances() {
        let (transport, adapter) = scripted_adapter();
        transport.push_json(
            200,
            json!({
                "task_instances": [{"task_id": "extract", "state": "failed", "try_number": 2}],
                "total_entries": 1
            }),
        );

        let instances = adapter
            .list_task_instances("etl", "manual__1", Page::new(50, 100))
            .await
            .unwrap();
        assert_eq!(instances.items[0].state, Some(RunState::Failed));
        assert_eq!(
            transport.calls(),
            vec!["GET api/v1/dags/etl/dagRuns/manual__1/taskInstances"]
        );
        assert_eq!(transport.requests()[0].query, Page::new(50, 100).to_query());
    }

    #[tokio::test]
    async fn test_get_task_instance_not_found_is_none() {
        let (transport, adapter) = scripted_adapter();
        transport.push_json(404, json!({"title": "Task instance not found", "status": 404}));

        let instance = adapter
            .get_task_instance("etl", "manual__1", "load")
            .await
            .unwrap();
        assert_eq!(instance, None);
        assert_eq!(
            transport.calls(),
            vec!["GET api/v1/dags/etl/dagRuns/manual__1/taskInstances/load"]
        );
    }

    #[tokio::test]
    async fn test_list_tasks() {
        let (transport, adapter) = scripted_adapter();
        transport.push_json(200, json!({"tasks": [{"task_id": "extract"}, {"task_id": "load"}]}));

        let tasks = adapter.list_tasks("etl").await.unwrap();
        assert_eq!(tasks.total_entries, 2);
        assert_eq!(transport.calls(), vec!["GET api/v1/dags/etl/tasks"]);
    }
}
