use async_trait::async_trait;
use log::debug;
use serde_json::{json, Value};

use crate::airflow::client::base::HttpRequest;
use crate::airflow::error::AdapterResult;
use crate::airflow::model::common::{decode, Collection, DagRun, Page};
use crate::airflow::traits::DagRunOperations;

use super::V1Adapter;

#[async_trait]
impl DagRunOperations for V1Adapter {
    async fn list_dag_runs(&self, dag_id: &str, page: Page) -> AdapterResult<Collection<DagRun>> {
        let mut query = page.to_query();
        query.push(("order_by".to_string(), "-execution_date".to_string()));
        self.api
            .get_collection(&format!("dags/{dag_id}/dagRuns"), "dag_runs", query)
            .await
    }

    async fn get_dag_run(&self, dag_id: &str, dag_run_id: &str) -> AdapterResult<Option<DagRun>> {
        self.api
            .get_optional(&format!("dags/{dag_id}/dagRuns/{dag_run_id}"))
            .await?
            .map(decode)
            .transpose()
    }

    async fn trigger_dag_run(&self, dag_id: &str, conf: Option<Value>) -> AdapterResult<Value> {
        // The v1 API rejects an explicit null logical_date, so leave it out
        let body = match conf {
            Some(conf) => json!({ "conf": conf }),
            None => json!({}),
        };
        let run = self
            .api
            .request_json(HttpRequest::post(format!("dags/{dag_id}/dagRuns"), body))
            .await?;
        debug!("Triggered {dag_id}: {run:?}");
        Ok(run.unwrap_or_else(|| json!({})))
    }
}
