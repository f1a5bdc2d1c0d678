use async_trait::async_trait;
use log::debug;
use serde_json::{json, Value};

use crate::airflow::client::base::HttpRequest;
use crate::airflow::error::AdapterResult;
use crate::airflow::model::common::{decode, Collection, DagRun, Page};
use crate::airflow::traits::DagRunOperations;

use super::V2Adapter;

#[async_trait]
impl DagRunOperations for V2Adapter {
    async fn list_dag_runs(&self, dag_id: &str, page: Page) -> AdapterResult<Collection<DagRun>> {
        let mut query = page.to_query();
        query.push(("order_by".to_string(), "-start_date".to_string()));
        self.api
            .get_collection(
                &Self::endpoint(&format!("dags/{dag_id}/dagRuns")),
                "dag_runs",
                query,
            )
            .await
    }

    async fn get_dag_run(&self, dag_id: &str, dag_run_id: &str) -> AdapterResult<Option<DagRun>> {
        self.api
            .get_optional(&Self::endpoint(&format!("dags/{dag_id}/dagRuns/{dag_run_id}")))
            .await?
            .map(decode)
            .transpose()
    }

    async fn trigger_dag_run(&self, dag_id: &str, conf: Option<Value>) -> AdapterResult<Value> {
        // logical_date is required by the v2 API, null means "now"
        let body = json!({
            "logical_date": Value::Null,
            "conf": conf.unwrap_or_else(|| json!({})),
        });
        let run = self
            .api
            .request_json(HttpRequest::post(
                Self::endpoint(&format!("dags/{dag_id}/dagRuns")),
                body,
            ))
            .await?;
        debug!("Triggered {dag_id}: {run:?}");
        Ok(run.unwrap_or_else(|| json!({})))
    }
}
