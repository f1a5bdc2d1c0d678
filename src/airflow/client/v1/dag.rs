use async_trait::async_trait;
use log::debug;
use serde_json::json;

use crate::airflow::client::base::HttpRequest;
use crate::airflow::error::{AdapterError, AdapterResult};
use crate::airflow::model::common::dag::DAGS_KEY;
use crate::airflow::model::common::{decode, Collection, Dag, DagSource, Page};
use crate::airflow::traits::DagOperations;

use super::model::dag::DagResponse;
use super::V1Adapter;

impl V1Adapter {
    async fn get_dag_response(&self, dag_id: &str) -> AdapterResult<Option<DagResponse>> {
        self.api
            .get_optional(&format!("dags/{dag_id}"))
            .await?
            .map(decode)
            .transpose()
    }
}

#[async_trait]
impl DagOperations for V1Adapter {
    async fn list_dags(&self, page: Page) -> AdapterResult<Collection<Dag>> {
        let mut query = page.to_query();
        query.push(("order_by".to_string(), "dag_id".to_string()));
        let dags: Collection<DagResponse> = self.api.get_collection("dags", DAGS_KEY, query).await?;
        debug!(
            "Fetched {} DAGs at offset {}, total in system: {}",
            dags.len(),
            page.offset,
            dags.total_entries
        );
        Ok(dags.map(DAGS_KEY, Dag::from))
    }

    async fn get_dag(&self, dag_id: &str) -> AdapterResult<Option<Dag>> {
        Ok(self.get_dag_response(dag_id).await?.map(Dag::from))
    }

    async fn get_dag_source(&self, dag_id: &str) -> AdapterResult<Option<DagSource>> {
        // The legacy API serves sources by an opaque file token found on the DAG
        let Some(dag) = self.get_dag_response(dag_id).await? else {
            return Ok(None);
        };
        let file_token = dag
            .file_token
            .ok_or_else(|| AdapterError::decode(format!("DAG '{dag_id}' has no file_token")))?;
        match self.api.get_text(&format!("dagSources/{file_token}")).await {
            Ok(content) => Ok(Some(DagSource {
                dag_id: dag_id.to_string(),
                content,
            })),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn pause_dag(&self, dag_id: &str, is_paused: bool) -> AdapterResult<Dag> {
        let request = HttpRequest::patch(format!("dags/{dag_id}"), json!({"is_paused": is_paused}))
            .query([("update_mask", "is_paused")]);
        match self.api.request_json(request).await? {
            Some(dag) => Ok(Dag::from(decode::<DagResponse>(dag)?)),
            None => Ok(Dag::paused(dag_id, is_paused)),
        }
    }
}
