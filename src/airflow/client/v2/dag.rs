use async_trait::async_trait;
use serde_json::json;

use crate::airflow::client::base::HttpRequest;
use crate::airflow::error::AdapterResult;
use crate::airflow::model::common::dag::DAGS_KEY;
use crate::airflow::model::common::{decode, Collection, Dag, DagSource, Page};
use crate::airflow::traits::DagOperations;

use super::model::dag::{DagResponse, DagSourceResponse};
use super::V2Adapter;

#[async_trait]
impl DagOperations for V2Adapter {
    async fn list_dags(&self, page: Page) -> AdapterResult<Collection<Dag>> {
        let mut query = page.to_query();
        query.push(("order_by".to_string(), "dag_id".to_string()));
        let dags: Collection<DagResponse> = self
            .api
            .get_collection(&Self::endpoint("dags"), DAGS_KEY, query)
            .await?;
        Ok(dags.map(DAGS_KEY, Dag::from))
    }

    async fn get_dag(&self, dag_id: &str) -> AdapterResult<Option<Dag>> {
        let dag = self
            .api
            .get_optional(&Self::endpoint(&format!("dags/{dag_id}")))
            .await?;
        Ok(dag.map(decode::<DagResponse>).transpose()?.map(Dag::from))
    }

    async fn get_dag_source(&self, dag_id: &str) -> AdapterResult<Option<DagSource>> {
        let source = self
            .api
            .get_optional(&Self::endpoint(&format!("dagSources/{dag_id}")))
            .await?;
        let Some(source) = source else {
            return Ok(None);
        };
        let source: DagSourceResponse = decode(source)?;
        Ok(Some(DagSource {
            dag_id: dag_id.to_string(),
            content: source.content,
        }))
    }

    async fn pause_dag(&self, dag_id: &str, is_paused: bool) -> AdapterResult<Dag> {
        let request = HttpRequest::patch(
            Self::endpoint(&format!("dags/{dag_id}")),
            json!({"is_paused": is_paused}),
        );
        match self.api.request_json(request).await? {
            Some(dag) => Ok(Dag::from(decode::<DagResponse>(dag)?)),
            None => Ok(Dag::paused(dag_id, is_paused)),
        }
    }
}
