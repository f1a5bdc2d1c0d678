use async_trait::async_trait;
use serde_json::{json, Value};

use crate::airflow::client::base::{HttpRequest, ResponseBody};
use crate::airflow::error::AdapterResult;
use crate::airflow::model::common::importerror::IMPORT_ERRORS_KEY;
use crate::airflow::model::common::{Capability, Collection, ImportError, Page};
use crate::airflow::traits::ServerOperations;

use super::V2Adapter;

#[async_trait]
impl ServerOperations for V2Adapter {
    async fn get_config(&self) -> AdapterResult<Value> {
        let response = self
            .api
            .execute(HttpRequest::get(Self::endpoint("config")), None)
            .await?;
        Ok(match response.body {
            ResponseBody::Json(Value::Object(config)) => Value::Object(config),
            ResponseBody::Json(other) => json!({ "config": other.to_string() }),
            ResponseBody::Text(text) => json!({ "config": text }),
            ResponseBody::Empty => json!({ "config": "" }),
        })
    }

    async fn get_version(&self) -> AdapterResult<Value> {
        self.api.get_json(&Self::endpoint("version"), Vec::new()).await
    }

    async fn get_health(&self) -> AdapterResult<Value> {
        self.api
            .get_json(&Self::endpoint("monitor/health"), Vec::new())
            .await
    }

    async fn get_dag_stats(&self, dag_ids: &[String]) -> AdapterResult<Capability<Value>> {
        let query = dag_ids
            .iter()
            .map(|dag_id| ("dag_ids".to_string(), dag_id.clone()))
            .collect();
        let stats = self.api.get_json(&Self::endpoint("dagStats"), query).await?;
        Ok(Capability::Supported(stats))
    }

    async fn list_import_errors(&self, page: Page) -> AdapterResult<Collection<ImportError>> {
        self.api
            .get_collection(&Self::endpoint("importErrors"), IMPORT_ERRORS_KEY, page.to_query())
            .await
    }
}
