use async_trait::async_trait;
use serde_json::{json, Value};

use crate::airflow::error::AdapterResult;
use crate::airflow::model::common::importerror::IMPORT_ERRORS_KEY;
use crate::airflow::model::common::{Capability, Collection, ImportError, Page};
use crate::airflow::traits::ServerOperations;

use super::V1Adapter;

#[async_trait]
impl ServerOperations for V1Adapter {
    async fn get_config(&self) -> AdapterResult<Value> {
        // Served as plain text (ini), never JSON
        let text = self.api.get_text("config").await?;
        Ok(json!({ "config": text }))
    }

    async fn get_version(&self) -> AdapterResult<Value> {
        self.api.get_json("version", Vec::new()).await
    }

    async fn get_health(&self) -> AdapterResult<Value> {
        self.api.get_json("health", Vec::new()).await
    }

    async fn get_dag_stats(&self, _dag_ids: &[String]) -> AdapterResult<Capability<Value>> {
        Ok(Capability::unsupported(
            "get_dag_stats",
            "list_dag_runs",
            "Airflow 2 (REST API v1)",
        ))
    }

    async fn list_import_errors(&self, page: Page) -> AdapterResult<Collection<ImportError>> {
        self.api
            .get_collection("importErrors", IMPORT_ERRORS_KEY, page.to_query())
            .await
    }
}
