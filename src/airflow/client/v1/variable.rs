use async_trait::async_trait;
use log::debug;

use crate::airflow::error::AdapterResult;
use crate::airflow::model::common::variable::{POOLS_KEY, VARIABLES_KEY};
use crate::airflow::model::common::{decode, Collection, Page, Pool, Variable};
use crate::airflow::traits::VariableOperations;

use super::V1Adapter;

#[async_trait]
impl VariableOperations for V1Adapter {
    async fn list_variables(&self, page: Page) -> AdapterResult<Collection<Variable>> {
        let variables: Collection<Variable> = self
            .api
            .get_collection("variables", VARIABLES_KEY, page.to_query())
            .await?;
        debug!("Fetched {} variables", variables.len());
        Ok(variables)
    }

    async fn get_variable(&self, key: &str) -> AdapterResult<Option<Variable>> {
        debug!("get_variable called for key: {key}");
        self.api
            .get_optional(&format!("variables/{key}"))
            .await?
            .map(decode)
            .transpose()
    }

    async fn list_pools(&self, page: Page) -> AdapterResult<Collection<Pool>> {
        self.api
            .get_collection("pools", POOLS_KEY, page.to_query())
            .await
    }
}
