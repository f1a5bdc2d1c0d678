use async_trait::async_trait;
use log::debug;

use crate::airflow::error::AdapterResult;
use crate::airflow::model::common::variable::{POOLS_KEY, VARIABLES_KEY};
use crate::airflow::model::common::{decode, Collection, Page, Pool, Variable};
use crate::airflow::traits::VariableOperations;

use super::V2Adapter;

#[async_trait]
impl VariableOperations for V2Adapter {
    async fn list_variables(&self, page: Page) -> AdapterResult<Collection<Variable>> {
        let variables: Collection<Variable> = self
            .api
            .get_collection(&Self::endpoint("variables"), VARIABLES_KEY, page.to_query())
            .await?;
        debug!("Fetched {} variables", variables.len());
        Ok(variables)
    }

    async fn get_variable(&self, key: &str) -> AdapterResult<Option<Variable>> {
        self.api
            .get_optional(&Self::endpoint(&format!("variables/{key}")))
            .await?
            .map(decode)
            .transpose()
    }

    async fn list_pools(&self, page: Page) -> AdapterResult<Collection<Pool>> {
        self.api
            .get_collection(&Self::endpoint("pools"), POOLS_KEY, page.to_query())
            .await
    }
}
