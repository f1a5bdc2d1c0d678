use async_trait::async_trait;

use crate::airflow::error::AdapterResult;
use crate::airflow::model::common::{Collection, Page, Pool, Variable};

#[async_trait]
pub trait VariableOperations: Send + Sync {
    async fn list_variables(&self, page: Page) -> AdapterResult<Collection<Variable>>;
    async fn get_variable(&self, key: &str) -> AdapterResult<Option<Variable>>;
    async fn list_pools(&self, page: Page) -> AdapterResult<Collection<Pool>>;
}
