use async_trait::async_trait;

use crate::airflow::error::AdapterResult;
use crate::airflow::model::common::{Asset, Collection, Page};

#[async_trait]
pub trait AssetOperations: Send + Sync {
    /// Assets under the `assets` key, each exposing `scheduled_dags`.
    async fn list_assets(&self, page: Page) -> AdapterResult<Collection<Asset>>;
}
