use async_trait::async_trait;

use crate::airflow::error::AdapterResult;
use crate::airflow::model::common::asset::ASSETS_KEY;
use crate::airflow::model::common::{Asset, Collection, Page};
use crate::airflow::traits::AssetOperations;

use super::model::dataset::{DatasetResponse, DATASETS_KEY};
use super::V1Adapter;

#[async_trait]
impl AssetOperations for V1Adapter {
    async fn list_assets(&self, page: Page) -> AdapterResult<Collection<Asset>> {
        let datasets: Collection<DatasetResponse> = self
            .api
            .get_collection("datasets", DATASETS_KEY, page.to_query())
            .await?;
        Ok(datasets.map(ASSETS_KEY, Asset::from))
    }
}
