use async_trait::async_trait;

use crate::airflow::error::AdapterResult;
use crate::airflow::model::common::asset::ASSETS_KEY;
use crate::airflow::model::common::{Asset, Collection, Page};
use crate::airflow::traits::AssetOperations;

use super::V2Adapter;

#[async_trait]
impl AssetOperations for V2Adapter {
    async fn list_assets(&self, page: Page) -> AdapterResult<Collection<Asset>> {
        self.api
            .get_collection(&Self::endpoint("assets"), ASSETS_KEY, page.to_query())
            .await
    }
}
