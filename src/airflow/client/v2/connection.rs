use async_trait::async_trait;
use log::debug;

use crate::airflow::error::AdapterResult;
use crate::airflow::model::common::connection::CONNECTIONS_KEY;
use crate::airflow::model::common::{Collection, Connection, Page};
use crate::airflow::traits::ConnectionOperations;

use super::V2Adapter;

#[async_trait]
impl ConnectionOperations for V2Adapter {
    async fn list_connections(&self, page: Page) -> AdapterResult<Collection<Connection>> {
        let connections: Collection<Connection> = self
            .api
            .get_collection(&Self::endpoint("connections"), CONNECTIONS_KEY, page.to_query())
            .await?;
        debug!("Fetched {} connections", connections.len());
        Ok(connections.map(CONNECTIONS_KEY, Connection::redacted))
    }
}
