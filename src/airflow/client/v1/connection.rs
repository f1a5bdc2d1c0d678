use async_trait::async_trait;
use log::debug;

use crate::airflow::error::AdapterResult;
use crate::airflow::model::common::connection::CONNECTIONS_KEY;
use crate::airflow::model::common::{Collection, Connection, Page};
use crate::airflow::traits::ConnectionOperations;

use super::V1Adapter;

#[async_trait]
impl ConnectionOperations for V1Adapter {
    async fn list_connections(&self, page: Page) -> AdapterResult<Collection<Connection>> {
        let connections: Collection<Connection> = self
            .api
            .get_collection("connections", CONNECTIONS_KEY, page.to_query())
            .await?;
        debug!("Fetched {} connections", connections.len());
        Ok(connections.map(CONNECTIONS_KEY, Connection::redacted))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::scripted_adapter;
    use super::*;
    use crate::airflow::model::common::connection::REDACTED;
    use serde_json::json;

    #[tokio::test]
    async fn test_passwords_are_redacted() {
        let (transport, adapter) = scripted_adapter();
        transport.push_json(
            200,
            json!({"connections": [
                {"connection_id": "warehouse", "conn_type": "postgres", "password": "pg-pass"},
                {"connection_id": "http_default", "conn_type": "http"}
            ], "total_entries": 2}),
        );

        let connections = adapter.list_connections(Page::default()).await.unwrap();
        assert_eq!(connections.items[0].password.as_deref(), Some(REDACTED));
        assert_eq!(connections.items[1].password, None);
        assert!(!serde_json::to_string(&connections).unwrap().contains("pg-pass"));
    }
}
