use async_trait::async_trait;

use crate::airflow::error::AdapterResult;
use crate::airflow::model::common::{Collection, Connection, Page};

#[async_trait]
pub trait ConnectionOperations: Send + Sync {
    /// Passwords are always replaced by the redaction marker.
    async fn list_connections(&self, page: Page) -> AdapterResult<Collection<Connection>>;
}
