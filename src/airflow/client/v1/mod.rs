pub mod model;

mod asset;
mod connection;
mod dag;
mod dagrun;
mod server;
mod taskinstance;
mod variable;

use super::auth::ApiClient;
use crate::airflow::{config::AirflowVersion, traits::AirflowAdapter};

/// API v1 adapter (Airflow 2). Its transport is already rooted at `/api/v1`,
/// so endpoints here are relative to that prefix.
#[derive(Debug, Clone)]
pub struct V1Adapter {
    api: ApiClient,
}

impl V1Adapter {
    pub const API_PREFIX: &'static str = "api/v1";

    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl AirflowAdapter for V1Adapter {
    fn version(&self) -> AirflowVersion {
        AirflowVersion::V2
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::airflow::client::{auth::AuthStrategy, base::PrefixedTransport, testing::ScriptedTransport};
    use crate::airflow::config::BasicAuth;

    /// Adapter wired like the factory does, over a scripted root transport.
    pub(crate) fn scripted_adapter() -> (Arc<ScriptedTransport>, V1Adapter) {
        let transport = Arc::new(ScriptedTransport::new());
        let prefixed = Arc::new(PrefixedTransport::new(transport.clone(), V1Adapter::API_PREFIX));
        let api = ApiClient::new(
            prefixed,
            AuthStrategy::Basic(BasicAuth {
                username: "airflow".to_string(),
                password: "airflow".to_string(),
            }),
            AirflowVersion::V2,
        );
        (transport, V1Adapter::new(api))
    }
}
