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

/// API v2 adapter (Airflow 3). Its endpoints carry their own `api/v2`
/// prefix, so it is bound to the unmodified server root.
#[derive(Debug, Clone)]
pub struct V2Adapter {
    api: ApiClient,
}

impl V2Adapter {
    pub const API_PREFIX: &'static str = "api/v2";

    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn endpoint(path: &str) -> String {
        format!("{}/{path}", Self::API_PREFIX)
    }
}

impl AirflowAdapter for V2Adapter {
    fn version(&self) -> AirflowVersion {
        AirflowVersion::V3
    }
}
