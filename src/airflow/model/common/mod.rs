pub mod asset;
pub mod capability;
pub mod collection;
pub mod connection;
pub mod dag;
pub mod dagrun;
pub mod importerror;
pub mod problem;
pub mod taskinstance;
pub mod variable;

// Re-export common types for easier access
pub use asset::Asset;
pub use capability::{Capability, Unsupported};
pub use collection::{Collection, Page};
pub use connection::Connection;
pub use dag::{Dag, DagSource};
pub use dagrun::{DagRun, RunState};
pub use importerror::ImportError;
pub use taskinstance::TaskInstance;
pub use variable::{Pool, Variable};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::airflow::error::{AdapterError, AdapterResult};

/// Deserializes a JSON body into a model, logging the body on failure.
pub fn decode<T: DeserializeOwned>(value: Value) -> AdapterResult<T> {
    serde_json::from_value::<T>(value.clone()).map_err(|e| {
        log::error!("Failed to decode response. Error: {e}");
        log::error!(
            "Response body (first 500 chars): {}",
            value.to_string().chars().take(500).collect::<String>()
        );
        AdapterError::decode(e.to_string())
    })
}
