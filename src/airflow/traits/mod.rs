pub mod asset;
pub mod connection;
pub mod dag;
pub mod dagrun;
pub mod server;
pub mod taskinstance;
pub mod variable;

pub use asset::AssetOperations;
pub use connection::ConnectionOperations;
pub use dag::DagOperations;
pub use dagrun::{DagRunOperations, ALL_DAGS};
pub use server::ServerOperations;
pub use taskinstance::TaskInstanceOperations;
pub use variable::VariableOperations;

use crate::airflow::config::AirflowVersion;

/// Super-trait combining all Airflow API operations.
/// Implemented once per REST API generation (v1 for Airflow 2, v2 for Airflow 3)
/// so callers never branch on the server version.
pub trait AirflowAdapter:
    DagOperations
    + DagRunOperations
    + TaskInstanceOperations
    + AssetOperations
    + ConnectionOperations
    + VariableOperations
    + ServerOperations
{
    /// The Airflow version this adapter is bound to
    fn version(&self) -> AirflowVersion;
}
