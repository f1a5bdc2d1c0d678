pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod traits;
pub mod version;
