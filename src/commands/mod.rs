pub mod call;
pub mod servers;
pub mod version;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use log::{info, LevelFilter};
use simplelog::{Config, WriteLogger};

use airflow_bridge::airflow::client::create_adapter;
use airflow_bridge::airflow::config::{AirflowConfig, BridgeConfig};
use airflow_bridge::airflow::traits::AirflowAdapter;

/// Config file and server selection shared by every command.
#[derive(Parser, Debug, Clone)]
pub struct ServerArgs {
    /// Config file to read instead of the default location
    #[clap(short, long)]
    pub file: Option<PathBuf>,
    /// Server name from the config file (defaults to `active_server`)
    #[clap(short, long)]
    pub server: Option<String>,
}

impl ServerArgs {
    pub fn config(&self) -> Result<BridgeConfig> {
        BridgeConfig::from_file(self.file.as_deref())
    }

    pub fn target(&self) -> Result<AirflowConfig> {
        self.config()?.select_server(self.server.as_deref())
    }

    pub async fn adapter(&self) -> Result<Arc<dyn AirflowAdapter>> {
        let target = self.target()?;
        info!("Connecting to '{}' at {}", target.name, target.endpoint);
        Ok(create_adapter(&target).await?)
    }
}

pub fn setup_logging(log_level: &str) -> Result<()> {
    let log_dir = crate::get_state_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file_path = log_dir.join(format!(
        "airflow-bridge-{}.log",
        chrono::Local::now().format("%Y%m%d%H%M%S")
    ));

    let log_level = match log_level.to_lowercase().as_str() {
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    };

    WriteLogger::init(log_level, Config::default(), File::create(&log_file_path)?)?;
    info!("Logging to: {}", log_file_path.display());
    Ok(())
}
