use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use dirs::{home_dir, state_dir};

mod commands;

use commands::call::{CallCommand, ToolsCommand};
use commands::servers::ServersCommand;
use commands::version::VersionCommand;

/// State directory for logs (`~/.local/state/airflow-bridge`).
pub fn get_state_dir() -> PathBuf {
    state_dir()
        .or_else(|| home_dir().map(|home| home.join(".local").join("state")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("airflow-bridge")
}

#[derive(Parser)]
#[clap(name = "airflow-bridge", bin_name = "airflow-bridge", version, about)]
struct BridgeApp {
    #[clap(subcommand)]
    command: BridgeCommand,
}

#[derive(Parser)]
enum BridgeCommand {
    /// List the available tool names
    Tools(ToolsCommand),
    /// Call one tool against the selected server and print its JSON result
    Call(CallCommand),
    /// Detect the selected server's Airflow version
    Version(VersionCommand),
    /// List configured servers
    #[clap(alias = "ls")]
    Servers(ServersCommand),
}

impl BridgeApp {
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            BridgeCommand::Tools(cmd) => {
                cmd.run();
                Ok(())
            }
            BridgeCommand::Call(cmd) => cmd.run().await,
            BridgeCommand::Version(cmd) => cmd.run().await,
            BridgeCommand::Servers(cmd) => cmd.run(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Ok(log_level) = std::env::var("AIRFLOW_BRIDGE_LOG") {
        commands::setup_logging(&log_level)?;
    }

    let app = BridgeApp::parse();
    app.run().await
}
