use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;

use airflow_bridge::tools::{ToolRegistry, TOOL_NAMES};

use super::ServerArgs;

#[derive(Parser, Debug)]
pub struct CallCommand {
    /// Tool name, see `airflow-bridge tools`
    pub tool: String,
    /// Tool arguments as a JSON object
    #[clap(short, long, default_value = "{}")]
    pub args: String,
    #[clap(flatten)]
    pub server: ServerArgs,
}

impl CallCommand {
    pub async fn run(&self) -> Result<()> {
        let args: Value = serde_json::from_str(&self.args)
            .with_context(|| format!("--args is not valid JSON: {}", self.args))?;
        anyhow::ensure!(args.is_object(), "--args must be a JSON object");

        let tools = ToolRegistry::new(self.server.adapter().await?);
        println!("{}", tools.call(&self.tool, &args).await);
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct ToolsCommand {}

impl ToolsCommand {
    pub fn run(&self) {
        for name in TOOL_NAMES {
            println!("{name}");
        }
    }
}
