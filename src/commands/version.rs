use anyhow::Result;
use clap::Parser;

use airflow_bridge::airflow::client::base::ReqwestTransport;
use airflow_bridge::airflow::version::detect_version;

use super::ServerArgs;

/// Probes the selected server and prints the detected version as JSON.
#[derive(Parser, Debug)]
pub struct VersionCommand {
    #[clap(flatten)]
    pub server: ServerArgs,
}

impl VersionCommand {
    pub async fn run(&self) -> Result<()> {
        let target = self.server.target()?;
        let proxy = target.resolved_proxy()?;
        let transport = ReqwestTransport::new(&target.resolved_endpoint()?, proxy.as_deref())?;
        let info = detect_version(&transport, &target.credentials()?).await?;
        println!("{}", serde_json::to_string_pretty(&info)?);
        Ok(())
    }
}
