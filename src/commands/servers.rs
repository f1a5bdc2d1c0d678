use anyhow::Result;
use clap::Parser;

use super::ServerArgs;

/// Lists the servers in the config file, marking the active one.
#[derive(Parser, Debug)]
pub struct ServersCommand {
    #[clap(flatten)]
    pub server: ServerArgs,
}

impl ServersCommand {
    pub fn run(&self) -> Result<()> {
        let config = self.server.config()?;
        let servers = config.servers.as_deref().unwrap_or_default();
        if servers.is_empty() {
            println!("❌ No servers found in config file");
            return Ok(());
        }

        let active = self
            .server
            .server
            .as_deref()
            .or(config.active_server.as_deref())
            .or_else(|| servers.first().map(|s| s.name.as_str()));
        for server in servers {
            let marker = if Some(server.name.as_str()) == active { "*" } else { " " };
            let version = server
                .version
                .map_or_else(|| "auto-detect".to_string(), |v| v.to_string());
            println!("{marker} {} {} [{version}]", server.name, server.endpoint);
        }
        Ok(())
    }
}
