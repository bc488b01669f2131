//! Subcommands that talk to a running BuilderPort server.

use anyhow::{Context, Result, bail};
use builderport_client::{Client, ClientConfig};
use clap::Args;

#[derive(Args)]
pub struct ServerOpts {
    /// Server address (overrides BUILDERPORT_ADDR)
    #[arg(long)]
    addr: Option<String>,
    /// Shared token (overrides BUILDERPORT_TOKEN)
    #[arg(long)]
    token: Option<String>,
    /// Per-read timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl ServerOpts {
    fn resolve(self) -> Result<ClientConfig> {
        let mut cfg = ClientConfig::from_env()?;
        if let Some(addr) = self.addr {
            cfg.addr = addr;
        }
        if let Some(token) = self.token {
            cfg.token = token;
        }
        if let Some(secs) = self.timeout_secs {
            cfg.read_timeout_secs = secs;
        }
        if cfg.token.is_empty() {
            bail!("no token: set --token or BUILDERPORT_TOKEN");
        }
        Ok(cfg)
    }
}

async fn session(opts: ServerOpts) -> Result<(Client, ClientConfig)> {
    let cfg = opts.resolve()?;
    let mut client = Client::connect(&cfg)
        .await
        .with_context(|| format!("connecting to {}", cfg.addr))?;
    client.hello(&cfg.token).await.context("authenticating")?;
    Ok((client, cfg))
}

pub async fn zones(opts: ServerOpts) -> Result<()> {
    let (mut client, _cfg) = session(opts).await?;
    let zones = client.list_zones().await.context("wld_list")?;
    tracing::info!(count = zones.len(), "zones listed");
    for zone in &zones {
        println!("{}\t{}", zone.vnum, zone.name);
    }
    client.quit().await?;
    Ok(())
}

pub async fn dump(vnum: u32, opts: ServerOpts) -> Result<()> {
    let (mut client, _cfg) = session(opts).await?;
    let rows = client
        .dump_room(vnum)
        .await
        .with_context(|| format!("wld_dump {vnum}"))?;
    for row in &rows {
        println!("{row}");
    }
    client.quit().await?;
    Ok(())
}

/// Open a ZONES transaction and abort it straight away. Proves the
/// token, the scope grammar, and the tx state machine in one shot.
pub async fn tx_check(zone: u32, opts: ServerOpts) -> Result<()> {
    let (mut client, _cfg) = session(opts).await?;
    client.tx_begin("ZONES", zone).await.context("tx_begin")?;
    client.tx_abort().await.context("tx_abort")?;
    println!("tx_begin ZONES {zone} / tx_abort: OK");
    client.quit().await?;
    Ok(())
}
