//! lokinet-cli
//!
//! Thin JSON-RPC client against a running router's admin socket (§6, §10.5).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lokinet_ipc_client::IpcClient;
use tracing::info;

#[derive(Parser)]
#[command(name = "lokinet-cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Admin socket path
    #[arg(long)]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show router status
    Status,

    /// Enable or disable exit-mode routing
    Exit {
        #[command(subcommand)]
        action: ExitAction,
    },

    /// Resolve a `.loki` address against the local introset cache
    Lookup {
        /// Name to resolve, e.g. `jason.loki`
        name: String,
    },

    /// Dump a summary of locally known routers and introsets
    Nodedb,
}

#[derive(Subcommand)]
enum ExitAction {
    On,
    Off,
}

fn default_socket_path() -> PathBuf {
    lokinet_keystore::default_config_dir().join("lokinet.sock")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let socket = cli.socket.unwrap_or_else(default_socket_path);
    let client = IpcClient::new(socket);

    match cli.command {
        Commands::Status => status(&client).await?,
        Commands::Exit { action } => exit_toggle(&client, action).await?,
        Commands::Lookup { name } => lookup(&client, &name).await?,
        Commands::Nodedb => nodedb(&client).await?,
    }

    Ok(())
}

async fn status(client: &IpcClient) -> Result<()> {
    let result = client.status().await.context("querying router status")?;
    println!("Router Status");
    println!("=============");
    println!("Mode:              {}", result.mode);
    println!("Router ID:         {}", result.router_id);
    println!("Net ID:            {}", result.netid);
    println!("Connected routers: {}", result.connected_routers);
    println!("Sessions:          {}", result.session_count);
    println!("Uptime:            {}s", result.uptime_secs);
    println!("Exit mode:         {}", if result.exit_enabled { "enabled" } else { "disabled" });
    Ok(())
}

async fn exit_toggle(client: &IpcClient, action: ExitAction) -> Result<()> {
    let result = match action {
        ExitAction::On => {
            info!("enabling exit mode");
            client.exit_enable().await.context("enabling exit mode")?
        }
        ExitAction::Off => {
            info!("disabling exit mode");
            client.exit_disable().await.context("disabling exit mode")?
        }
    };
    println!("Exit mode: {}", if result.enabled { "enabled" } else { "disabled" });
    Ok(())
}

async fn lookup(client: &IpcClient, name: &str) -> Result<()> {
    let result = client.lookup_name(name).await.context("looking up name")?;
    match result.address {
        Some(addr) => println!("{} -> {}", result.name, addr),
        None => println!("{} not found", result.name),
    }
    Ok(())
}

async fn nodedb(client: &IpcClient) -> Result<()> {
    let result = client.dump_nodedb_summary().await.context("dumping nodedb summary")?;
    println!("NodeDB Summary");
    println!("==============");
    println!("Known routers:       {}", result.router_count);
    println!("Known introsets:     {}", result.introset_count);
    println!("Pending transactions: {}", result.pending_transactions);
    Ok(())
}
