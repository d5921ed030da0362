//! Lokinet router daemon binary.
//!
//! Runs the router's logic loop and exposes the local admin JSON-RPC surface over a Unix socket.

use lokinet_daemon::{DaemonError, IpcConfig, IpcServer, RouterService};
use lokinet_router::{RouterBuilder, RouterRole};
use lokinet_settings::RouterSettings;

#[tokio::main]
async fn main() -> Result<(), DaemonError> {
    let _ = lokinet_logging::try_init(lokinet_logging::LogLevel::Info);

    tracing::info!("starting lokinet router...");

    let role = if std::env::args().any(|a| a == "--relay") { RouterRole::Relay } else { RouterRole::Client };

    let settings = RouterSettings::load_or_default().map_err(lokinet_router::RouterError::from)?;
    let core = RouterBuilder::new().role(role).build()?;

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let service = RouterService::new(core, &settings.exit, now);

    let config = IpcConfig::default();
    tracing::info!("admin IPC will listen on {:?}", config.socket_path);
    let mut ipc = IpcServer::new(config);

    tokio::select! {
        result = ipc.start(service) => {
            if let Err(e) = result {
                tracing::error!("IPC server error: {}", e);
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received shutdown signal");
            ipc.stop().await;
        }
    }

    tracing::info!("lokinet router stopped");
    Ok(())
}
