//! `RouterService`: the `IpcHandler` implementation wrapping a running [`RouterCore`]. Dispatches
//! the five admin methods (§6, §10.5) against the router's in-memory state behind a mutex, since
//! the `tokio::spawn`ed IPC connection tasks run concurrently with the daemon's tick loop.

use std::future::Future;
use std::net::IpAddr;
use std::pin::Pin;
use std::sync::Mutex;

use lokinet_exit::ExitContext;
use lokinet_ipc_client::{ExitToggleResult, LookupNameResult, NodeDbSummaryResult, StatusResult};
use lokinet_router::{RouterCore, RouterMode};
use lokinet_settings::ExitSection;

use crate::ipc::IpcHandler;

struct State {
    core: RouterCore,
    exit: Option<ExitContext>,
    started_at_secs: u64,
}

/// Wraps a [`RouterCore`] and services the admin JSON-RPC methods against it.
pub struct RouterService {
    state: Mutex<State>,
}

impl RouterService {
    pub fn new(core: RouterCore, exit_settings: &ExitSection, now: u64) -> Self {
        let exit = if exit_settings.enabled {
            let resolver = exit_settings.dns_resolver.as_deref().and_then(|s| s.parse::<IpAddr>().ok());
            ExitContext::new(resolver, Vec::new()).ok()
        } else {
            None
        };

        Self { state: Mutex::new(State { core, exit, started_at_secs: now }) }
    }

    fn status(&self, now: u64) -> StatusResult {
        let state = self.state.lock().unwrap();
        let mode = match &state.core.mode {
            RouterMode::Client { .. } => "client",
            RouterMode::Relay { .. } => "relay",
        };
        StatusResult {
            mode: mode.to_string(),
            router_id: hex::encode(state.core.local_rc.router_id),
            netid: state.core.local_rc.netid.clone(),
            connected_routers: state.core.sessions.len() as u32,
            session_count: state.core.sessions.len(),
            uptime_secs: now.saturating_sub(state.started_at_secs),
            exit_enabled: state.exit.is_some(),
        }
    }

    fn exit_enable(&self) -> Result<ExitToggleResult, String> {
        let mut state = self.state.lock().unwrap();
        if state.exit.is_some() {
            return Ok(ExitToggleResult { enabled: true });
        }
        match ExitContext::new(None, Vec::new()) {
            Ok(ctx) => {
                state.exit = Some(ctx);
                Ok(ExitToggleResult { enabled: true })
            }
            Err(e) => Err(format!("cannot enable exit mode: {e}")),
        }
    }

    fn exit_disable(&self) -> ExitToggleResult {
        let mut state = self.state.lock().unwrap();
        state.exit = None;
        ExitToggleResult { enabled: false }
    }

    fn lookup_name(&self, name: String) -> LookupNameResult {
        let state = self.state.lock().unwrap();
        let router_id = if let Ok(bytes) = hex::decode(name.trim_end_matches(".loki")) {
            if bytes.len() == 32 {
                let mut key = [0u8; 32];
                key.copy_from_slice(&bytes);
                state.core.dht.introset_nodes.get(&key).map(|_| name.clone())
            } else {
                None
            }
        } else {
            None
        };
        LookupNameResult { name, address: router_id }
    }

    fn dump_nodedb_summary(&self) -> NodeDbSummaryResult {
        let state = self.state.lock().unwrap();
        NodeDbSummaryResult {
            router_count: state.core.dht.rc_nodes.len(),
            introset_count: state.core.dht.introset_nodes.len(),
            pending_transactions: state.core.dht.transactions.len(),
        }
    }
}

impl IpcHandler for RouterService {
    fn handle(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, String>> + Send + '_>> {
        let method = method.to_string();
        Box::pin(async move {
            match method.as_str() {
                "status" => {
                    let now = std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .map(|d| d.as_secs())
                        .unwrap_or(0);
                    serde_json::to_value(self.status(now)).map_err(|e| e.to_string())
                }
                "exit_enable" => self.exit_enable().and_then(|r| serde_json::to_value(r).map_err(|e| e.to_string())),
                "exit_disable" => serde_json::to_value(self.exit_disable()).map_err(|e| e.to_string()),
                "lookup_name" => {
                    let name = params
                        .and_then(|v| v.get("name").and_then(|n| n.as_str()).map(String::from))
                        .ok_or_else(|| "missing required param: name".to_string())?;
                    serde_json::to_value(self.lookup_name(name)).map_err(|e| e.to_string())
                }
                "dump_nodedb_summary" => {
                    serde_json::to_value(self.dump_nodedb_summary()).map_err(|e| e.to_string())
                }
                other => Err(format!("unknown method: {other}")),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lokinet_core::{RouterContact, SigBytes};
    use lokinet_path::PathSet;

    fn sample_core() -> RouterCore {
        let rc = RouterContact {
            router_id: [1u8; 32],
            signing_key: [1u8; 32],
            encryption_key: [2u8; 32],
            addresses: vec![],
            netid: "lokinet".into(),
            last_updated: 0,
            signature: SigBytes::zero(),
        };
        RouterCore::new(rc, 4, RouterMode::Client { paths: PathSet::default() })
    }

    #[tokio::test]
    async fn status_reports_client_mode_with_no_sessions() {
        let service = RouterService::new(sample_core(), &ExitSection::default(), 1000);
        let result = service.handle("status", None).await.unwrap();
        let status: StatusResult = serde_json::from_value(result).unwrap();
        assert_eq!(status.mode, "client");
        assert_eq!(status.session_count, 0);
        assert!(!status.exit_enabled);
    }

    #[tokio::test]
    async fn exit_enable_refuses_without_resolver() {
        let service = RouterService::new(sample_core(), &ExitSection::default(), 1000);
        let result = service.handle("exit_enable", None).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn exit_disable_always_succeeds() {
        let service = RouterService::new(sample_core(), &ExitSection::default(), 1000);
        let result = service.handle("exit_disable", None).await.unwrap();
        let toggle: ExitToggleResult = serde_json::from_value(result).unwrap();
        assert!(!toggle.enabled);
    }

    #[tokio::test]
    async fn lookup_name_missing_param_errors() {
        let service = RouterService::new(sample_core(), &ExitSection::default(), 1000);
        let result = service.handle("lookup_name", None).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn dump_nodedb_summary_reports_empty_tables() {
        let service = RouterService::new(sample_core(), &ExitSection::default(), 1000);
        let result = service.handle("dump_nodedb_summary", None).await.unwrap();
        let summary: NodeDbSummaryResult = serde_json::from_value(result).unwrap();
        assert_eq!(summary.router_count, 0);
        assert_eq!(summary.introset_count, 0);
    }

    #[tokio::test]
    async fn unknown_method_errors() {
        let service = RouterService::new(sample_core(), &ExitSection::default(), 1000);
        let result = service.handle("frobnicate", None).await;
        assert!(result.is_err());
    }
}
