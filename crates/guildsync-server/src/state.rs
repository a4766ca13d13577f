use guildsync_core::config::SyncConfig;
use guildsync_core::gate::PrivilegeGate;
use guildsync_core::gateway::CommunityGateway;
use guildsync_core::orchestrator::ActionOrchestrator;
use guildsync_core::reporter::Reporter;
use guildsync_core::timers::MuteTimerStore;
use std::sync::Arc;

/// Shared application state passed to all route handlers.
///
/// The orchestrator, reporter and timer store are built once at startup and
/// shared; the configuration is immutable for the lifetime of the process.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn CommunityGateway>,
    pub gate: PrivilegeGate,
    pub timers: MuteTimerStore,
    pub orchestrator: Arc<ActionOrchestrator>,
    pub reporter: Arc<Reporter>,
    pub config: Arc<SyncConfig>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn CommunityGateway>, config: SyncConfig) -> Self {
        let gate = PrivilegeGate::new(config.privilege_role);
        let timers = MuteTimerStore::new();
        let orchestrator = Arc::new(ActionOrchestrator::new(
            Arc::clone(&gateway),
            gate.clone(),
            timers.clone(),
            config.audit_channel,
        ));
        let reporter = Arc::new(Reporter::new(Arc::clone(&gateway), config.audit_channel));
        Self {
            gateway,
            gate,
            timers,
            orchestrator,
            reporter,
            config: Arc::new(config),
        }
    }
}
