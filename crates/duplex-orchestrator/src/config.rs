use std::time::Duration;

/// Tunables for the orchestration core.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Overall deadline for the synchronous fan-out/join. On expiry any
    /// artifact still pending is reconciled as failed and the call returns.
    pub join_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            join_timeout: Duration::from_secs(60),
        }
    }
}
