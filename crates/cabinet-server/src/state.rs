use std::sync::Arc;

use cabinet_agent::{spawn_listener, AgentError, EventBus, Orchestrator};
use cabinet_core::config::Config;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub bus: EventBus,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>, bus: EventBus) -> Self {
        Self { orchestrator, bus }
    }

    /// Wire the live collaborators from `config` and, when a subscription
    /// is configured, start listening on it.
    ///
    /// The listener is only spawned inside a Tokio runtime (skipped in sync
    /// unit tests).
    pub fn from_config(config: &Config) -> Result<Self, AgentError> {
        let orchestrator = Arc::new(Orchestrator::new(cabinet_agent::live(config)?));
        let state = Self::new(orchestrator, EventBus::new());

        match config.subscription.as_deref() {
            Some(name) if tokio::runtime::Handle::try_current().is_ok() => {
                let deliveries = state.bus.subscribe(name);
                spawn_listener(Arc::clone(&state.orchestrator), deliveries);
            }
            Some(_) => {}
            None => tracing::warn!("no event subscription configured; listener disabled"),
        }

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_starts_with_empty_history() {
        let state = AppState::from_config(&Config::default()).unwrap();
        assert!(state.orchestrator.list_history().is_empty());
    }

    #[tokio::test]
    async fn configured_subscription_is_listened_on() {
        let config = Config {
            subscription: Some("property-events".into()),
            ..Config::default()
        };
        let state = AppState::from_config(&config).unwrap();
        let receipt = state.bus.publish_raw("property-events", "not json").unwrap();
        assert!(receipt.acknowledged().await);
    }

    #[tokio::test]
    async fn no_subscription_means_no_listener() {
        let state = AppState::from_config(&Config::default()).unwrap();
        assert!(state.bus.publish_raw("property-events", "{}").is_err());
    }
}
