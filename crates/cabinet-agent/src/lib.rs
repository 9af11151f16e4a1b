//! `cabinet-agent`: the lifecycle decision pipeline and its collaborators.
//!
//! # Architecture
//!
//! ```text
//! EventBus ──► spawn_listener ──┐
//!                               ▼
//! LifecycleEvent ──► Orchestrator::process_event
//!                      │
//!                      ├─ PolicyGate       (OpaClient)
//!                      ├─ Planner          (ModelPlanner, default plan on failure)
//!                      ├─ MinistryGateway  (McpClient, checks then executes)
//!                      └─ PortfolioSource  (PropertyApiClient, briefs only)
//!                      │
//!                      ▼
//!                  Snapshot ──► DecisionHistory + broadcast feed
//! ```
//!
//! Every collaborator sits behind a trait in [`gateway`]; [`live`] wires the
//! HTTP implementations from a [`Config`].

pub mod bus;
pub mod error;
pub mod gateway;
pub mod ministry;
pub mod orchestrator;
pub mod planner;
pub mod policy;
pub mod portfolio;


use std::sync::Arc;
use std::time::Duration;

use cabinet_core::config::Config;

pub use bus::{handle_delivery, spawn_listener, AckReceipt, Delivery, EventBus};
pub use error::AgentError;
pub use gateway::{
    MinistryGateway, MinistryRequest, Planner, PolicyDecision, PolicyGate, PortfolioSource,
};
pub use ministry::McpClient;
pub use orchestrator::{Collaborators, Orchestrator, Report, Stage};
pub use planner::ModelPlanner;
pub use policy::OpaClient;
pub use portfolio::PropertyApiClient;

/// Shared HTTP client with the configured per-request timeout.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, AgentError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Collaborators backed by the live HTTP services named in `config`.
pub fn live(config: &Config) -> Result<Collaborators, AgentError> {
    let http = http_client(Duration::from_secs(config.http_timeout_secs))?;
    Ok(Collaborators {
        policy: Arc::new(OpaClient::new(http.clone(), config.policy.url.clone())),
        planner: Arc::new(ModelPlanner::new(http.clone(), config.model.clone())),
        ministries: Arc::new(McpClient::new(http.clone(), config.ministries.clone())),
        portfolio: Arc::new(PropertyApiClient::new(http, config.property_api.clone())),
    })
}
