//! Collaborator seams of the pipeline.
//!
//! Every outbound dependency is a trait so the orchestrator can be driven by
//! live HTTP clients in production and by in-memory doubles in tests. Each
//! method returns a value, never an error: expected failures are folded into
//! the returned value by the implementation.

use async_trait::async_trait;
use serde::Serialize;

use cabinet_core::brief::PropertySummary;
use cabinet_core::tasks::CanonicalTask;
use cabinet_core::types::{ActionResult, CheckResult, LifecycleEvent, Ministry, Plan};

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDecision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl PolicyDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

#[async_trait]
pub trait PolicyGate: Send + Sync {
    /// Evaluate `rule` against `input`. Fails closed.
    async fn evaluate(&self, rule: &str, input: &serde_json::Value) -> PolicyDecision;
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

#[async_trait]
pub trait Planner: Send + Sync {
    /// Always yields a plan with a narrative and at least one action.
    async fn create_plan(&self, event: &LifecycleEvent) -> Plan;
}

// ---------------------------------------------------------------------------
// Ministries
// ---------------------------------------------------------------------------

/// JSON body sent with every ministry call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MinistryRequest {
    pub subject_id: String,
    pub payload: serde_json::Map<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl MinistryRequest {
    pub fn for_event(event: &LifecycleEvent, reason: Option<String>) -> Self {
        Self {
            subject_id: event.subject_id.clone(),
            payload: event.payload.clone(),
            reason,
        }
    }
}

#[async_trait]
pub trait MinistryGateway: Send + Sync {
    /// Verification call (`check` phase).
    async fn ask(
        &self,
        ministry: Ministry,
        task: CanonicalTask,
        request: &MinistryRequest,
    ) -> CheckResult;

    /// Command call (`execute` phase).
    async fn execute(
        &self,
        ministry: Ministry,
        task: CanonicalTask,
        request: &MinistryRequest,
    ) -> ActionResult;
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

#[async_trait]
pub trait PortfolioSource: Send + Sync {
    /// Current property records; empty when the source is unreachable.
    async fn fetch_properties(&self) -> Vec<PropertySummary>;
}
