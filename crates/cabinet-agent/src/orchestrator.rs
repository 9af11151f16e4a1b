//! The lifecycle decision pipeline.
//!
//! ```text
//! POLICY_CHECK ──deny──────────────────────────────► REJECTED
//!      │ allow
//!      ▼
//!    PLAN ──► CROSS_CHECK ──any flagged────────────► REJECTED
//!                  │ all cleared
//!                  ▼
//!               EXECUTE ──any failed────────────────► REJECTED
//!                  │ all succeeded
//!                  ▼
//!               APPROVED
//! ```
//!
//! Every run ends in exactly one [`Snapshot`], appended to the
//! orchestrator's [`DecisionHistory`] whatever the outcome.

use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use cabinet_core::brief::{build_brief, Brief, BriefBase};
use cabinet_core::history::DecisionHistory;
use cabinet_core::plan::default_checks;
use cabinet_core::rules::rule_for_action;
use cabinet_core::tasks::{map_to_canonical, CanonicalTask};
use cabinet_core::types::{
    ActionResult, CheckResult, Decision, LifecycleEvent, Ministry, Plan, PlanAction, Snapshot,
};

use crate::gateway::{MinistryGateway, MinistryRequest, Planner, PolicyGate, PortfolioSource};

pub const POLICY_DENIED: &str = "policy denied the action";
pub const SERVICES_FLAGGED: &str = "one or more services flagged issues";

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Pipeline stage, used to label where a run terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PolicyCheck,
    Plan,
    CrossCheck,
    Execute,
    Approved,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::PolicyCheck => "policy_check",
            Stage::Plan => "plan",
            Stage::CrossCheck => "cross_check",
            Stage::Execute => "execute",
            Stage::Approved => "approved",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Collaborators / Report
// ---------------------------------------------------------------------------

/// The outbound dependencies of an [`Orchestrator`].
#[derive(Clone)]
pub struct Collaborators {
    pub policy: Arc<dyn PolicyGate>,
    pub planner: Arc<dyn Planner>,
    pub ministries: Arc<dyn MinistryGateway>,
    pub portfolio: Arc<dyn PortfolioSource>,
}

/// A snapshot together with the brief derived from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub snapshot: Snapshot,
    pub brief: Brief,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct Orchestrator {
    collaborators: Collaborators,
    history: Arc<DecisionHistory>,
    updates: broadcast::Sender<Snapshot>,
}

impl Orchestrator {
    pub fn new(collaborators: Collaborators) -> Self {
        Self::with_history(collaborators, Arc::new(DecisionHistory::new()))
    }

    pub fn with_history(collaborators: Collaborators, history: Arc<DecisionHistory>) -> Self {
        let (updates, _) = broadcast::channel(64);
        Self {
            collaborators,
            history,
            updates,
        }
    }

    pub fn history(&self) -> &Arc<DecisionHistory> {
        &self.history
    }

    /// Copy of every recorded snapshot, oldest first.
    pub fn list_history(&self) -> Vec<Snapshot> {
        self.history.list()
    }

    /// Live feed of snapshots as they are appended.
    pub fn subscribe(&self) -> broadcast::Receiver<Snapshot> {
        self.updates.subscribe()
    }

    /// Run `event` through the pipeline, record the outcome, and return it.
    pub async fn process_event(&self, event: &LifecycleEvent) -> Snapshot {
        let (snapshot, stage) = self.run_pipeline(event).await;
        match snapshot.decision {
            Decision::Approved => tracing::info!(
                event_id = %event.event_id,
                action = %event.action,
                subject_id = %event.subject_id,
                "lifecycle action approved"
            ),
            Decision::Rejected => tracing::warn!(
                event_id = %event.event_id,
                action = %event.action,
                subject_id = %event.subject_id,
                %stage,
                details = snapshot.details.as_deref().unwrap_or(""),
                "lifecycle action rejected"
            ),
        }
        self.record(snapshot.clone());
        snapshot
    }

    /// [`Self::process_event`] plus a brief over the current portfolio.
    pub async fn report(&self, event: &LifecycleEvent) -> Report {
        let snapshot = self.process_event(event).await;
        let properties = self.collaborators.portfolio.fetch_properties().await;
        let brief = build_brief(&properties, BriefBase::for_snapshot(event, &snapshot));
        Report { snapshot, brief }
    }

    /// Brief over the current portfolio, independent of any event.
    pub async fn portfolio_brief(&self) -> Brief {
        let properties = self.collaborators.portfolio.fetch_properties().await;
        build_brief(&properties, BriefBase::portfolio())
    }

    fn record(&self, snapshot: Snapshot) {
        self.history.append(snapshot.clone());
        // No receivers is the common case.
        let _ = self.updates.send(snapshot);
    }

    async fn run_pipeline(&self, event: &LifecycleEvent) -> (Snapshot, Stage) {
        let mut snapshot = Snapshot::begin(event);

        let rule = rule_for_action(event.action);
        let input = serde_json::json!({
            "actor": event.actor,
            "action": event.action,
            "data": event.payload,
        });
        let policy = self.collaborators.policy.evaluate(rule, &input).await;
        snapshot.policy_allowed = policy.allowed;
        snapshot.policy_reason = policy.reason;
        if !policy.allowed {
            snapshot.details = Some(POLICY_DENIED.to_string());
            return (snapshot, Stage::PolicyCheck);
        }

        let plan = self.collaborators.planner.create_plan(event).await;
        tracing::debug!(event_id = %event.event_id, stage = %Stage::Plan, narrative = %plan.narrative);
        snapshot.plan = Some(plan.clone());

        let checks = self.run_checks(event, &plan).await;
        let flagged: Vec<&str> = checks
            .iter()
            .filter(|c| !c.cleared)
            .map(|c| c.ministry.as_str())
            .collect();
        let flagged_summary = flagged.join(", ");
        snapshot.check_results = checks;
        if !flagged_summary.is_empty() {
            snapshot.details = Some(format!("{SERVICES_FLAGGED}: {flagged_summary}"));
            return (snapshot, Stage::CrossCheck);
        }

        let results = self.run_actions(event, &plan).await;
        if let Some(failed) = results.iter().find(|r| !r.success) {
            snapshot.details = Some(format!("action failed: {}", failed.details));
            return (snapshot, Stage::Execute);
        }

        snapshot.decision = Decision::Approved;
        snapshot.details = Some(
            results
                .iter()
                .map(|r| r.details.as_str())
                .collect::<Vec<_>>()
                .join(" | "),
        );
        (snapshot, Stage::Approved)
    }

    // -----------------------------------------------------------------------
    // Cross-check fan-out
    // -----------------------------------------------------------------------

    /// Verification calls for `plan`'s check actions, or the default check
    /// set when it declares none. All calls run concurrently and every one
    /// is awaited; results keep plan order.
    pub async fn run_checks(&self, event: &LifecycleEvent, plan: &Plan) -> Vec<CheckResult> {
        let declared: Vec<&PlanAction> = plan.checks().collect();
        if declared.is_empty() {
            return self.run_default_checks(event).await;
        }
        join_all(declared.into_iter().map(|action| self.check_one(event, action))).await
    }

    async fn run_default_checks(&self, event: &LifecycleEvent) -> Vec<CheckResult> {
        let request = MinistryRequest::for_event(event, None);
        let calls = default_checks(event.action)
            .into_iter()
            .map(|(ministry, task)| self.collaborators.ministries.ask(ministry, task, &request));
        join_all(calls).await
    }

    async fn check_one(&self, event: &LifecycleEvent, action: &PlanAction) -> CheckResult {
        let Some(task) = map_to_canonical(Some(&action.task)) else {
            let details = unsupported("check", action);
            tracing::warn!(event_id = %event.event_id, "{details}");
            return CheckResult {
                ministry: action.target,
                cleared: false,
                details,
            };
        };
        let request = MinistryRequest::for_event(event, action.reason.clone());
        self.collaborators
            .ministries
            .ask(action.target, task, &request)
            .await
    }

    // -----------------------------------------------------------------------
    // Execution fan-out
    // -----------------------------------------------------------------------

    /// Commands for `plan`'s execute actions, or the event's own action
    /// against the property ministry when it declares none. Same
    /// concurrency and ordering as [`Self::run_checks`].
    pub async fn run_actions(&self, event: &LifecycleEvent, plan: &Plan) -> Vec<ActionResult> {
        let declared: Vec<&PlanAction> = plan.executions().collect();
        if declared.is_empty() {
            let request = MinistryRequest::for_event(event, None);
            let task = CanonicalTask::for_action(event.action);
            let result = self
                .collaborators
                .ministries
                .execute(Ministry::Property, task, &request)
                .await;
            return vec![result];
        }
        join_all(declared.into_iter().map(|action| self.execute_one(event, action))).await
    }

    async fn execute_one(&self, event: &LifecycleEvent, action: &PlanAction) -> ActionResult {
        let Some(task) = map_to_canonical(Some(&action.task)) else {
            let details = unsupported("execute", action);
            tracing::warn!(event_id = %event.event_id, "{details}");
            return ActionResult {
                success: false,
                details,
            };
        };
        let request = MinistryRequest::for_event(event, action.reason.clone());
        self.collaborators
            .ministries
            .execute(action.target, task, &request)
            .await
    }
}

fn unsupported(kind: &str, action: &PlanAction) -> String {
    format!(
        "unsupported {kind} task \"{}\" for ministry {}",
        action.task_label(),
        action.target
    )
}
