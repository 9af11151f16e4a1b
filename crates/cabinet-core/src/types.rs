use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::CabinetError;

// ---------------------------------------------------------------------------
// LifecycleAction
// ---------------------------------------------------------------------------

/// Property lifecycle actions that can enter the pipeline.
///
/// The upstream property service historically suffixed every action with
/// `_property`; those spellings are accepted on input and normalized here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    #[serde(alias = "create_property")]
    Create,
    #[serde(alias = "logical_delete_property")]
    LogicalDelete,
    #[serde(alias = "hard_delete_property")]
    HardDelete,
}

impl LifecycleAction {
    pub fn all() -> &'static [LifecycleAction] {
        &[
            LifecycleAction::Create,
            LifecycleAction::LogicalDelete,
            LifecycleAction::HardDelete,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleAction::Create => "create",
            LifecycleAction::LogicalDelete => "logical_delete",
            LifecycleAction::HardDelete => "hard_delete",
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LifecycleAction {
    type Err = CabinetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" | "create_property" => Ok(LifecycleAction::Create),
            "logical_delete" | "logical_delete_property" => Ok(LifecycleAction::LogicalDelete),
            "hard_delete" | "hard_delete_property" => Ok(LifecycleAction::HardDelete),
            _ => Err(CabinetError::InvalidEvent(format!(
                "unknown lifecycle action '{s}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Ministry
// ---------------------------------------------------------------------------

/// A domain-owning service consulted for checks and commanded for execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ministry {
    Property,
    Finance,
    Legal,
}

impl Ministry {
    pub fn all() -> &'static [Ministry] {
        &[Ministry::Property, Ministry::Finance, Ministry::Legal]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Ministry::Property => "property",
            Ministry::Finance => "finance",
            Ministry::Legal => "legal",
        }
    }
}

impl fmt::Display for Ministry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// LifecycleEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub permissions: BTreeSet<String>,
}

/// One lifecycle action emitted by the property service. Consumed once by
/// the orchestrator and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleEvent {
    pub event_id: String,
    pub action: LifecycleAction,
    #[serde(alias = "propertyId")]
    pub subject_id: String,
    #[serde(alias = "user")]
    pub actor: Actor,
    #[serde(default)]
    pub payload: serde_json::Map<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl LifecycleEvent {
    pub fn new(
        event_id: impl Into<String>,
        action: LifecycleAction,
        subject_id: impl Into<String>,
        actor: Actor,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            action,
            subject_id: subject_id.into(),
            actor,
            payload: serde_json::Map::new(),
            timestamp: None,
        }
    }

    /// Decode a transport payload. Rejects blank identifiers in addition to
    /// anything serde refuses.
    pub fn from_slice(data: &[u8]) -> crate::Result<Self> {
        let event: LifecycleEvent = serde_json::from_slice(data)?;
        if event.event_id.trim().is_empty() {
            return Err(CabinetError::InvalidEvent("eventId is empty".into()));
        }
        if event.subject_id.trim().is_empty() {
            return Err(CabinetError::InvalidEvent("subjectId is empty".into()));
        }
        Ok(event)
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Check,
    #[default]
    Execute,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Check => "check",
            ActionKind::Execute => "execute",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single step of a plan. `task` is free-form until it passes through
/// [`crate::tasks::map_to_canonical`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanAction {
    #[serde(alias = "ministry")]
    pub target: Ministry,
    #[serde(default)]
    pub task: String,
    #[serde(default, alias = "type")]
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl PlanAction {
    pub fn check(target: Ministry, task: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            target,
            task: task.into(),
            kind: ActionKind::Check,
            reason: Some(reason.into()),
        }
    }

    pub fn execute(target: Ministry, task: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            target,
            task: task.into(),
            kind: ActionKind::Execute,
            reason: Some(reason.into()),
        }
    }

    /// The raw task for log and error messages.
    pub fn task_label(&self) -> &str {
        if self.task.trim().is_empty() {
            "<missing>"
        } else {
            &self.task
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub narrative: String,
    pub actions: Vec<PlanAction>,
}

impl Plan {
    pub fn checks(&self) -> impl Iterator<Item = &PlanAction> {
        self.actions.iter().filter(|a| a.kind == ActionKind::Check)
    }

    pub fn executions(&self) -> impl Iterator<Item = &PlanAction> {
        self.actions.iter().filter(|a| a.kind == ActionKind::Execute)
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub ministry: Ministry,
    pub cleared: bool,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub details: String,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Approved => "approved",
            Decision::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The audit record of one pipeline run.
///
/// Built up while the run is in flight and frozen once appended to
/// [`crate::history::DecisionHistory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub event_id: String,
    pub action: LifecycleAction,
    pub subject_id: String,
    pub policy_allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_reason: Option<String>,
    #[serde(default)]
    pub check_results: Vec<CheckResult>,
    pub decision: Decision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
}

impl Snapshot {
    /// A fresh, not-yet-decided record for `event`. Starts out rejected so
    /// an early return can never leak an approval.
    pub fn begin(event: &LifecycleEvent) -> Self {
        Self {
            event_id: event.event_id.clone(),
            action: event.action,
            subject_id: event.subject_id.clone(),
            policy_allowed: false,
            policy_reason: None,
            check_results: Vec::new(),
            decision: Decision::Rejected,
            details: None,
            timestamp: Utc::now(),
            plan: None,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.decision == Decision::Approved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_action_accepts_legacy_spellings() {
        let a: LifecycleAction = serde_json::from_str("\"hard_delete_property\"").unwrap();
        assert_eq!(a, LifecycleAction::HardDelete);
        assert_eq!(
            "create_property".parse::<LifecycleAction>().unwrap(),
            LifecycleAction::Create
        );
        assert!("archive".parse::<LifecycleAction>().is_err());
    }

    #[test]
    fn event_decodes_legacy_field_names() {
        let json = r#"{
            "eventId": "evt-1",
            "action": "logical_delete_property",
            "propertyId": "prop-9",
            "user": { "id": "u1", "role": "admin", "permissions": ["property:delete"] },
            "payload": { "reason": "sold" }
        }"#;
        let event = LifecycleEvent::from_slice(json.as_bytes()).unwrap();
        assert_eq!(event.subject_id, "prop-9");
        assert_eq!(event.action, LifecycleAction::LogicalDelete);
        assert!(event.actor.permissions.contains("property:delete"));
        assert_eq!(event.payload["reason"], "sold");
        assert!(event.timestamp.is_none());
    }

    #[test]
    fn event_with_blank_id_is_rejected() {
        let json = r#"{"eventId":" ","action":"create","subjectId":"p","actor":{"id":"u"}}"#;
        assert!(LifecycleEvent::from_slice(json.as_bytes()).is_err());
    }

    #[test]
    fn plan_action_kind_defaults_to_execute() {
        let json = r#"{"ministry":"legal","task":"hold-check"}"#;
        let action: PlanAction = serde_json::from_str(json).unwrap();
        assert_eq!(action.kind, ActionKind::Execute);
        assert_eq!(action.target, Ministry::Legal);

        let json = r#"{"target":"finance","task":"balance-check","type":"check"}"#;
        let action: PlanAction = serde_json::from_str(json).unwrap();
        assert_eq!(action.kind, ActionKind::Check);
    }

    #[test]
    fn missing_task_has_placeholder_label() {
        let action: PlanAction = serde_json::from_str(r#"{"target":"property"}"#).unwrap();
        assert_eq!(action.task_label(), "<missing>");
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let event = LifecycleEvent::new("e1", LifecycleAction::Create, "p1", Actor::default());
        let snap = Snapshot::begin(&event);
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["eventId"], "e1");
        assert_eq!(json["subjectId"], "p1");
        assert_eq!(json["policyAllowed"], false);
        assert_eq!(json["decision"], "rejected");
        assert!(json.get("plan").is_none());
    }
}
