//! Plan construction that does not depend on the model: the deterministic
//! default plan, the default check set, and normalization of model output.

use serde::Deserialize;

use crate::tasks::CanonicalTask;
use crate::types::{ActionKind, LifecycleAction, LifecycleEvent, Ministry, Plan, PlanAction};

pub const NO_NARRATIVE: &str = "No narrative provided";

/// The plan used whenever the model is unavailable or returns garbage.
pub fn default_plan(event: &LifecycleEvent, reason: Option<&str>) -> Plan {
    let narrative = match reason {
        Some(r) => format!("Default plan triggered ({r})"),
        None => "Default plan (AI not available)".to_string(),
    };
    Plan {
        narrative,
        actions: vec![
            PlanAction::check(
                Ministry::Property,
                CanonicalTask::DuplicateCheck.as_str(),
                "Ensure property uniqueness.",
            ),
            PlanAction::check(
                Ministry::Finance,
                CanonicalTask::BalanceCheck.as_str(),
                "Ensure outstanding balance is zero.",
            ),
            PlanAction::check(
                Ministry::Legal,
                CanonicalTask::HoldCheck.as_str(),
                "Ensure no legal holds exist.",
            ),
            PlanAction::execute(
                Ministry::Property,
                event.action.as_str(),
                "Default property lifecycle task.",
            ),
        ],
    }
}

/// Checks to run when a plan declares none.
///
/// Creation only needs a uniqueness check; deletions must clear tenants,
/// balances and legal holds.
pub fn default_checks(action: LifecycleAction) -> Vec<(Ministry, CanonicalTask)> {
    match action {
        LifecycleAction::Create => vec![(Ministry::Property, CanonicalTask::DuplicateCheck)],
        LifecycleAction::LogicalDelete | LifecycleAction::HardDelete => vec![
            (Ministry::Property, CanonicalTask::TenantCheck),
            (Ministry::Finance, CanonicalTask::BalanceCheck),
            (Ministry::Legal, CanonicalTask::HoldCheck),
        ],
    }
}

// ---------------------------------------------------------------------------
// Model output
// ---------------------------------------------------------------------------

/// Loose shape of a model-produced plan; every field may be absent or null.
#[derive(Debug, Deserialize)]
pub struct DraftPlan {
    #[serde(default)]
    pub narrative: Option<String>,
    #[serde(default)]
    pub actions: Option<Vec<DraftAction>>,
}

/// A model-produced action. Models emit `null` as often as they omit a key,
/// so both are accepted here and resolved by [`DraftAction::into_action`].
#[derive(Debug, Deserialize)]
pub struct DraftAction {
    #[serde(alias = "ministry")]
    pub target: Ministry,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default, alias = "type")]
    pub kind: Option<ActionKind>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl DraftAction {
    /// A missing kind means execute. A missing task stays blank so the
    /// pipeline reports it as unsupported.
    pub fn into_action(self) -> PlanAction {
        PlanAction {
            target: self.target,
            task: self.task.unwrap_or_default(),
            kind: self.kind.unwrap_or_default(),
            reason: self.reason,
        }
    }
}

impl DraftPlan {
    /// Fill in defaults. Returns `None` when the draft carries no actions,
    /// since an empty plan cannot be handed downstream.
    pub fn normalize(self) -> Option<Plan> {
        let actions: Vec<PlanAction> = self
            .actions
            .unwrap_or_default()
            .into_iter()
            .map(DraftAction::into_action)
            .collect();
        if actions.is_empty() {
            return None;
        }
        let narrative = self
            .narrative
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| NO_NARRATIVE.to_string());
        Some(Plan { narrative, actions })
    }
}

/// Parse model text into a plan. Tolerates a surrounding markdown code fence.
pub fn parse_plan(content: &str) -> Result<Option<Plan>, serde_json::Error> {
    let draft: DraftPlan = serde_json::from_str(strip_code_fence(content))?;
    Ok(draft.normalize())
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
