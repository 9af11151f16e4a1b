//! Human-readable portfolio brief.
//!
//! Read-only aggregation over property records fetched from the property
//! service. Not part of the decision pipeline; it only decorates a result.

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{Decision, LifecycleEvent, Snapshot};

// ---------------------------------------------------------------------------
// Property records (as served by the property API)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyStatus {
    Active,
    Inactive,
    LogicallyDeleted,
    #[default]
    #[serde(other)]
    Unknown,
}

impl PropertyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyStatus::Active => "ACTIVE",
            PropertyStatus::Inactive => "INACTIVE",
            PropertyStatus::LogicallyDeleted => "LOGICALLY_DELETED",
            PropertyStatus::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyStatistics {
    #[serde(default, deserialize_with = "null_as_default")]
    pub unit_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub floor_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySummary {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: PropertyStatus,
    #[serde(default)]
    pub statistics: Option<PropertyStatistics>,
}

/// The property service sends `null` for fields it has not filled in yet.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Brief
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityProperty {
    pub id: String,
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BriefMetrics {
    pub total_properties: usize,
    pub total_units: u64,
    pub priority: Option<PriorityProperty>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brief {
    pub narrative: String,
    pub safety: String,
    pub recommendations: Vec<String>,
    pub metrics: BriefMetrics,
}

/// Narrative, safety line and leading recommendations before portfolio
/// metrics are folded in.
#[derive(Debug, Clone)]
pub struct BriefBase {
    pub narrative: String,
    pub safety: String,
    pub recommendations: Vec<String>,
}

impl BriefBase {
    pub fn portfolio() -> Self {
        Self {
            narrative: "Portfolio insight requested.".to_string(),
            safety: "Data snapshot only; no actions executed.".to_string(),
            recommendations: vec!["Use these metrics to guide quarterly planning.".to_string()],
        }
    }

    pub fn for_snapshot(event: &LifecycleEvent, snapshot: &Snapshot) -> Self {
        let narrative = snapshot
            .plan
            .as_ref()
            .map(|p| p.narrative.clone())
            .unwrap_or_else(|| {
                format!(
                    "Processed {} for subject {}.",
                    event.action, event.subject_id
                )
            });
        let details = snapshot.details.as_deref().unwrap_or("Action halted for safety.");
        let (safety, follow_up) = match snapshot.decision {
            Decision::Approved => (
                "All checks completed and the system remains safe.".to_string(),
                "Monitor the property for follow-up tasks.".to_string(),
            ),
            Decision::Rejected => (
                details.to_string(),
                format!("Investigate why the action was blocked: {details}"),
            ),
        };
        Self {
            narrative,
            safety,
            recommendations: vec![
                format!("Refer to event {} for traceability.", snapshot.event_id),
                follow_up,
            ],
        }
    }
}

/// Fold portfolio metrics into `base`. The priority property is the first
/// one that is not active, or the first property when all are active.
pub fn build_brief(properties: &[PropertySummary], base: BriefBase) -> Brief {
    let total_units = properties
        .iter()
        .map(|p| p.statistics.as_ref().map_or(0, |s| s.unit_count))
        .sum();
    let priority = properties
        .iter()
        .find(|p| p.status != PropertyStatus::Active)
        .or_else(|| properties.first());

    let mut recommendations = base.recommendations;
    if let Some(p) = priority {
        recommendations.push(format!(
            "Focus on \"{}\" (status {}) for occupancy or maintenance reviews.",
            p.name,
            p.status.as_str()
        ));
    }

    Brief {
        narrative: base.narrative,
        safety: base.safety,
        recommendations,
        metrics: BriefMetrics {
            total_properties: properties.len(),
            total_units,
            priority: priority.map(|p| PriorityProperty {
                id: p.id.clone(),
                name: p.name.clone(),
                reason: format!("status {}", p.status.as_str()),
            }),
        },
    }
}
