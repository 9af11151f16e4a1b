//! Canonical task vocabulary.
//!
//! Plans can come from a language model, so task names arrive in whatever
//! spelling the model felt like using. Only names that resolve to a
//! [`CanonicalTask`] are ever sent to a ministry.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::types::LifecycleAction;

// ---------------------------------------------------------------------------
// CanonicalTask
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalTask {
    #[serde(rename = "duplicate-check")]
    DuplicateCheck,
    #[serde(rename = "create")]
    Create,
    #[serde(rename = "logical_delete")]
    LogicalDelete,
    #[serde(rename = "hard_delete")]
    HardDelete,
    #[serde(rename = "tenant-check")]
    TenantCheck,
    #[serde(rename = "balance-check")]
    BalanceCheck,
    #[serde(rename = "hold-check")]
    HoldCheck,
}

impl CanonicalTask {
    /// Vocabulary in match priority order.
    pub fn all() -> &'static [CanonicalTask] {
        &[
            CanonicalTask::DuplicateCheck,
            CanonicalTask::Create,
            CanonicalTask::LogicalDelete,
            CanonicalTask::HardDelete,
            CanonicalTask::TenantCheck,
            CanonicalTask::BalanceCheck,
            CanonicalTask::HoldCheck,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalTask::DuplicateCheck => "duplicate-check",
            CanonicalTask::Create => "create",
            CanonicalTask::LogicalDelete => "logical_delete",
            CanonicalTask::HardDelete => "hard_delete",
            CanonicalTask::TenantCheck => "tenant-check",
            CanonicalTask::BalanceCheck => "balance-check",
            CanonicalTask::HoldCheck => "hold-check",
        }
    }

    /// The name with `-`/`_` separators replaced by spaces.
    pub fn word_form(self) -> String {
        self.as_str().replace(['-', '_'], " ")
    }

    pub fn for_action(action: LifecycleAction) -> Self {
        match action {
            LifecycleAction::Create => CanonicalTask::Create,
            LifecycleAction::LogicalDelete => CanonicalTask::LogicalDelete,
            LifecycleAction::HardDelete => CanonicalTask::HardDelete,
        }
    }

    fn lookup(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for CanonicalTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comma-separated vocabulary, for embedding in model instructions.
pub fn vocabulary_prompt() -> String {
    CanonicalTask::all()
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

static NON_ALNUM_RE: OnceLock<Regex> = OnceLock::new();

fn non_alnum_re() -> &'static Regex {
    NON_ALNUM_RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").unwrap())
}

/// Lowercase, turn every run of non-`[a-z0-9]` characters into a single
/// space, and trim.
fn clean(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    non_alnum_re()
        .replace_all(&lowered, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve a free-form task name to the canonical vocabulary.
///
/// Tries, in order: an exact (case-insensitive) hit, the cleaned form joined
/// with `-` and then `_`, and finally a word-form match where the cleaned
/// input equals or contains a vocabulary entry's words. Returns `None` when
/// nothing matches.
pub fn map_to_canonical(raw: Option<&str>) -> Option<CanonicalTask> {
    let raw = raw?;
    let trimmed = raw.trim().to_lowercase();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(task) = CanonicalTask::lookup(&trimmed) {
        return Some(task);
    }

    let cleaned = clean(raw);
    if cleaned.is_empty() {
        return None;
    }

    let hyphenated = cleaned.replace(' ', "-");
    if let Some(task) = CanonicalTask::lookup(&hyphenated) {
        return Some(task);
    }
    let underscored = cleaned.replace(' ', "_");
    if let Some(task) = CanonicalTask::lookup(&underscored) {
        return Some(task);
    }

    CanonicalTask::all().iter().copied().find(|task| {
        let words = task.word_form();
        cleaned == words || cleaned.contains(&words)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spelling_variants_resolve_to_same_task() {
        let expected = Some(CanonicalTask::DuplicateCheck);
        assert_eq!(map_to_canonical(Some("Duplicate-Check")), expected);
        assert_eq!(map_to_canonical(Some("duplicate_check")), expected);
        assert_eq!(map_to_canonical(Some(" DUPLICATE   CHECK ")), expected);
    }

    #[test]
    fn empty_missing_and_unknown_are_none() {
        assert_eq!(map_to_canonical(Some("")), None);
        assert_eq!(map_to_canonical(Some("   ")), None);
        assert_eq!(map_to_canonical(None), None);
        assert_eq!(map_to_canonical(Some("totally-unknown-thing")), None);
        assert_eq!(map_to_canonical(Some("!!!")), None);
    }

    #[test]
    fn exact_vocabulary_hits() {
        for task in CanonicalTask::all() {
            assert_eq!(map_to_canonical(Some(task.as_str())), Some(*task));
        }
    }

    #[test]
    fn sentence_containing_task_words_matches() {
        assert_eq!(
            map_to_canonical(Some("Run a balance check on the ledger")),
            Some(CanonicalTask::BalanceCheck)
        );
        assert_eq!(
            map_to_canonical(Some("Legal: HOLD CHECK!")),
            Some(CanonicalTask::HoldCheck)
        );
    }

    #[test]
    fn legacy_action_names_map_to_lifecycle_tasks() {
        assert_eq!(
            map_to_canonical(Some("create_property")),
            Some(CanonicalTask::Create)
        );
        assert_eq!(
            map_to_canonical(Some("hard-delete-property")),
            Some(CanonicalTask::HardDelete)
        );
        assert_eq!(
            map_to_canonical(Some("Logical Delete")),
            Some(CanonicalTask::LogicalDelete)
        );
    }

    #[test]
    fn every_lifecycle_action_is_in_vocabulary() {
        for action in LifecycleAction::all() {
            assert_eq!(
                map_to_canonical(Some(action.as_str())),
                Some(CanonicalTask::for_action(*action))
            );
        }
    }

    #[test]
    fn vocabulary_prompt_lists_everything() {
        let prompt = vocabulary_prompt();
        assert!(prompt.starts_with("duplicate-check, create"));
        assert!(prompt.ends_with("hold-check"));
    }
}
