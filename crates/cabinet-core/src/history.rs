use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::types::Snapshot;

/// Append-only, process-lifetime record of every pipeline run.
///
/// Appends are serialized behind a mutex and snapshots are moved in whole,
/// so a reader never sees a half-built record. [`DecisionHistory::list`]
/// hands out clones; nothing outside this type can touch stored entries.
#[derive(Debug, Default)]
pub struct DecisionHistory {
    entries: Mutex<Vec<Snapshot>>,
}

impl DecisionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, snapshot: Snapshot) {
        let mut entries = self.lock();
        tracing::debug!(
            event_id = %snapshot.event_id,
            decision = %snapshot.decision,
            position = entries.len(),
            "snapshot appended"
        );
        entries.push(snapshot);
    }

    /// Copy of every snapshot in append order.
    pub fn list(&self) -> Vec<Snapshot> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn find(&self, event_id: &str) -> Option<Snapshot> {
        self.lock().iter().find(|s| s.event_id == event_id).cloned()
    }

    // push is the only mutation, so a poisoned lock still holds whole snapshots.
    fn lock(&self) -> MutexGuard<'_, Vec<Snapshot>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Actor, Decision, LifecycleAction, LifecycleEvent};
    use std::sync::Arc;

    fn snapshot(id: &str) -> Snapshot {
        let event = LifecycleEvent::new(id, LifecycleAction::Create, "p", Actor::default());
        Snapshot::begin(&event)
    }

    #[test]
    fn appends_in_order() {
        let history = DecisionHistory::new();
        assert!(history.is_empty());
        history.append(snapshot("a"));
        history.append(snapshot("b"));
        let ids: Vec<_> = history.list().into_iter().map(|s| s.event_id).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn list_returns_an_independent_copy() {
        let history = DecisionHistory::new();
        history.append(snapshot("a"));
        let mut copy = history.list();
        copy[0].decision = Decision::Approved;
        copy.clear();
        assert_eq!(history.len(), 1);
        assert_eq!(history.list()[0].decision, Decision::Rejected);
    }

    #[test]
    fn find_by_event_id() {
        let history = DecisionHistory::new();
        history.append(snapshot("a"));
        assert!(history.find("a").is_some());
        assert!(history.find("zzz").is_none());
    }

    #[test]
    fn concurrent_appends_are_all_kept() {
        let history = Arc::new(DecisionHistory::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let history = Arc::clone(&history);
                std::thread::spawn(move || {
                    for n in 0..25 {
                        history.append(snapshot(&format!("t{t}-{n}")));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(history.len(), 200);
    }
}
