//! Run store
//!
//! Research runs are published here after every pipeline stage and read back by
//! the polling endpoints. Storage is volatile: the in-memory default loses all
//! runs on restart.

use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use super::state::ResearchState;

/// Keyed storage for research runs
pub trait ResearchStore: Send + Sync {
    /// Snapshot of a run
    fn get(&self, research_id: &Uuid) -> Option<ResearchState>;

    /// Insert or replace a run
    fn put(&self, state: ResearchState);

    /// Snapshots of every run, in no particular order
    fn list(&self) -> Vec<ResearchState>;
}

/// In-process store guarded by a read-write lock
#[derive(Default)]
pub struct InMemoryResearchStore {
    runs: RwLock<HashMap<Uuid, ResearchState>>,
}

impl InMemoryResearchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.runs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.read().is_empty()
    }
}

impl ResearchStore for InMemoryResearchStore {
    fn get(&self, research_id: &Uuid) -> Option<ResearchState> {
        self.runs.read().get(research_id).cloned()
    }

    fn put(&self, state: ResearchState) {
        self.runs.write().insert(state.research_id(), state);
    }

    fn list(&self) -> Vec<ResearchState> {
        self.runs.read().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::state::{Customization, ResearchStatus};
    use std::sync::Arc;

    #[test]
    fn test_put_then_get_returns_snapshot() {
        let store = InMemoryResearchStore::new();
        let id = Uuid::new_v4();
        store.put(ResearchState::new(id, "Topic", Customization::default()));

        let mut snapshot = store.get(&id).unwrap();
        snapshot.status = ResearchStatus::Failed;

        // Mutating a snapshot does not touch the stored run
        assert_eq!(store.get(&id).unwrap().status, ResearchStatus::Started);
    }

    #[test]
    fn test_unknown_id() {
        let store = InMemoryResearchStore::new();
        assert!(store.get(&Uuid::new_v4()).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_put_replaces_existing_run() {
        let store = InMemoryResearchStore::new();
        let id = Uuid::new_v4();
        let mut state = ResearchState::new(id, "Topic", Customization::default());
        store.put(state.clone());

        state.push_progress("Planning complete");
        store.put(state);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&id).unwrap().progress_updates().len(), 2);
    }

    #[test]
    fn test_concurrent_writers_keep_runs_separate() {
        let store = Arc::new(InMemoryResearchStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let id = Uuid::new_v4();
                    let mut state =
                        ResearchState::new(id, format!("Topic {}", i), Customization::default());
                    for step in 0..10 {
                        state.push_progress(format!("step {}", step));
                        store.put(state.clone());
                    }
                    id
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let id = handle.join().unwrap();
            let state = store.get(&id).unwrap();
            assert_eq!(state.topic(), format!("Topic {}", i));
            assert_eq!(state.progress_updates().len(), 11);
        }
        assert_eq!(store.list().len(), 8);
    }
}
