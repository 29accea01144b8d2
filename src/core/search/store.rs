//! Keyed store of search jobs, shared between the polling surface and the
//! worker tasks. One mutex serializes map access across jobs; each job's
//! record is only ever written by its own worker, so there is no per-entry
//! contention.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use super::types::SearchJob;

#[derive(Clone, Default)]
pub struct JobStore {
    jobs: Arc<Mutex<HashMap<Uuid, SearchJob>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new job in its initial state and return its id.
    pub async fn create(&self, input: String) -> Uuid {
        let id = Uuid::new_v4();
        let job = SearchJob::new(id, input);
        self.jobs.lock().await.insert(id, job);
        id
    }

    /// Snapshot of the current job state, or None when absent or cleared.
    pub async fn get(&self, id: Uuid) -> Option<SearchJob> {
        self.jobs.lock().await.get(&id).cloned()
    }

    /// Mutate a job in place. A missing entry is a silent no-op: the caller
    /// may clear a job while its worker is still running, and the worker's
    /// final write must not error.
    pub async fn update<F>(&self, id: Uuid, mutate: F)
    where
        F: FnOnce(&mut SearchJob),
    {
        if let Some(job) = self.jobs.lock().await.get_mut(&id) {
            mutate(job);
        }
    }

    /// Remove a job entry. Idempotent; clearing an unknown id is fine.
    pub async fn clear(&self, id: Uuid) -> bool {
        self.jobs.lock().await.remove(&id).is_some()
    }

    #[cfg(test)]
    pub async fn count(&self) -> usize {
        self.jobs.lock().await.len()
    }
}
