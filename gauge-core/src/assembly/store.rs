//! Topic assignment storage
//!
//! Session identity is the uniqueness key: the first write wins and every
//! later write observes the stored rows, which is what makes `assemble`
//! idempotent.

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::blueprint::TopicAssignment;

/// In-memory assignment store
pub struct MemoryAssignmentStore {
    assignments: RwLock<HashMap<Uuid, Vec<TopicAssignment>>>,
}

impl MemoryAssignmentStore {
    pub fn new() -> Self {
        Self {
            assignments: RwLock::new(HashMap::new()),
        }
    }

    /// Insert assignments for a session unless some already exist.
    ///
    /// Returns the stored rows and whether this call inserted them. The
    /// check and the write happen under one lock, so concurrent assemblers
    /// agree on a single blueprint.
    pub async fn try_insert(
        &self,
        session_id: Uuid,
        rows: Vec<TopicAssignment>,
    ) -> (Vec<TopicAssignment>, bool) {
        let mut assignments = self.assignments.write().await;
        match assignments.get(&session_id) {
            Some(existing) => (existing.clone(), false),
            None => {
                assignments.insert(session_id, rows.clone());
                (rows, true)
            }
        }
    }

    pub async fn get(&self, session_id: Uuid) -> Option<Vec<TopicAssignment>> {
        self.assignments.read().await.get(&session_id).cloned()
    }
}

impl Default for MemoryAssignmentStore {
    fn default() -> Self {
        Self::new()
    }
}
