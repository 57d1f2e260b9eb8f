use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::ServerError;
use crate::models::agent::{AgentRecord, Availability, HealthSnapshot};

/// In-memory registry of agents keyed by id.
///
/// Each operation takes the lock once, so a reader never observes a
/// half-written record and a health update never interleaves with a
/// discovery upsert of the same id. Writes are last-write-wins.
#[derive(Clone, Default)]
pub struct AgentStore {
    agents: Arc<RwLock<HashMap<String, AgentRecord>>>,
}

impl AgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite by id. Returns `true` if the id was new.
    pub async fn upsert(&self, record: AgentRecord) -> bool {
        let mut agents = self.agents.write().await;
        agents.insert(record.id.clone(), record).is_none()
    }

    pub async fn get(&self, agent_id: &str) -> Option<AgentRecord> {
        self.agents.read().await.get(agent_id).cloned()
    }

    /// Like `get`, but unknown ids are an error.
    pub async fn require(&self, agent_id: &str) -> Result<AgentRecord, ServerError> {
        self.get(agent_id)
            .await
            .ok_or_else(|| ServerError::NotFound(format!("Agent {} not found", agent_id)))
    }

    /// Record a probe outcome. Unknown ids are ignored so that a probe racing
    /// with `remove` cannot resurrect the record.
    pub async fn set_availability(
        &self,
        agent_id: &str,
        availability: Availability,
        health: HealthSnapshot,
    ) -> bool {
        let mut agents = self.agents.write().await;
        match agents.get_mut(agent_id) {
            Some(record) => {
                record.availability = availability;
                if availability == Availability::Online {
                    record.last_seen = Utc::now();
                }
                record.health = Some(health);
                true
            }
            None => false,
        }
    }

    pub async fn remove(&self, agent_id: &str) -> Option<AgentRecord> {
        self.agents.write().await.remove(agent_id)
    }

    /// Snapshot of all records, ordered by id.
    pub async fn list(&self) -> Vec<AgentRecord> {
        let agents = self.agents.read().await;
        let mut records: Vec<AgentRecord> = agents.values().cloned().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }

    pub async fn ids(&self) -> Vec<String> {
        self.list().await.into_iter().map(|r| r.id).collect()
    }

    pub async fn len(&self) -> usize {
        self.agents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.agents.read().await.is_empty()
    }
}
