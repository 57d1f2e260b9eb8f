use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::workflow::{WorkflowInstance, WorkflowStatus};

/// Published snapshots of workflow instances.
///
/// Only the engine writes here (`publish` is crate-private); each running
/// instance is owned by its execution task and copied in on every
/// transition. Instances are kept until the process exits.
#[derive(Clone, Default)]
pub struct WorkflowStore {
    instances: Arc<RwLock<HashMap<String, WorkflowInstance>>>,
}

impl WorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn publish(&self, instance: &WorkflowInstance) {
        let mut instances = self.instances.write().await;
        instances.insert(instance.id.clone(), instance.clone());
    }

    pub async fn get(&self, workflow_id: &str) -> Option<WorkflowInstance> {
        self.instances.read().await.get(workflow_id).cloned()
    }

    /// All instances, most recently started first.
    pub async fn list(&self) -> Vec<WorkflowInstance> {
        let instances = self.instances.read().await;
        let mut all: Vec<WorkflowInstance> = instances.values().cloned().collect();
        all.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        all
    }

    pub async fn count_by_status(&self, status: WorkflowStatus) -> usize {
        self.instances
            .read()
            .await
            .values()
            .filter(|i| i.status == status)
            .count()
    }
}
