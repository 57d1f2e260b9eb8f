//! Progress/event log.
//!
//! Two kinds of owner share one log:
//!
//! - every workflow id owns an unbounded, append-only list whose sequence
//!   numbers are the list positions;
//! - the `discovery` owner is a ring buffer of the last `capacity` discovery
//!   and health events, numbered by a counter that keeps growing when old
//!   entries fall off.
//!
//! Consumers that re-scan the log on every tick keep a [`FeedCursor`], which
//! remembers the `(owner_id, sequence)` pairs it already handed out.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Notify, RwLock};
use tokio_stream::Stream;

use crate::models::event::{EventKind, ProgressUpdate};

/// Owner id used for discovery and health events.
pub const DISCOVERY_OWNER: &str = "discovery";

struct LogInner {
    workflows: HashMap<String, Vec<ProgressUpdate>>,
    discovery: VecDeque<ProgressUpdate>,
    next_discovery_seq: u64,
}

#[derive(Clone)]
pub struct ProgressLog {
    inner: Arc<RwLock<LogInner>>,
    appended: Arc<Notify>,
    capacity: usize,
}

impl ProgressLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(LogInner {
                workflows: HashMap::new(),
                discovery: VecDeque::with_capacity(capacity),
                next_discovery_seq: 0,
            })),
            appended: Arc::new(Notify::new()),
            capacity: capacity.max(1),
        }
    }

    /// Append an update to a workflow's list.
    pub async fn record(
        &self,
        workflow_id: &str,
        kind: EventKind,
        message: impl Into<String>,
        data: Option<serde_json::Value>,
    ) -> ProgressUpdate {
        let update = {
            let mut inner = self.inner.write().await;
            let list = inner.workflows.entry(workflow_id.to_string()).or_default();
            let update = ProgressUpdate {
                owner_id: workflow_id.to_string(),
                sequence: list.len() as u64,
                timestamp: Utc::now(),
                kind,
                message: message.into(),
                data,
            };
            list.push(update.clone());
            update
        };
        self.appended.notify_waiters();
        update
    }

    /// Append a discovery/health event, evicting the oldest past capacity.
    pub async fn record_discovery(
        &self,
        kind: EventKind,
        message: impl Into<String>,
        data: Option<serde_json::Value>,
    ) -> ProgressUpdate {
        let message = message.into();
        tracing::debug!("[Discovery] event {:?}: {}", kind, message);
        let update = {
            let mut inner = self.inner.write().await;
            let update = ProgressUpdate {
                owner_id: DISCOVERY_OWNER.to_string(),
                sequence: inner.next_discovery_seq,
                timestamp: Utc::now(),
                kind,
                message,
                data,
            };
            inner.next_discovery_seq += 1;
            inner.discovery.push_back(update.clone());
            while inner.discovery.len() > self.capacity {
                inner.discovery.pop_front();
            }
            update
        };
        self.appended.notify_waiters();
        update
    }

    pub async fn for_workflow(&self, workflow_id: &str) -> Vec<ProgressUpdate> {
        self.inner
            .read()
            .await
            .workflows
            .get(workflow_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Buffered discovery events, oldest first. `limit` keeps only the newest.
    pub async fn discovery_events(&self, limit: Option<usize>) -> Vec<ProgressUpdate> {
        let inner = self.inner.read().await;
        let skip = limit
            .map(|n| inner.discovery.len().saturating_sub(n))
            .unwrap_or(0);
        inner.discovery.iter().skip(skip).cloned().collect()
    }

    pub async fn discovery_len(&self) -> usize {
        self.inner.read().await.discovery.len()
    }

    /// Every entry currently held: the discovery buffer, then each workflow's list.
    pub async fn snapshot(&self) -> Vec<ProgressUpdate> {
        let inner = self.inner.read().await;
        let mut all: Vec<ProgressUpdate> = inner.discovery.iter().cloned().collect();
        let mut owners: Vec<&String> = inner.workflows.keys().collect();
        owners.sort();
        for owner in owners {
            if let Some(list) = inner.workflows.get(owner) {
                all.extend(list.iter().cloned());
            }
        }
        all
    }

    /// Oldest discovery sequence still buffered.
    async fn discovery_floor(&self) -> Option<u64> {
        self.inner.read().await.discovery.front().map(|u| u.sequence)
    }

    /// Resolves on the next append, or after `tick`, whichever comes first.
    pub async fn wait_for_append(&self, tick: Duration) {
        let _ = tokio::time::timeout(tick, self.appended.notified()).await;
    }
}

/// Per-consumer delivery tracking for a re-scanned [`ProgressLog`].
#[derive(Debug, Default)]
pub struct FeedCursor {
    delivered: HashSet<(String, u64)>,
}

impl FeedCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries not yet handed to this consumer, in log order.
    pub async fn poll(&mut self, log: &ProgressLog) -> Vec<ProgressUpdate> {
        let fresh: Vec<ProgressUpdate> = log
            .snapshot()
            .await
            .into_iter()
            .filter(|u| self.delivered.insert((u.owner_id.clone(), u.sequence)))
            .collect();

        // Evicted discovery entries can never come back, so forget them.
        if let Some(floor) = log.discovery_floor().await {
            self.delivered
                .retain(|(owner, seq)| owner != DISCOVERY_OWNER || *seq >= floor);
        }
        fresh
    }

    pub fn delivered_count(&self) -> usize {
        self.delivered.len()
    }
}

/// Endless stream of new log entries for one consumer.
pub fn feed(log: ProgressLog, tick: Duration) -> impl Stream<Item = ProgressUpdate> {
    async_stream::stream! {
        let mut cursor = FeedCursor::new();
        loop {
            for update in cursor.poll(&log).await {
                yield update;
            }
            log.wait_for_append(tick).await;
        }
    }
}
