//! Job event broadcaster for real-time lifecycle streaming.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::job::{Job, JobId, JobState};

/// What happened to a job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobEventKind {
    Submitted,
    Admitted,
    Progress,
    HandedOff,
    Completed,
    Failed,
    Retried,
    Removed,
}

impl std::fmt::Display for JobEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobEventKind::Submitted => write!(f, "Submitted"),
            JobEventKind::Admitted => write!(f, "Uploading"),
            JobEventKind::Progress => write!(f, "Progress"),
            JobEventKind::HandedOff => write!(f, "Auditing"),
            JobEventKind::Completed => write!(f, "Completed"),
            JobEventKind::Failed => write!(f, "Failed"),
            JobEventKind::Retried => write!(f, "Retried"),
            JobEventKind::Removed => write!(f, "Removed"),
        }
    }
}

/// Lifecycle event for a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobEvent {
    pub job_id: JobId,
    /// Original file name.
    pub label: String,
    pub kind: JobEventKind,
    /// State after the event.
    pub state: JobState,
    pub progress: f64,
    /// Simulation time the event was produced at.
    pub timestamp: DateTime<Utc>,
    /// Failure reason (set on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobEvent {
    pub fn from_job(job: &Job, kind: JobEventKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            job_id: job.id().clone(),
            label: job.label().to_string(),
            kind,
            state: job.state(),
            progress: job.progress(),
            timestamp,
            error: job.error().map(|s| s.to_string()),
        }
    }
}

/// Broadcasts job events to any number of subscribers.
#[derive(Clone)]
pub struct JobEventBroadcaster {
    sender: Arc<broadcast::Sender<JobEvent>>,
}

impl JobEventBroadcaster {
    /// Creates a new broadcaster with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Sends an event to all subscribers.
    pub fn send(&self, event: JobEvent) {
        // No active receivers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for JobEventBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

impl std::fmt::Debug for JobEventBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobEventBroadcaster")
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}
