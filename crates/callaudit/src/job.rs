//! Job data model: uploaded calls moving toward a simulated audit result.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque job identifier, assigned on creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Category of recording a job carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Audio,
    Video,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Uploading,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    /// Every state, in lifecycle order.
    pub const ALL: [JobState; 5] = [
        JobState::Queued,
        JobState::Uploading,
        JobState::Processing,
        JobState::Completed,
        JobState::Failed,
    ];

    /// Returns true for states no tick will move a job out of.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }

    /// Returns true while an upload slot is occupied.
    pub fn is_active_upload(&self) -> bool {
        matches!(self, JobState::Uploading)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Uploading => "uploading",
            JobState::Processing => "processing",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "queued" => Ok(JobState::Queued),
            "uploading" => Ok(JobState::Uploading),
            "processing" => Ok(JobState::Processing),
            "completed" => Ok(JobState::Completed),
            "failed" | "error" => Ok(JobState::Failed),
            other => Err(format!("unknown job state '{}'", other)),
        }
    }
}

/// Display and filtering attributes. Nothing in the lifecycle depends on them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMetadata {
    /// Call length as shown in the UI, e.g. `45:32`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// Sales rep who owns the call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rep: Option<String>,
    /// Lead the call is associated with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl JobMetadata {
    pub fn with_rep(mut self, rep: impl Into<String>) -> Self {
        self.rep = Some(rep.into());
        self
    }

    pub fn with_lead_id(mut self, lead_id: impl Into<String>) -> Self {
        self.lead_id = Some(lead_id.into());
        self
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }
}

/// A unit of work offered for upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDescriptor {
    pub name: String,
    pub size_bytes: u64,
    /// `audio`, `video`, `unknown`, or a full MIME type such as `audio/mpeg`.
    pub mime_category: String,
    #[serde(default)]
    pub metadata: JobMetadata,
}

impl UploadDescriptor {
    pub fn new(name: impl Into<String>, size_bytes: u64, mime_category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            mime_category: mime_category.into(),
            metadata: JobMetadata::default(),
        }
    }

    /// Builds a descriptor whose category is guessed from the file name.
    /// Unknown extensions yield the `unknown` category.
    pub fn from_file_name(name: impl Into<String>, size_bytes: u64) -> Self {
        let name = name.into();
        let mime_category = crate::media::guess_mime(&name).unwrap_or_else(|| "unknown".to_string());
        Self::new(name, size_bytes, mime_category)
    }

    pub fn with_metadata(mut self, metadata: JobMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A tracked job. Fields are read-only outside the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub(crate) id: JobId,
    pub(crate) label: String,
    pub(crate) kind: MediaKind,
    pub(crate) size_bytes: u64,
    pub(crate) progress: f64,
    pub(crate) state: JobState,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) metadata: JobMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
    pub(crate) attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) handoff_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) completes_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub(crate) seq: u64,
}

impl Job {
    pub(crate) fn new(
        label: String,
        kind: MediaKind,
        size_bytes: u64,
        state: JobState,
        created_at: DateTime<Utc>,
        metadata: JobMetadata,
        seq: u64,
    ) -> Self {
        Self {
            id: JobId::generate(),
            label,
            kind,
            size_bytes,
            progress: 0.0,
            state,
            created_at,
            metadata,
            error: None,
            attempts: 1,
            handoff_at: None,
            completes_at: None,
            seq,
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Progress in `[0, 100]`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn metadata(&self) -> &JobMetadata {
        &self.metadata
    }

    /// Reason recorded when the job was failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// How many times the job has been started, counting retries.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Deadline of the processing phase, set on hand-off.
    pub fn completes_at(&self) -> Option<DateTime<Utc>> {
        self.completes_at
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    /// Case-insensitive match against label, rep and lead id.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        let contains = |value: &str| value.to_lowercase().contains(&term);
        contains(&self.label)
            || self.metadata.rep.as_deref().is_some_and(contains)
            || self.metadata.lead_id.as_deref().is_some_and(contains)
    }
}

/// A job inserted directly in an arbitrary state, e.g. mock history.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSeed {
    pub label: String,
    pub kind: MediaKind,
    pub state: JobState,
    pub progress: f64,
    pub created_at: DateTime<Utc>,
    pub size_bytes: u64,
    pub metadata: JobMetadata,
    pub error: Option<String>,
}

impl JobSeed {
    pub fn new(label: impl Into<String>, kind: MediaKind, state: JobState, created_at: DateTime<Utc>) -> Self {
        Self {
            label: label.into(),
            kind,
            state,
            progress: 0.0,
            created_at,
            size_bytes: 0,
            metadata: JobMetadata::default(),
            error: None,
        }
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_metadata(mut self, metadata: JobMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Progress consistent with the seeded state.
    pub(crate) fn normalized_progress(&self) -> f64 {
        let clamped = if self.progress.is_finite() {
            self.progress.clamp(0.0, 100.0)
        } else {
            0.0
        };
        match self.state {
            JobState::Queued => 0.0,
            JobState::Processing | JobState::Completed => 100.0,
            JobState::Uploading | JobState::Failed => clamped,
        }
    }
}
