//! Builder patterns for creating test data programmatically.

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};

use callaudit::{
    AdmissionPolicy, DelayRange, JobMetadata, JobSeed, JobState, MediaKind, SimulatorConfig,
    UploadDescriptor,
};

/// Builder for creating `SimulatorConfig` instances.
pub struct ConfigBuilder {
    config: SimulatorConfig,
}

impl ConfigBuilder {
    /// Deterministic defaults: no hand-off latency, fixed 3s processing.
    pub fn new() -> Self {
        Self {
            config: SimulatorConfig {
                handoff_delay_ms: DelayRange::fixed(0),
                processing_delay_ms: DelayRange::fixed(3000),
                ..SimulatorConfig::default()
            },
        }
    }

    pub fn upload_increment_max(mut self, max: f64) -> Self {
        self.config.upload_increment_max = max;
        self
    }

    pub fn handoff_delay(mut self, range: DelayRange) -> Self {
        self.config.handoff_delay_ms = range;
        self
    }

    pub fn processing_delay(mut self, range: DelayRange) -> Self {
        self.config.processing_delay_ms = range;
        self
    }

    pub fn admission(mut self, policy: AdmissionPolicy) -> Self {
        self.config.admission = policy;
        self
    }

    pub fn max_active_uploads(mut self, limit: usize) -> Self {
        self.config.max_active_uploads = Some(limit);
        self
    }

    pub fn build(self) -> SimulatorConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Descriptor for an audio call.
pub fn audio_upload(name: &str) -> UploadDescriptor {
    UploadDescriptor::new(name, 4_200_000, "audio")
}

/// Descriptor for a video call.
pub fn video_upload(name: &str) -> UploadDescriptor {
    UploadDescriptor::new(name, 84_000_000, "video")
}

/// Builder for seeded jobs.
pub struct SeedBuilder {
    seed: JobSeed,
}

impl SeedBuilder {
    pub fn new(label: &str, state: JobState, created_at: DateTime<Utc>) -> Self {
        let kind = if label.ends_with(".mp4") || label.ends_with(".mov") {
            MediaKind::Video
        } else {
            MediaKind::Audio
        };
        Self {
            seed: JobSeed::new(label, kind, state, created_at),
        }
    }

    pub fn progress(mut self, progress: f64) -> Self {
        self.seed = self.seed.with_progress(progress);
        self
    }

    pub fn rep(mut self, rep: &str, lead_id: &str) -> Self {
        self.seed = self
            .seed
            .with_metadata(JobMetadata::default().with_rep(rep).with_lead_id(lead_id));
        self
    }

    pub fn error(mut self, error: &str) -> Self {
        self.seed = self.seed.with_error(error);
        self
    }

    pub fn build(self) -> JobSeed {
        self.seed
    }
}

/// The five audits shown on the progress screen, oldest first.
pub fn sample_audits(now: DateTime<Utc>) -> Vec<JobSeed> {
    vec![
        SeedBuilder::new("cold_call_lisa_outbound.mp3", JobState::Failed, now - Duration::hours(2))
            .rep("Lisa Chen", "OUT-923")
            .error("Processing failed. Please try re-uploading.")
            .build(),
        SeedBuilder::new("follow_up_mike_conversion.wav", JobState::Completed, now - Duration::hours(1))
            .rep("Mike Wilson", "CON-782")
            .progress(100.0)
            .build(),
        SeedBuilder::new("demo_call_sarah_enterprise_client.mp4", JobState::Processing, now - Duration::minutes(8))
            .rep("Sarah Johnson", "ENT-445")
            .progress(23.0)
            .build(),
        SeedBuilder::new("discovery_call_team_meeting.mp4", JobState::Completed, now - Duration::minutes(5))
            .rep("Team Lead", "DIS-156")
            .progress(100.0)
            .build(),
        SeedBuilder::new("sales_call_john_prospect_abc.mp3", JobState::Processing, now - Duration::minutes(2))
            .rep("John Smith", "ABC-001")
            .progress(67.0)
            .build(),
    ]
}
