use serde::{Deserialize, Serialize};

use crate::media::DEFAULT_ACCEPTED_MIME_TYPES;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default = "default_version")]
    pub version: String,
    /// Interval between ticks when driven by a `TickDriver`.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Upper bound of the per-tick upload increment, in percent.
    #[serde(default = "default_upload_increment_max")]
    pub upload_increment_max: f64,
    /// Latency between upload reaching 100 and processing starting.
    #[serde(default = "default_handoff_delay")]
    pub handoff_delay_ms: DelayRange,
    /// Time a job spends in processing before completing.
    #[serde(default = "default_processing_delay")]
    pub processing_delay_ms: DelayRange,
    #[serde(default)]
    pub admission: AdmissionPolicy,
    /// Maximum number of jobs uploading at once. `None` means unlimited.
    #[serde(default)]
    pub max_active_uploads: Option<usize>,
    #[serde(default = "default_accepted_mime_types")]
    pub accepted_mime_types: Vec<String>,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_tick_interval_ms() -> u64 {
    200
}

fn default_upload_increment_max() -> f64 {
    10.0
}

fn default_handoff_delay() -> DelayRange {
    DelayRange::new(500, 800)
}

fn default_processing_delay() -> DelayRange {
    DelayRange::new(2000, 7000)
}

fn default_accepted_mime_types() -> Vec<String> {
    DEFAULT_ACCEPTED_MIME_TYPES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            tick_interval_ms: default_tick_interval_ms(),
            upload_increment_max: default_upload_increment_max(),
            handoff_delay_ms: default_handoff_delay(),
            processing_delay_ms: default_processing_delay(),
            admission: AdmissionPolicy::default(),
            max_active_uploads: None,
            accepted_mime_types: default_accepted_mime_types(),
        }
    }
}

impl SimulatorConfig {
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }
}

/// Inclusive range of milliseconds a delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min: u64,
    pub max: u64,
}

impl DelayRange {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// A range that always yields `ms`.
    pub const fn fixed(ms: u64) -> Self {
        Self { min: ms, max: ms }
    }

    /// Maps a unit draw in `[0, 1]` onto the range.
    pub fn pick(&self, unit: f64) -> u64 {
        let span = self.max.saturating_sub(self.min);
        let offset = ((span as f64) * unit).round() as u64;
        self.min.saturating_add(offset.min(span))
    }
}

/// When a submitted job moves from queued to uploading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionPolicy {
    /// Admitted on submission when capacity allows.
    #[default]
    Immediate,
    /// Always queued, admitted by the next tick.
    NextTick,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimulatorConfig::default();
        assert_eq!(config.upload_increment_max, 10.0);
        assert_eq!(config.handoff_delay_ms, DelayRange::new(500, 800));
        assert_eq!(config.processing_delay_ms, DelayRange::new(2000, 7000));
        assert_eq!(config.admission, AdmissionPolicy::Immediate);
        assert!(config.max_active_uploads.is_none());
        assert_eq!(config.accepted_mime_types.len(), 5);
    }

    #[test]
    fn test_delay_pick() {
        let range = DelayRange::new(2000, 7000);
        assert_eq!(range.pick(0.0), 2000);
        assert_eq!(range.pick(1.0), 7000);
        assert_eq!(range.pick(0.5), 4500);
        assert_eq!(DelayRange::fixed(3000).pick(0.9), 3000);
    }

    #[test]
    fn test_delay_pick_saturates_on_huge_span() {
        let range = DelayRange::new(1, u64::MAX);
        assert_eq!(range.pick(1.0), u64::MAX);
        assert_eq!(range.pick(0.0), 1);
        assert!(range.pick(0.5) > 1);
    }
}
