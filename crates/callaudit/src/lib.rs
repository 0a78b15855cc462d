//! Simulated upload and audit pipeline for recorded sales calls.
//!
//! Jobs are submitted as upload descriptors, advanced by ticks through
//! `queued → uploading → processing → completed`, and may be failed and
//! retried explicitly. Time and randomness are injected so the whole
//! lifecycle can be replayed deterministically.

pub mod broadcast;
pub mod clock;
pub mod config;
pub mod driver;
pub mod error;
pub mod job;
pub mod machine;
pub mod media;
pub mod query;
pub mod random;
pub mod simulator;
pub mod telemetry;

pub use broadcast::{JobEvent, JobEventBroadcaster, JobEventKind};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{load_config, AdmissionPolicy, DelayRange, SimulatorConfig};
pub use driver::TickDriver;
pub use error::{CallAuditError, ConfigError, DriverError, Result, SimulatorError};
pub use job::{Job, JobId, JobMetadata, JobSeed, JobState, MediaKind, UploadDescriptor};
pub use query::{JobListResponse, JobQuery, StatusCounts};
pub use random::{FixedRandom, RandomSource, SequenceRandom, ThreadRandom};
pub use simulator::{BatchSubmission, JobSimulator, SharedSimulator, TickReport};
