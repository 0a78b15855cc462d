//! In-memory job collection driven through its lifecycle by ticks.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info_span, warn};

use crate::broadcast::{JobEvent, JobEventBroadcaster, JobEventKind};
use crate::clock::{Clock, SystemClock};
use crate::config::{validate_config, AdmissionPolicy, SimulatorConfig};
use crate::error::{ConfigError, SimulatorError};
use crate::job::{Job, JobId, JobSeed, JobState, UploadDescriptor};
use crate::machine::{self, TickFault};
use crate::media;
use crate::query::{JobListResponse, JobQuery, StatusCounts};
use crate::random::{RandomSource, ThreadRandom};

/// A simulator shared between a tick driver and its readers.
pub type SharedSimulator = Arc<Mutex<JobSimulator>>;

/// Outcome of one tick.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickReport {
    /// Jobs moved from queued to uploading.
    pub admitted: Vec<JobId>,
    /// Jobs whose upload progress increased.
    pub progressed: Vec<JobId>,
    /// Jobs that entered processing.
    pub handed_off: Vec<JobId>,
    pub completed: Vec<JobId>,
    /// Jobs left unchanged because advancing them faulted.
    pub faults: Vec<(JobId, TickFault)>,
}

impl TickReport {
    pub fn is_idle(&self) -> bool {
        self.admitted.is_empty()
            && self.progressed.is_empty()
            && self.handed_off.is_empty()
            && self.completed.is_empty()
            && self.faults.is_empty()
    }
}

/// Result of submitting several files at once.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BatchSubmission {
    pub accepted: Vec<JobId>,
    pub rejected: Vec<SimulatorError>,
}

/// Owns a collection of jobs and advances them on each tick.
pub struct JobSimulator {
    config: SimulatorConfig,
    jobs: HashMap<JobId, Job>,
    random: Box<dyn RandomSource>,
    clock: Arc<dyn Clock>,
    events: Option<JobEventBroadcaster>,
    next_seq: u64,
}

impl JobSimulator {
    /// Creates a simulator with entropy-seeded randomness and the system clock.
    ///
    /// The config is taken as is; use [`JobSimulator::validated`] for configs
    /// that come from outside.
    pub fn new(config: SimulatorConfig) -> Self {
        Self::with_sources(config, ThreadRandom::new(), SystemClock)
    }

    /// Creates a simulator after validating the config.
    pub fn validated(config: SimulatorConfig) -> Result<Self, ConfigError> {
        validate_config(&config)?;
        Ok(Self::new(config))
    }

    /// Creates a simulator with explicit randomness and clock. Like `new`, this
    /// does not validate the config.
    pub fn with_sources<R: RandomSource, C: Clock>(config: SimulatorConfig, random: R, clock: C) -> Self {
        Self {
            config,
            jobs: HashMap::new(),
            random: Box::new(random),
            clock: Arc::new(clock),
            events: None,
            next_seq: 0,
        }
    }

    /// Streams lifecycle events to the given broadcaster.
    pub fn with_broadcaster(mut self, broadcaster: JobEventBroadcaster) -> Self {
        self.events = Some(broadcaster);
        self
    }

    pub fn into_shared(self) -> SharedSimulator {
        Arc::new(Mutex::new(self))
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Current time according to the simulator's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn get(&self, id: &JobId) -> Option<Job> {
        self.jobs.get(id).cloned()
    }

    /// Accepts an upload and returns the new job's id.
    ///
    /// Unsupported media is rejected and nothing is created.
    pub fn submit(&mut self, descriptor: UploadDescriptor) -> Result<JobId, SimulatorError> {
        let kind = media::classify(&descriptor, &self.config.accepted_mime_types)?;
        let now = self.clock.now();
        let state = if self.config.admission == AdmissionPolicy::Immediate && self.has_upload_capacity() {
            JobState::Uploading
        } else {
            JobState::Queued
        };

        let job = Job::new(
            descriptor.name,
            kind,
            descriptor.size_bytes,
            state,
            now,
            descriptor.metadata,
            self.take_seq(),
        );
        let id = job.id.clone();
        debug!(job_id = %id, label = %job.label, state = %state, "job submitted");
        self.emit(&job, JobEventKind::Submitted, now);
        self.jobs.insert(id.clone(), job);
        Ok(id)
    }

    /// Submits every descriptor, keeping the accepted ones.
    pub fn submit_batch(&mut self, descriptors: impl IntoIterator<Item = UploadDescriptor>) -> BatchSubmission {
        let mut batch = BatchSubmission::default();
        for descriptor in descriptors {
            match self.submit(descriptor) {
                Ok(id) => batch.accepted.push(id),
                Err(e) => batch.rejected.push(e),
            }
        }
        batch
    }

    /// Inserts a job directly in any state.
    pub fn seed(&mut self, seed: JobSeed) -> JobId {
        let progress = seed.normalized_progress();
        let mut job = Job::new(
            seed.label,
            seed.kind,
            seed.size_bytes,
            seed.state,
            seed.created_at,
            seed.metadata,
            self.take_seq(),
        );
        job.progress = progress;
        if seed.state == JobState::Failed {
            job.error = seed.error;
        }
        let id = job.id.clone();
        self.jobs.insert(id.clone(), job);
        id
    }

    /// Advances every non-terminal job by one step.
    ///
    /// Never fails: a job that faults keeps its previous state for this tick.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickReport {
        let _span = info_span!("simulator.tick", jobs = self.jobs.len()).entered();
        let mut report = TickReport::default();

        report.admitted = self.admit_queued(now);
        let skip: HashSet<&JobId> = report.admitted.iter().collect();

        // Oldest first, so a fixed random sequence always feeds the same jobs.
        let mut active: Vec<(DateTime<Utc>, u64, JobId)> = self
            .jobs
            .values()
            .filter(|job| matches!(job.state, JobState::Uploading | JobState::Processing))
            .filter(|job| !skip.contains(&job.id))
            .map(|job| (job.created_at, job.seq, job.id.clone()))
            .collect();
        active.sort();

        for (_, _, id) in active {
            let Some(current) = self.jobs.get(&id) else {
                continue;
            };
            let mut candidate = current.clone();

            match machine::advance(&mut candidate, &self.config, now, self.random.as_mut()) {
                Ok(steps) => {
                    for step in steps {
                        match step {
                            JobEventKind::Progress => report.progressed.push(id.clone()),
                            JobEventKind::HandedOff => {
                                debug!(job_id = %id, "upload handed off to processing");
                                report.handed_off.push(id.clone());
                            }
                            JobEventKind::Completed => {
                                debug!(job_id = %id, "audit completed");
                                report.completed.push(id.clone());
                            }
                            _ => {}
                        }
                        self.emit(&candidate, step, now);
                    }
                    self.jobs.insert(id, candidate);
                }
                Err(fault) => {
                    warn!(job_id = %id, error = %fault, "job left unchanged this tick");
                    report.faults.push((id, fault));
                }
            }
        }

        report
    }

    /// Ticks using the simulator's own clock.
    pub fn tick_now(&mut self) -> TickReport {
        let now = self.clock.now();
        self.tick(now)
    }

    /// Restarts a failed job from zero.
    ///
    /// Returns the state the job re-entered (uploading when it could be
    /// admitted straight away, queued otherwise).
    pub fn retry(&mut self, id: &JobId) -> Result<JobState, SimulatorError> {
        let state = self
            .jobs
            .get(id)
            .map(|job| job.state)
            .ok_or_else(|| SimulatorError::NotFound(id.clone()))?;
        if state != JobState::Failed {
            return Err(SimulatorError::InvalidRetryState {
                id: id.clone(),
                state,
            });
        }

        let next = if self.config.admission == AdmissionPolicy::Immediate && self.has_upload_capacity() {
            JobState::Uploading
        } else {
            JobState::Queued
        };
        let now = self.clock.now();

        let job = self
            .jobs
            .get_mut(id)
            .ok_or_else(|| SimulatorError::NotFound(id.clone()))?;
        job.state = next;
        job.progress = 0.0;
        job.error = None;
        job.handoff_at = None;
        job.completes_at = None;
        job.attempts += 1;
        debug!(job_id = %id, attempt = job.attempts, state = %next, "job retried");

        let event = JobEvent::from_job(job, JobEventKind::Retried, now);
        self.send(event);
        Ok(next)
    }

    /// Marks a job as failed.
    ///
    /// Queued jobs can be failed as well as uploading and processing ones, so a
    /// caller can cancel work that never started. Terminal jobs cannot be failed.
    pub fn fail(&mut self, id: &JobId, reason: impl Into<String>) -> Result<(), SimulatorError> {
        let now = self.clock.now();
        let job = self
            .jobs
            .get_mut(id)
            .ok_or_else(|| SimulatorError::NotFound(id.clone()))?;
        if job.state.is_terminal() {
            return Err(SimulatorError::InvalidTransition {
                id: id.clone(),
                from: job.state,
                to: JobState::Failed,
            });
        }

        job.state = JobState::Failed;
        job.error = Some(reason.into());
        job.handoff_at = None;
        job.completes_at = None;
        warn!(job_id = %id, error = job.error.as_deref().unwrap_or_default(), "job failed");

        let event = JobEvent::from_job(job, JobEventKind::Failed, now);
        self.send(event);
        Ok(())
    }

    /// Deletes a job in any state and returns it.
    pub fn remove(&mut self, id: &JobId) -> Result<Job, SimulatorError> {
        let job = self
            .jobs
            .remove(id)
            .ok_or_else(|| SimulatorError::NotFound(id.clone()))?;
        debug!(job_id = %id, "job removed");
        self.emit(&job, JobEventKind::Removed, self.clock.now());
        Ok(job)
    }

    /// Snapshot of the jobs matching `filter`, most recently created first.
    pub fn list<F>(&self, filter: F) -> Vec<Job>
    where
        F: Fn(&Job) -> bool,
    {
        let mut jobs: Vec<Job> = self.jobs.values().filter(|job| filter(job)).cloned().collect();
        jobs.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.seq.cmp(&a.seq))
        });
        jobs
    }

    pub fn list_all(&self) -> Vec<Job> {
        self.list(|_| true)
    }

    pub fn query(&self, query: &JobQuery) -> JobListResponse {
        query.paginate(self.list(|job| query.matches(job)))
    }

    pub fn counts(&self) -> StatusCounts {
        StatusCounts::from_jobs(self.jobs.values())
    }

    /// Time left before a processing job completes.
    pub fn estimated_completion(&self, id: &JobId, now: DateTime<Utc>) -> Option<Duration> {
        let job = self.jobs.get(id)?;
        if job.state != JobState::Processing {
            return None;
        }
        let remaining = job.completes_at? - now;
        Some(remaining.max(Duration::zero()))
    }

    fn has_upload_capacity(&self) -> bool {
        match self.config.max_active_uploads {
            Some(limit) => self.active_uploads() < limit,
            None => true,
        }
    }

    fn active_uploads(&self) -> usize {
        self.jobs.values().filter(|job| job.state.is_active_upload()).count()
    }

    /// Moves queued jobs into uploading, oldest first, while capacity allows.
    fn admit_queued(&mut self, now: DateTime<Utc>) -> Vec<JobId> {
        let mut queued: Vec<(DateTime<Utc>, u64, JobId)> = self
            .jobs
            .values()
            .filter(|job| job.state == JobState::Queued)
            .map(|job| (job.created_at, job.seq, job.id.clone()))
            .collect();
        queued.sort();

        let mut admitted = Vec::new();
        for (_, _, id) in queued {
            if !self.has_upload_capacity() {
                break;
            }
            if let Some(job) = self.jobs.get_mut(&id) {
                job.state = JobState::Uploading;
                let event = JobEvent::from_job(job, JobEventKind::Admitted, now);
                self.send(event);
                debug!(job_id = %id, "job admitted");
                admitted.push(id);
            }
        }
        admitted
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn emit(&self, job: &Job, kind: JobEventKind, now: DateTime<Utc>) {
        if self.events.is_some() {
            self.send(JobEvent::from_job(job, kind, now));
        }
    }

    fn send(&self, event: JobEvent) {
        if let Some(events) = &self.events {
            events.send(event);
        }
    }
}

impl std::fmt::Debug for JobSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobSimulator")
            .field("config", &self.config)
            .field("jobs", &self.jobs.len())
            .field("events", &self.events)
            .finish()
    }
}
