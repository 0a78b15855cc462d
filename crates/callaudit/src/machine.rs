//! Per-job state machine for a single tick.
//!
//! Processing is delay-based: once an upload is handed off, progress stays at
//! 100 and the job completes on the first tick at or after its deadline.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::broadcast::JobEventKind;
use crate::config::SimulatorConfig;
use crate::job::{Job, JobState};
use crate::random::RandomSource;

/// A problem advancing one job. The job is left as it was for that tick.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TickFault {
    #[error("random draw {value} is outside [0, 1]")]
    InvalidDraw { value: f64 },
    #[error("upload increment {value} is not a finite, non-negative number")]
    InvalidIncrement { value: f64 },
}

fn draw(random: &mut dyn RandomSource) -> Result<f64, TickFault> {
    let value = random.next_unit();
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(TickFault::InvalidDraw { value })
    }
}

fn after(now: DateTime<Utc>, ms: u64) -> DateTime<Utc> {
    let ms = i64::try_from(ms).unwrap_or(i64::MAX);
    Duration::try_milliseconds(ms)
        .and_then(|delay| now.checked_add_signed(delay))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Advances an admitted job by one tick and returns what happened, in order.
///
/// Queued and terminal jobs are returned untouched. On error `job` may have
/// been partially modified, so callers advance a copy and discard it.
pub fn advance(
    job: &mut Job,
    config: &SimulatorConfig,
    now: DateTime<Utc>,
    random: &mut dyn RandomSource,
) -> Result<Vec<JobEventKind>, TickFault> {
    match job.state {
        JobState::Uploading => advance_upload(job, config, now, random),
        JobState::Processing => advance_processing(job, config, now, random),
        JobState::Queued | JobState::Completed | JobState::Failed => Ok(Vec::new()),
    }
}

fn advance_upload(
    job: &mut Job,
    config: &SimulatorConfig,
    now: DateTime<Utc>,
    random: &mut dyn RandomSource,
) -> Result<Vec<JobEventKind>, TickFault> {
    let mut steps = Vec::new();

    if job.progress < 100.0 {
        let increment = draw(random)? * config.upload_increment_max;
        if !increment.is_finite() || increment < 0.0 {
            return Err(TickFault::InvalidIncrement { value: increment });
        }
        let next = (job.progress + increment).min(100.0);
        if next > job.progress {
            job.progress = next;
            steps.push(JobEventKind::Progress);
        }
    }

    if job.progress < 100.0 {
        return Ok(steps);
    }

    let handoff_at = match job.handoff_at {
        Some(at) => at,
        None => {
            let at = after(now, config.handoff_delay_ms.pick(draw(random)?));
            job.handoff_at = Some(at);
            at
        }
    };

    if now >= handoff_at {
        let completes_at = after(now, config.processing_delay_ms.pick(draw(random)?));
        if job.metadata.duration.is_none() {
            job.metadata.duration = Some(random_call_duration(random)?);
        }
        job.state = JobState::Processing;
        job.handoff_at = None;
        job.completes_at = Some(completes_at);
        steps.push(JobEventKind::HandedOff);
    }

    Ok(steps)
}

fn advance_processing(
    job: &mut Job,
    config: &SimulatorConfig,
    now: DateTime<Utc>,
    random: &mut dyn RandomSource,
) -> Result<Vec<JobEventKind>, TickFault> {
    // Seeded processing jobs get their deadline on the first tick that sees them.
    let completes_at = match job.completes_at {
        Some(at) => at,
        None => {
            let at = after(now, config.processing_delay_ms.pick(draw(random)?));
            job.completes_at = Some(at);
            at
        }
    };

    if now < completes_at {
        return Ok(Vec::new());
    }

    job.progress = 100.0;
    job.state = JobState::Completed;
    Ok(vec![JobEventKind::Completed])
}

/// A call length between 5:00 and 64:59, formatted `m:ss`.
fn random_call_duration(random: &mut dyn RandomSource) -> Result<String, TickFault> {
    let minutes = 5 + ((draw(random)? * 60.0).floor() as u32).min(59);
    let seconds = ((draw(random)? * 60.0).floor() as u32).min(59);
    Ok(format!("{}:{:02}", minutes, seconds))
}
