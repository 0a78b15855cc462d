//! Test harness for deterministic simulator runs.

#![allow(dead_code)]

use chrono::{DateTime, Utc};

use callaudit::{
    Job, JobId, JobSimulator, ManualClock, RandomSource, SimulatorConfig, TickReport,
};

/// A simulator on a manual clock that only moves when the test says so.
pub struct SimHarness {
    pub simulator: JobSimulator,
    pub clock: ManualClock,
    /// Clock time the harness started at.
    pub start: DateTime<Utc>,
}

impl SimHarness {
    pub fn new(config: SimulatorConfig, random: impl RandomSource) -> Self {
        let start = Utc::now();
        let clock = ManualClock::new(start);
        let simulator = JobSimulator::with_sources(config, random, clock.clone());
        Self {
            simulator,
            clock,
            start,
        }
    }

    /// Advances the clock by `ms` and ticks once.
    pub fn tick_after(&mut self, ms: i64) -> TickReport {
        let now = self.clock.advance_ms(ms);
        self.simulator.tick(now)
    }

    /// Ticks `count` times, `every_ms` apart, returning every report.
    pub fn run(&mut self, count: usize, every_ms: i64) -> Vec<TickReport> {
        (0..count).map(|_| self.tick_after(every_ms)).collect()
    }

    /// Snapshot of a job that must exist.
    pub fn job(&self, id: &JobId) -> Job {
        self.simulator
            .get(id)
            .unwrap_or_else(|| panic!("job {} should exist", id))
    }
}
