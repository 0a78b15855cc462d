//! Filtering, pagination and counts over job snapshots.

use serde::{Deserialize, Serialize};

use crate::job::{Job, JobState, MediaKind};

/// Query parameters for job listing.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobQuery {
    pub state: Option<JobState>,
    pub kind: Option<MediaKind>,
    /// Case-insensitive match on file name, rep or lead id.
    pub search: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl JobQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(mut self, state: JobState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_kind(mut self, kind: MediaKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, job: &Job) -> bool {
        if self.state.is_some_and(|state| job.state() != state) {
            return false;
        }
        if self.kind.is_some_and(|kind| job.kind() != kind) {
            return false;
        }
        match &self.search {
            Some(term) => job.matches_search(term),
            None => true,
        }
    }

    /// Applies offset and limit to an already filtered and ordered listing.
    pub fn paginate(&self, jobs: Vec<Job>) -> JobListResponse {
        let total = jobs.len();
        let offset = self.offset.unwrap_or(0);
        let limit = self.limit.unwrap_or(usize::MAX);
        let jobs = jobs.into_iter().skip(offset).take(limit).collect();

        JobListResponse {
            jobs,
            total,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Response for job listing with pagination.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListResponse {
    pub jobs: Vec<Job>,
    /// Matching jobs before pagination.
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

/// Number of jobs in each state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub queued: usize,
    pub uploading: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

impl StatusCounts {
    pub fn from_jobs<'a>(jobs: impl IntoIterator<Item = &'a Job>) -> Self {
        let mut counts = Self::default();
        for job in jobs {
            match job.state() {
                JobState::Queued => counts.queued += 1,
                JobState::Uploading => counts.uploading += 1,
                JobState::Processing => counts.processing += 1,
                JobState::Completed => counts.completed += 1,
                JobState::Failed => counts.failed += 1,
            }
        }
        counts
    }

    pub fn get(&self, state: JobState) -> usize {
        match state {
            JobState::Queued => self.queued,
            JobState::Uploading => self.uploading,
            JobState::Processing => self.processing,
            JobState::Completed => self.completed,
            JobState::Failed => self.failed,
        }
    }

    pub fn total(&self) -> usize {
        self.queued + self.uploading + self.processing + self.completed + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobMetadata;
    use chrono::Utc;

    fn job(label: &str, kind: MediaKind, state: JobState, rep: &str) -> Job {
        Job::new(
            label.to_string(),
            kind,
            0,
            state,
            Utc::now(),
            JobMetadata::default().with_rep(rep),
            0,
        )
    }

    fn sample() -> Vec<Job> {
        vec![
            job("sales_call_john.mp3", MediaKind::Audio, JobState::Processing, "John Smith"),
            job("demo_call_sarah.mp4", MediaKind::Video, JobState::Processing, "Sarah Johnson"),
            job("follow_up_mike.wav", MediaKind::Audio, JobState::Completed, "Mike Wilson"),
            job("cold_call_lisa.mp3", MediaKind::Audio, JobState::Failed, "Lisa Chen"),
        ]
    }

    #[test]
    fn test_state_and_kind_filters() {
        let jobs = sample();
        let query = JobQuery::new().with_state(JobState::Processing);
        assert_eq!(jobs.iter().filter(|j| query.matches(j)).count(), 2);

        let query = query.with_kind(MediaKind::Video);
        let matched: Vec<_> = jobs.iter().filter(|j| query.matches(j)).collect();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].label(), "demo_call_sarah.mp4");
    }

    #[test]
    fn test_search_filter() {
        let jobs = sample();
        let query = JobQuery::new().with_search("CHEN");
        let matched: Vec<_> = jobs.iter().filter(|j| query.matches(j)).collect();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].state(), JobState::Failed);
    }

    #[test]
    fn test_paginate_reports_total() {
        let response = JobQuery::new().page(1, 2).paginate(sample());
        assert_eq!(response.total, 4);
        assert_eq!(response.jobs.len(), 2);
        assert_eq!(response.jobs[0].label(), "demo_call_sarah.mp4");

        let response = JobQuery::new().page(10, 2).paginate(sample());
        assert_eq!(response.total, 4);
        assert!(response.jobs.is_empty());
    }

    #[test]
    fn test_query_deserializes_from_camel_case() {
        let query: JobQuery =
            serde_json::from_str(r#"{ "state": "completed", "kind": "audio", "search": "mike" }"#).unwrap();
        assert_eq!(query.state, Some(JobState::Completed));
        assert_eq!(query.kind, Some(MediaKind::Audio));
        assert_eq!(query.search.as_deref(), Some("mike"));
    }

    #[test]
    fn test_counts() {
        let counts = StatusCounts::from_jobs(&sample());
        assert_eq!(counts.processing, 2);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.get(JobState::Queued), 0);
        assert_eq!(counts.total(), 4);
    }
}
