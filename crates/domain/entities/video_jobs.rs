use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{
    enums::{job_states::JobState, video_phases::VideoPhase},
    video::VideoMetadata,
};

/// One remote video-generation request as tracked by the client.
///
/// Only the transition methods below mutate a job, which keeps the terminal
/// invariant (exactly one of `result_url` / `last_error`) and the write-once
/// `job_id` in one place.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VideoJob {
    pub job_id: Option<String>,
    pub state: JobState,
    pub phase_text: String,
    pub result_url: Option<String>,
    pub last_error: Option<String>,
    pub poll_interval_ms: u64,
    pub status_checks: u32,
    pub metadata: Option<VideoMetadata>,
}

impl VideoJob {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn submitting() -> Self {
        Self {
            state: JobState::Submitting,
            phase_text: "Initializing video generation...".to_string(),
            ..Self::default()
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Records the id handed out by the service. Returns false if an id was already assigned.
    pub fn accept(&mut self, job_id: &str, first_poll_ms: u64) -> bool {
        if self.job_id.is_some() || self.is_terminal() {
            return false;
        }
        self.job_id = Some(job_id.to_string());
        self.state = JobState::Queued;
        self.phase_text = "Video generation started...".to_string();
        self.poll_interval_ms = first_poll_ms;
        true
    }

    /// Applies a non-terminal phase and the delay before the next check.
    pub fn progress(&mut self, phase: &VideoPhase, next_poll_ms: u64) {
        if self.is_terminal() || phase.is_terminal() {
            return;
        }
        self.state = phase.job_state();
        self.phase_text = phase.display_text();
        self.poll_interval_ms = next_poll_ms;
    }

    pub fn record_status_check(&mut self) {
        self.status_checks = self.status_checks.saturating_add(1);
    }

    pub fn complete(&mut self, result_url: String, metadata: Option<VideoMetadata>) {
        if self.is_terminal() {
            return;
        }
        self.state = JobState::Completed;
        self.phase_text = VideoPhase::Completed.display_text();
        self.result_url = Some(result_url);
        self.last_error = None;
        self.metadata = metadata;
        self.poll_interval_ms = 0;
    }

    pub fn fail(&mut self, message: String) {
        if self.is_terminal() {
            return;
        }
        self.state = JobState::Failed;
        self.phase_text = VideoPhase::Failed.display_text();
        self.last_error = Some(message);
        self.result_url = None;
        self.poll_interval_ms = 0;
    }
}
