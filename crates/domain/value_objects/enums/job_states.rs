use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Local lifecycle stage of a tracked video job.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum JobState {
    #[default]
    Idle,
    Submitting,
    Queued,
    Processing,
    Rendering,
    Completed,
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Idle => "idle",
            JobState::Submitting => "submitting",
            JobState::Queued => "queued",
            JobState::Processing => "processing",
            JobState::Rendering => "rendering",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

impl Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
