use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Display;

use super::job_states::JobState;

/// Phase string reported by the video generation service.
///
/// The set is open-ended: anything the client does not recognise is kept
/// verbatim in `Other` and treated as still in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoPhase {
    Queued,
    Processing,
    Rendering,
    Completed,
    Failed,
    Other(String),
}

impl VideoPhase {
    pub fn as_str(&self) -> &str {
        match self {
            VideoPhase::Queued => "queued",
            VideoPhase::Processing => "processing",
            VideoPhase::Rendering => "rendering",
            VideoPhase::Completed => "completed",
            VideoPhase::Failed => "failed",
            VideoPhase::Other(raw) => raw.as_str(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, VideoPhase::Completed | VideoPhase::Failed)
    }

    pub fn job_state(&self) -> JobState {
        match self {
            VideoPhase::Queued => JobState::Queued,
            VideoPhase::Processing | VideoPhase::Other(_) => JobState::Processing,
            VideoPhase::Rendering => JobState::Rendering,
            VideoPhase::Completed => JobState::Completed,
            VideoPhase::Failed => JobState::Failed,
        }
    }

    pub fn display_text(&self) -> String {
        match self {
            VideoPhase::Queued => "Queued for processing...".to_string(),
            VideoPhase::Processing => "Processing video content...".to_string(),
            VideoPhase::Rendering => "Rendering final video...".to_string(),
            VideoPhase::Completed => "Video generation completed!".to_string(),
            VideoPhase::Failed => "Video generation failed".to_string(),
            VideoPhase::Other(raw) => format!("Status: {raw}"),
        }
    }
}

impl From<&str> for VideoPhase {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "queued" => VideoPhase::Queued,
            "processing" => VideoPhase::Processing,
            "rendering" => VideoPhase::Rendering,
            "completed" => VideoPhase::Completed,
            "failed" => VideoPhase::Failed,
            _ => VideoPhase::Other(value.to_string()),
        }
    }
}

impl Display for VideoPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for VideoPhase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for VideoPhase {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(VideoPhase::from(raw.as_str()))
    }
}
