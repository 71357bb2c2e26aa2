use serde::{Deserialize, Serialize};

use super::enums::video_phases::VideoPhase;

pub const DEFAULT_VIDEO_TEMPLATE: &str = "defi-strategy-explanation";
pub const DEFAULT_VIDEO_VOICE: &str = "professional-male";

/// Strategy content the avatar video explains.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoContent {
    pub intent: String,
    pub plan: String,
    pub risk_reward: String,
    pub apy: String,
    pub risk_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_id: Option<String>,
    pub content: VideoContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
}

impl GenerateVideoRequest {
    pub fn new(strategy_id: Option<String>, content: VideoContent) -> Self {
        Self {
            strategy_id,
            content,
            template: Some(DEFAULT_VIDEO_TEMPLATE.to_string()),
            voice: Some(DEFAULT_VIDEO_VOICE.to_string()),
            persona: None,
        }
    }
}

/// Response to a generation request. Only the job id is guaranteed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoSubmission {
    pub video_id: String,
    #[serde(default)]
    pub status: Option<VideoPhase>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VideoMetadata {
    pub duration: Option<f64>,
    pub size: Option<u64>,
    pub quality: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatus {
    #[serde(default)]
    pub video_id: Option<String>,
    pub status: VideoPhase,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub metadata: Option<VideoMetadata>,
}
