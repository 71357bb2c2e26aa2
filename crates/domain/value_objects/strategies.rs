use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::strategies::StrategyHistoryEntity, value_objects::enums::risk_levels::RiskLevel,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StrategyPreferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_tolerance: Option<RiskLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investment_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_horizon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateStrategyRequest {
    pub intent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_transcript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<StrategyPreferences>,
}

impl CreateStrategyRequest {
    pub fn from_transcript(transcript: &str) -> Self {
        Self {
            intent: transcript.to_string(),
            voice_transcript: Some(transcript.to_string()),
            preferences: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStrategyRequest {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_transcript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<StrategyPreferences>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateStrategyResponse {
    pub id: Option<String>,
    pub title: Option<String>,
    pub plan: String,
    pub risk_reward: String,
    pub apy: String,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// History listing comes back either as `{ "strategies": [...] }` or as a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StrategyHistoryPayload {
    Wrapped { strategies: Vec<StrategyHistoryEntity> },
    Plain(Vec<StrategyHistoryEntity>),
}

impl StrategyHistoryPayload {
    pub fn into_items(self) -> Vec<StrategyHistoryEntity> {
        match self {
            StrategyHistoryPayload::Wrapped { strategies } => strategies,
            StrategyHistoryPayload::Plain(items) => items,
        }
    }
}
