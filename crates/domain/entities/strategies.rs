use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{
    enums::risk_levels::RiskLevel, strategies::GenerateStrategyResponse, video::VideoContent,
};

/// A generated strategy as shown on the result screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StrategyEntity {
    pub id: Option<String>,
    pub intent: String,
    pub plan: String,
    pub risk_reward: String,
    pub apy: String,
    pub risk_level: RiskLevel,
    pub timestamp: String,
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl StrategyEntity {
    pub fn from_generated(
        intent: &str,
        generated: GenerateStrategyResponse,
        timestamp: String,
    ) -> Self {
        Self {
            id: generated.id,
            intent: intent.to_string(),
            plan: generated.plan,
            risk_reward: generated.risk_reward,
            apy: generated.apy,
            risk_level: generated.risk_level,
            timestamp,
            title: generated.title,
            tags: generated.tags,
        }
    }

    pub fn video_content(&self) -> VideoContent {
        VideoContent {
            intent: self.intent.clone(),
            plan: self.plan.clone(),
            risk_reward: self.risk_reward.clone(),
            apy: self.apy.clone(),
            risk_level: self.risk_level.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StrategyHistoryEntity {
    pub id: String,
    pub title: String,
    pub intent: String,
    pub plan: String,
    pub risk_reward: String,
    pub apy: String,
    pub risk_level: RiskLevel,
    pub timestamp: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
}

impl StrategyHistoryEntity {
    pub fn is_favorite(&self) -> bool {
        self.is_favorite.unwrap_or(false)
    }

    pub fn to_strategy(&self) -> StrategyEntity {
        StrategyEntity {
            id: Some(self.id.clone()),
            intent: self.intent.clone(),
            plan: self.plan.clone(),
            risk_reward: self.risk_reward.clone(),
            apy: self.apy.clone(),
            risk_level: self.risk_level,
            timestamp: self.timestamp.clone(),
            title: Some(self.title.clone()),
            tags: self.tags.clone(),
        }
    }
}
