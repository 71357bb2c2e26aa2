use chrono::Local;
use crates::domain::{
    entities::strategies::StrategyEntity, repositories::strategies::StrategyClient,
    value_objects::strategies::CreateStrategyRequest,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum StrategySessionError {
    #[error("Please describe what you want to do with your funds")]
    EmptyTranscript,

    #[error("Failed to generate strategy: {0}")]
    Generation(String),
}

/// Turns one spoken or typed intent into a displayed strategy.
pub struct StrategySession<S>
where
    S: StrategyClient + Send + Sync + 'static,
{
    strategy_client: Arc<S>,
}

impl<S> StrategySession<S>
where
    S: StrategyClient + Send + Sync + 'static,
{
    pub fn new(strategy_client: Arc<S>) -> Self {
        Self { strategy_client }
    }

    pub async fn generate_from_transcript(
        &self,
        transcript: &str,
    ) -> Result<StrategyEntity, StrategySessionError> {
        let transcript = transcript.trim();
        if transcript.is_empty() {
            return Err(StrategySessionError::EmptyTranscript);
        }

        let generated = self
            .strategy_client
            .generate_strategy(CreateStrategyRequest::from_transcript(transcript))
            .await
            .map_err(|err| {
                warn!(error = %err, "strategy_session: generation failed");
                StrategySessionError::Generation(format!("{err:#}"))
            })?;

        let strategy = StrategyEntity::from_generated(
            transcript,
            generated,
            Local::now().format("%-m/%-d/%Y").to_string(),
        );
        info!(
            strategy_id = ?strategy.id,
            risk_level = %strategy.risk_level,
            "strategy_session: strategy generated"
        );
        Ok(strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use crates::domain::{
        repositories::strategies::MockStrategyClient,
        value_objects::{
            enums::risk_levels::RiskLevel, strategies::GenerateStrategyResponse,
        },
    };

    fn generated() -> GenerateStrategyResponse {
        GenerateStrategyResponse {
            id: Some("s-1".to_string()),
            title: Some("Liquid staking".to_string()),
            plan: "Stake ETH with a liquid staking protocol".to_string(),
            risk_reward: "Low risk, steady yield".to_string(),
            apy: "4-6%".to_string(),
            risk_level: RiskLevel::Low,
            tags: None,
            confidence: Some(0.8),
        }
    }

    #[tokio::test]
    async fn maps_response_and_keeps_transcript_as_intent() {
        let mut client = MockStrategyClient::new();
        client
            .expect_generate_strategy()
            .withf(|req| {
                req.intent == "stake ETH" && req.voice_transcript.as_deref() == Some("stake ETH")
            })
            .times(1)
            .returning(|_| Ok(generated()));

        let session = StrategySession::new(Arc::new(client));
        let strategy = session.generate_from_transcript("  stake ETH ").await.unwrap();

        assert_eq!(strategy.id.as_deref(), Some("s-1"));
        assert_eq!(strategy.intent, "stake ETH");
        assert_eq!(strategy.apy, "4-6%");
        assert!(!strategy.timestamp.is_empty());
    }

    #[tokio::test]
    async fn blank_transcript_is_rejected_locally() {
        let mut client = MockStrategyClient::new();
        client.expect_generate_strategy().never();

        let session = StrategySession::new(Arc::new(client));
        let err = session.generate_from_transcript("   ").await.unwrap_err();
        assert!(matches!(err, StrategySessionError::EmptyTranscript));
    }

    #[tokio::test]
    async fn backend_failure_is_prefixed() {
        let mut client = MockStrategyClient::new();
        client
            .expect_generate_strategy()
            .returning(|_| Err(anyhow!("HTTP 503: Service Unavailable")));

        let session = StrategySession::new(Arc::new(client));
        let err = session.generate_from_transcript("stake ETH").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to generate strategy: HTTP 503: Service Unavailable"
        );
    }
}
