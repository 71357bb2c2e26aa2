use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::{
    entities::strategies::StrategyHistoryEntity,
    value_objects::strategies::{
        CreateStrategyRequest, GenerateStrategyResponse, UpdateStrategyRequest,
    },
};

/// Backend that generates strategies from an intent and stores the user's history.
#[automock]
#[async_trait]
pub trait StrategyClient {
    async fn generate_strategy(
        &self,
        request: CreateStrategyRequest,
    ) -> Result<GenerateStrategyResponse>;

    async fn list_history(&self) -> Result<Vec<StrategyHistoryEntity>>;

    async fn find_strategy(&self, strategy_id: &str) -> Result<StrategyHistoryEntity>;

    async fn create_strategy(&self, request: CreateStrategyRequest)
    -> Result<StrategyHistoryEntity>;

    async fn update_strategy(&self, request: UpdateStrategyRequest)
    -> Result<StrategyHistoryEntity>;

    async fn delete_strategy(&self, strategy_id: &str) -> Result<()>;

    async fn save_strategy(&self, strategy_id: &str) -> Result<()>;

    async fn toggle_favorite(&self, strategy_id: &str) -> Result<StrategyHistoryEntity>;
}
