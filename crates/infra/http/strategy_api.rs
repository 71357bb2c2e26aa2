use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::{
    domain::{
        entities::strategies::StrategyHistoryEntity,
        repositories::strategies::StrategyClient,
        value_objects::strategies::{
            CreateStrategyRequest, GenerateStrategyResponse, StrategyHistoryPayload,
            UpdateStrategyRequest,
        },
    },
    infra::http::{api_client::ApiClient, endpoints},
};

pub struct StrategyApi {
    client: Arc<ApiClient>,
}

impl StrategyApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StrategyClient for StrategyApi {
    async fn generate_strategy(
        &self,
        request: CreateStrategyRequest,
    ) -> Result<GenerateStrategyResponse> {
        debug!(intent_len = request.intent.len(), "strategy_api: generating strategy");
        let generated = self
            .client
            .post(endpoints::STRATEGIES_GENERATE, &request)
            .await?;
        Ok(generated)
    }

    async fn list_history(&self) -> Result<Vec<StrategyHistoryEntity>> {
        let payload: StrategyHistoryPayload =
            self.client.get(endpoints::STRATEGIES_HISTORY).await?;
        let items = payload.into_items();
        debug!(count = items.len(), "strategy_api: history loaded");
        Ok(items)
    }

    async fn find_strategy(&self, strategy_id: &str) -> Result<StrategyHistoryEntity> {
        Ok(self.client.get(&endpoints::strategy(strategy_id)).await?)
    }

    async fn create_strategy(
        &self,
        request: CreateStrategyRequest,
    ) -> Result<StrategyHistoryEntity> {
        Ok(self.client.post(endpoints::STRATEGIES, &request).await?)
    }

    async fn update_strategy(
        &self,
        request: UpdateStrategyRequest,
    ) -> Result<StrategyHistoryEntity> {
        Ok(self
            .client
            .put(&endpoints::strategy(&request.id), &request)
            .await?)
    }

    async fn delete_strategy(&self, strategy_id: &str) -> Result<()> {
        self.client
            .delete(&endpoints::strategy(strategy_id))
            .await?;
        Ok(())
    }

    async fn save_strategy(&self, strategy_id: &str) -> Result<()> {
        self.client
            .post_command(&endpoints::strategy_save(strategy_id))
            .await?;
        Ok(())
    }

    async fn toggle_favorite(&self, strategy_id: &str) -> Result<StrategyHistoryEntity> {
        Ok(self
            .client
            .post_empty(&endpoints::strategy_favorite(strategy_id))
            .await?)
    }
}
