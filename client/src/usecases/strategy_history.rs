use anyhow::{Context, Result, bail};
use chrono::Utc;
use crates::domain::{
    entities::strategies::StrategyHistoryEntity,
    repositories::strategies::StrategyClient,
    value_objects::strategies::{CreateStrategyRequest, UpdateStrategyRequest},
};
use std::sync::Arc;
use tracing::{debug, info};

/// Local copy of the user's saved strategies, kept in step with the backend.
///
/// Every mutation goes to the backend first; the local list only changes once
/// the call succeeded.
pub struct StrategyHistory<S>
where
    S: StrategyClient + Send + Sync + 'static,
{
    strategy_client: Arc<S>,
    items: Vec<StrategyHistoryEntity>,
}

impl<S> StrategyHistory<S>
where
    S: StrategyClient + Send + Sync + 'static,
{
    pub fn new(strategy_client: Arc<S>) -> Self {
        Self {
            strategy_client,
            items: Vec::new(),
        }
    }

    pub fn items(&self) -> &[StrategyHistoryEntity] {
        &self.items
    }

    pub async fn refresh(&mut self) -> Result<&[StrategyHistoryEntity]> {
        let items = self
            .strategy_client
            .list_history()
            .await
            .context("Failed to load strategy history")?;
        debug!(count = items.len(), "strategy_history: refreshed");
        self.items = items;
        Ok(&self.items)
    }

    pub async fn get(&self, strategy_id: &str) -> Result<StrategyHistoryEntity> {
        self.strategy_client
            .find_strategy(strategy_id)
            .await
            .with_context(|| format!("Failed to load strategy {strategy_id}"))
    }

    /// Stores a typed intent as a new history entry, newest first.
    pub async fn create(&mut self, intent: &str) -> Result<StrategyHistoryEntity> {
        let intent = intent.trim();
        if intent.is_empty() {
            bail!("Intent must not be empty");
        }

        let created = self
            .strategy_client
            .create_strategy(CreateStrategyRequest {
                intent: intent.to_string(),
                voice_transcript: None,
                preferences: None,
            })
            .await
            .context("Failed to create strategy")?;

        info!(strategy_id = %created.id, "strategy_history: strategy created");
        self.items.insert(0, created.clone());
        Ok(created)
    }

    /// Replaces the intent of an existing entry.
    pub async fn revise(
        &mut self,
        strategy_id: &str,
        intent: &str,
    ) -> Result<StrategyHistoryEntity> {
        let intent = intent.trim();
        if intent.is_empty() {
            bail!("Intent must not be empty");
        }

        let updated = self
            .strategy_client
            .update_strategy(UpdateStrategyRequest {
                id: strategy_id.to_string(),
                intent: Some(intent.to_string()),
                ..UpdateStrategyRequest::default()
            })
            .await
            .context("Failed to update strategy")?;

        if let Some(item) = self.items.iter_mut().find(|item| item.id == strategy_id) {
            *item = updated.clone();
        }
        info!(strategy_id, "strategy_history: strategy updated");
        Ok(updated)
    }

    pub async fn delete(&mut self, strategy_id: &str) -> Result<()> {
        self.strategy_client
            .delete_strategy(strategy_id)
            .await
            .context("Failed to delete strategy")?;

        self.items.retain(|item| item.id != strategy_id);
        info!(strategy_id, "strategy_history: strategy deleted");
        Ok(())
    }

    pub async fn save(&mut self, strategy_id: &str) -> Result<()> {
        self.strategy_client
            .save_strategy(strategy_id)
            .await
            .context("Failed to save strategy")?;

        if let Some(item) = self.items.iter_mut().find(|item| item.id == strategy_id) {
            item.is_favorite = Some(true);
            item.updated_at = Utc::now();
        }
        info!(strategy_id, "strategy_history: strategy saved");
        Ok(())
    }

    pub async fn toggle_favorite(&mut self, strategy_id: &str) -> Result<StrategyHistoryEntity> {
        let updated = self
            .strategy_client
            .toggle_favorite(strategy_id)
            .await
            .context("Failed to update favorite")?;

        if let Some(item) = self.items.iter_mut().find(|item| item.id == strategy_id) {
            *item = updated.clone();
        }
        debug!(
            strategy_id,
            is_favorite = updated.is_favorite(),
            "strategy_history: favorite toggled"
        );
        Ok(updated)
    }
}
