use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::voice::SpeechSettings;

#[automock]
#[async_trait]
pub trait SpeechPlayback {
    fn is_supported(&self) -> bool;

    /// Starts speaking and returns without waiting for playback to end.
    async fn speak(&self, text: &str, settings: SpeechSettings) -> Result<()>;

    async fn stop(&self) -> Result<()>;

    async fn is_speaking(&self) -> bool;

    async fn wait_until_finished(&self) -> Result<()>;
}
