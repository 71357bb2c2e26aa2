use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

#[automock]
#[async_trait]
pub trait VoiceCapture {
    fn is_supported(&self) -> bool;

    /// Listens once and returns the final transcript.
    async fn capture_transcript(&self) -> Result<String>;
}
