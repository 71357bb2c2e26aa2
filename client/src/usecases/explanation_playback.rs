use crates::domain::{
    repositories::speech_playback::SpeechPlayback, value_objects::voice::SpeechSettings,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Text-to-speech is not supported on this system")]
    Unsupported,

    #[error("Failed to play explanation: {0}")]
    Speech(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Stopped,
}

/// Play/stop toggle for reading a strategy plan aloud.
pub struct ExplanationPlayback<P>
where
    P: SpeechPlayback + Send + Sync + 'static,
{
    playback: Arc<P>,
    settings: SpeechSettings,
}

impl<P> ExplanationPlayback<P>
where
    P: SpeechPlayback + Send + Sync + 'static,
{
    pub fn new(playback: Arc<P>) -> Self {
        Self {
            playback,
            settings: SpeechSettings::default(),
        }
    }

    pub async fn toggle(&self, text: &str) -> Result<PlaybackState, PlaybackError> {
        if !self.playback.is_supported() {
            return Err(PlaybackError::Unsupported);
        }

        if self.playback.is_speaking().await {
            self.playback
                .stop()
                .await
                .map_err(|err| PlaybackError::Speech(format!("{err:#}")))?;
            debug!("explanation_playback: stopped");
            return Ok(PlaybackState::Stopped);
        }

        self.playback
            .speak(text, self.settings)
            .await
            .map_err(|err| PlaybackError::Speech(format!("{err:#}")))?;
        debug!(chars = text.len(), "explanation_playback: started");
        Ok(PlaybackState::Playing)
    }

    pub async fn wait_until_finished(&self) -> Result<(), PlaybackError> {
        self.playback
            .wait_until_finished()
            .await
            .map_err(|err| PlaybackError::Speech(format!("{err:#}")))
    }
}
