use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::{path::PathBuf, sync::Arc};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin},
    sync::Mutex,
};
use tracing::debug;

use crate::{domain::repositories::voice_capture::VoiceCapture, infra::http::voice_api::VoiceApi};

/// Typed transcript fallback: one line from a reader, stdin in the CLI.
pub struct LineVoiceCapture<R> {
    reader: Mutex<R>,
}

impl LineVoiceCapture<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> LineVoiceCapture<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader: Mutex::new(reader),
        }
    }
}

#[async_trait]
impl<R> VoiceCapture for LineVoiceCapture<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    fn is_supported(&self) -> bool {
        true
    }

    async fn capture_transcript(&self) -> Result<String> {
        let mut line = String::new();
        let read = self
            .reader
            .lock()
            .await
            .read_line(&mut line)
            .await
            .context("failed to read transcript")?;

        if read == 0 {
            bail!("no input received");
        }
        Ok(line.trim().to_string())
    }
}

/// Sends a recorded audio file to the backend transcription endpoint.
pub struct RemoteTranscriptionCapture {
    audio_path: PathBuf,
    voice_api: Arc<VoiceApi>,
}

impl RemoteTranscriptionCapture {
    pub fn new(audio_path: impl Into<PathBuf>, voice_api: Arc<VoiceApi>) -> Self {
        Self {
            audio_path: audio_path.into(),
            voice_api,
        }
    }
}

#[async_trait]
impl VoiceCapture for RemoteTranscriptionCapture {
    fn is_supported(&self) -> bool {
        self.audio_path.is_file()
    }

    async fn capture_transcript(&self) -> Result<String> {
        let audio = tokio::fs::read(&self.audio_path)
            .await
            .with_context(|| format!("failed to read {}", self.audio_path.display()))?;

        let file_name = self
            .audio_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "recording.wav".to_string());

        let transcription = self.voice_api.transcribe(audio, &file_name).await?;
        debug!(
            confidence = ?transcription.confidence,
            language = ?transcription.language,
            "voice: transcription received"
        );

        let transcript = transcription.transcript.trim().to_string();
        if transcript.is_empty() {
            bail!("No speech detected");
        }
        Ok(transcript)
    }
}
