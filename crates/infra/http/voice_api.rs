use anyhow::{Context, Result};
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use std::sync::Arc;

use crate::{
    domain::value_objects::voice::{TextToSpeechRequest, Transcription},
    infra::http::{api_client::ApiClient, endpoints},
};

/// Remote speech-to-text and text-to-speech endpoints.
pub struct VoiceApi {
    client: Arc<ApiClient>,
}

impl VoiceApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<Transcription> {
        let part = Part::bytes(audio).file_name(file_name.to_string());
        let form = Form::new().part("audio", part);

        let transcription = self
            .client
            .post_multipart(endpoints::VOICE_TRANSCRIBE, form)
            .await
            .context("Failed to transcribe audio")?;
        Ok(transcription)
    }

    pub async fn text_to_speech(&self, text: &str, voice: Option<String>) -> Result<Bytes> {
        let request = TextToSpeechRequest {
            text: text.to_string(),
            voice,
        };

        let audio = self
            .client
            .post_for_bytes(endpoints::VOICE_TTS, &request)
            .await
            .context("Failed to convert text to speech")?;
        Ok(audio)
    }
}
