use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transcription {
    pub transcript: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextToSpeechRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

/// Playback tuning. `rate` and `pitch` are relative to 1.0, `volume` is 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeechSettings {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            rate: 0.9,
            pitch: 1.0,
            volume: 0.8,
        }
    }
}
