use std::{path::PathBuf, time::Duration};

use super::stage::Stage;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub stage: Stage,
    pub api: Api,
    pub video_polling: VideoPolling,
    pub video_defaults: VideoDefaults,
    pub speech: Speech,
    pub auth: Auth,
}

#[derive(Debug, Clone)]
pub struct Api {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Api {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoPolling {
    pub initial_delay_ms: u64,
    pub processing_interval_ms: u64,
    pub rendering_interval_ms: u64,
    /// `0` disables the cap.
    pub max_status_checks: u32,
}

#[derive(Debug, Clone, Default)]
pub struct VideoDefaults {
    pub template: Option<String>,
    pub voice: Option<String>,
    pub persona: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Speech {
    pub command: String,
}

#[derive(Debug, Clone)]
pub struct Auth {
    /// `AUTH_TOKEN`, sent instead of the saved token when set.
    pub token_override: Option<String>,
    pub token_file: PathBuf,
}
