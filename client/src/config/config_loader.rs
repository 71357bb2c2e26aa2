use anyhow::{Context, Result, bail};
use std::{path::PathBuf, str::FromStr};

use super::{
    config_model::{Api, Auth, DotEnvyConfig, Speech, VideoDefaults, VideoPolling},
    stage::Stage,
};
use crate::usecases::video_job_poller::PollerConfig;

/// Reads the process environment. `.env` is loaded by the caller beforehand.
pub fn load() -> Result<DotEnvyConfig> {
    load_from(|key| std::env::var(key).ok())
}

/// Builds the config from any key lookup; blank values count as unset.
pub fn load_from<F>(lookup: F) -> Result<DotEnvyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| {
        lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let stage = match var("STAGE") {
        Some(raw) => Stage::try_from(raw.as_str()).context("STAGE is invalid")?,
        None => Stage::default(),
    };

    let base_url = match var("API_BASE_URL") {
        Some(raw) => normalize_base_url(&raw).context("API_BASE_URL is invalid")?,
        None => "http://localhost:3000".to_string(),
    };

    let api = Api {
        base_url,
        timeout_secs: parse_var(var("API_TIMEOUT_SECS"), "API_TIMEOUT_SECS", 30)?,
    };
    if api.timeout_secs == 0 {
        bail!("API_TIMEOUT_SECS must be greater than zero");
    }

    let video_polling = VideoPolling {
        initial_delay_ms: parse_var(
            var("VIDEO_POLL_INITIAL_DELAY_MS"),
            "VIDEO_POLL_INITIAL_DELAY_MS",
            2_000,
        )?,
        processing_interval_ms: parse_var(
            var("VIDEO_POLL_PROCESSING_INTERVAL_MS"),
            "VIDEO_POLL_PROCESSING_INTERVAL_MS",
            3_000,
        )?,
        rendering_interval_ms: parse_var(
            var("VIDEO_POLL_RENDERING_INTERVAL_MS"),
            "VIDEO_POLL_RENDERING_INTERVAL_MS",
            5_000,
        )?,
        max_status_checks: parse_var(var("VIDEO_POLL_MAX_CHECKS"), "VIDEO_POLL_MAX_CHECKS", 200)?,
    };
    PollerConfig::try_from(&video_polling).context("VIDEO_POLL_* settings are inconsistent")?;

    let video_defaults = VideoDefaults {
        template: var("VIDEO_TEMPLATE"),
        voice: var("VIDEO_VOICE"),
        persona: var("VIDEO_PERSONA"),
    };

    let speech = Speech {
        command: var("SPEECH_COMMAND").unwrap_or_else(|| "espeak".to_string()),
    };

    let auth = Auth {
        token_override: var("AUTH_TOKEN"),
        token_file: var("AUTH_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(default_token_file),
    };

    Ok(DotEnvyConfig {
        stage,
        api,
        video_polling,
        video_defaults,
        speech,
        auth,
    })
}

/// Applies `--api-base-url`, held to the same rules as `API_BASE_URL`.
pub fn with_base_url_override(
    mut config: DotEnvyConfig,
    base_url: Option<&str>,
) -> Result<DotEnvyConfig> {
    if let Some(raw) = base_url.filter(|raw| !raw.trim().is_empty()) {
        config.api.base_url = normalize_base_url(raw).context("--api-base-url is invalid")?;
    }
    Ok(config)
}

/// Accepts only http(s) URLs and drops trailing slashes.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        bail!("expected an http(s) URL, got `{trimmed}`");
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

fn parse_var<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw.parse().with_context(|| format!("{key} is invalid")),
        None => Ok(default),
    }
}

fn default_token_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".voicefi")
        .join("auth_token")
}
