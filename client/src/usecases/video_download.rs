use anyhow::{Context, Result, bail};
use crates::domain::{
    entities::video_jobs::VideoJob, repositories::video_generation::VideoGenerationClient,
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::info;

/// `defi-strategy-<id>.mp4`, or `defi-strategy-video.mp4` without a strategy id.
pub fn video_file_name(strategy_id: Option<&str>) -> String {
    let stem = strategy_id
        .map(|id| {
            id.trim()
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
                .collect::<String>()
        })
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| "video".to_string());
    format!("defi-strategy-{stem}.mp4")
}

pub struct VideoDownload {
    video_client: Arc<dyn VideoGenerationClient + Send + Sync>,
}

impl VideoDownload {
    pub fn new(video_client: Arc<dyn VideoGenerationClient + Send + Sync>) -> Self {
        Self { video_client }
    }

    /// Saves a completed job's video into `dir` and returns the written path.
    pub async fn save(
        &self,
        job: &VideoJob,
        strategy_id: Option<&str>,
        dir: &Path,
    ) -> Result<PathBuf> {
        let Some(url) = job.result_url.as_deref() else {
            bail!("No video available to download");
        };

        let bytes = self
            .video_client
            .download_video(url)
            .await
            .context("Failed to download video")?;

        let path = dir.join(video_file_name(strategy_id));
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        info!(
            path = %path.display(),
            size = bytes.len(),
            "video_download: video saved"
        );
        Ok(path)
    }
}
