use anyhow::{Result, bail};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use tracing::debug;

use crate::{
    domain::{
        repositories::video_generation::VideoGenerationClient,
        value_objects::video::{GenerateVideoRequest, VideoStatus, VideoSubmission},
    },
    infra::http::{api_client::ApiClient, endpoints},
};

pub struct VideoApi {
    client: Arc<ApiClient>,
}

impl VideoApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VideoGenerationClient for VideoApi {
    async fn submit_video(&self, request: GenerateVideoRequest) -> Result<VideoSubmission> {
        let submission: VideoSubmission =
            self.client.post(endpoints::VIDEO_GENERATE, &request).await?;
        debug!(job_id = %submission.video_id, "video_api: submission accepted");
        Ok(submission)
    }

    async fn video_status(&self, job_id: &str) -> Result<VideoStatus> {
        if job_id.trim().is_empty() {
            bail!("video id is required");
        }
        Ok(self.client.get(&endpoints::video(job_id)).await?)
    }

    async fn list_videos(&self) -> Result<Vec<VideoStatus>> {
        Ok(self.client.get(endpoints::VIDEO_LIST).await?)
    }

    async fn download_video(&self, url: &str) -> Result<Bytes> {
        let bytes = self.client.download(url).await?;
        debug!(size = bytes.len(), "video_api: video downloaded");
        Ok(bytes)
    }
}
