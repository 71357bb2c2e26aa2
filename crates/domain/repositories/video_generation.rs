use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use mockall::automock;

use crate::domain::value_objects::video::{GenerateVideoRequest, VideoStatus, VideoSubmission};

/// Third-party avatar-video provider, reached through the backend.
#[automock]
#[async_trait]
pub trait VideoGenerationClient {
    async fn submit_video(&self, request: GenerateVideoRequest) -> Result<VideoSubmission>;

    async fn video_status(&self, job_id: &str) -> Result<VideoStatus>;

    async fn list_videos(&self) -> Result<Vec<VideoStatus>>;

    async fn download_video(&self, url: &str) -> Result<Bytes>;
}
