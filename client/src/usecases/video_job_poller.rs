use crates::domain::{
    entities::video_jobs::VideoJob,
    repositories::video_generation::VideoGenerationClient,
    value_objects::{
        enums::{job_states::JobState, video_phases::VideoPhase},
        video::{GenerateVideoRequest, VideoMetadata},
    },
};
use parking_lot::Mutex;
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::config::config_model::VideoPolling;

const MISSING_CONTENT: &str = "No strategy data available for video generation";
const REPORTED_FAILURE_FALLBACK: &str = "Video generation failed";

/// Why a job ended in `Failed`. Only the message reaches the caller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PollerError {
    #[error("{0}")]
    Validation(String),

    #[error("{context}: {message}")]
    Transport {
        context: &'static str,
        message: String,
    },

    #[error("{0}")]
    ServiceReported(String),
}

impl PollerError {
    fn submission(message: impl Into<String>) -> Self {
        PollerError::Transport {
            context: "Failed to start video generation",
            message: message.into(),
        }
    }

    fn status_check(message: impl Into<String>) -> Self {
        PollerError::Transport {
            context: "Failed to check video status",
            message: message.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PollerConfigError {
    #[error("processing interval must be greater than zero")]
    ZeroInterval,

    #[error("processing interval ({processing_ms} ms) is shorter than the initial delay ({initial_ms} ms)")]
    ProcessingBeforeInitial { initial_ms: u64, processing_ms: u64 },

    #[error("rendering interval ({rendering_ms} ms) is shorter than the processing interval ({processing_ms} ms)")]
    RenderingBeforeProcessing {
        processing_ms: u64,
        rendering_ms: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollerConfig {
    pub initial_delay: Duration,
    pub processing_interval: Duration,
    pub rendering_interval: Duration,
    /// `0` disables the cap.
    pub max_status_checks: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(2_000),
            processing_interval: Duration::from_millis(3_000),
            rendering_interval: Duration::from_millis(5_000),
            max_status_checks: 200,
        }
    }
}

impl PollerConfig {
    pub fn validate(&self) -> Result<(), PollerConfigError> {
        let initial_ms = self.initial_delay.as_millis() as u64;
        let processing_ms = self.processing_interval.as_millis() as u64;
        let rendering_ms = self.rendering_interval.as_millis() as u64;

        if processing_ms == 0 {
            return Err(PollerConfigError::ZeroInterval);
        }
        if processing_ms < initial_ms {
            return Err(PollerConfigError::ProcessingBeforeInitial {
                initial_ms,
                processing_ms,
            });
        }
        if rendering_ms < processing_ms {
            return Err(PollerConfigError::RenderingBeforeProcessing {
                processing_ms,
                rendering_ms,
            });
        }
        Ok(())
    }

    /// Delay before the next check after the service reported `phase`.
    pub fn interval_for(&self, phase: &VideoPhase) -> Duration {
        match phase {
            VideoPhase::Rendering => self.rendering_interval,
            _ => self.processing_interval,
        }
    }
}

impl TryFrom<&VideoPolling> for PollerConfig {
    type Error = PollerConfigError;

    fn try_from(polling: &VideoPolling) -> Result<Self, Self::Error> {
        let config = Self {
            initial_delay: Duration::from_millis(polling.initial_delay_ms),
            processing_interval: Duration::from_millis(polling.processing_interval_ms),
            rendering_interval: Duration::from_millis(polling.rendering_interval_ms),
            max_status_checks: polling.max_status_checks,
        };
        config.validate()?;
        Ok(config)
    }
}

struct Fence {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

struct Shared {
    fence: Mutex<Fence>,
    job_tx: watch::Sender<VideoJob>,
}

impl Shared {
    /// Applies `update` only while `generation` is still the tracked job.
    /// The check and the write happen under the same lock.
    fn apply<F>(&self, generation: u64, update: F) -> Option<VideoJob>
    where
        F: FnOnce(&mut VideoJob),
    {
        let fence = self.fence.lock();
        if fence.generation != generation {
            debug!(
                generation,
                current = fence.generation,
                "video_job_poller: discarding stale update"
            );
            return None;
        }

        let mut snapshot = None;
        self.job_tx.send_modify(|job| {
            update(job);
            snapshot = Some(job.clone());
        });
        snapshot
    }

    fn current(&self, generation: u64) -> Option<VideoJob> {
        let fence = self.fence.lock();
        (fence.generation == generation).then(|| self.job_tx.borrow().clone())
    }

    fn fail(&self, generation: u64, error: PollerError) -> Option<VideoJob> {
        warn!(generation, error = %error, "video_job_poller: job failed");
        self.apply(generation, |job| job.fail(error.to_string()))
    }
}

enum Step {
    Continue(VideoPhase),
    Complete(String, Option<VideoMetadata>),
    Fail(PollerError),
}

/// Drives one remote video job at a time from submission to a terminal state.
///
/// Each submission runs in its own task tagged with a generation number.
/// `submit`, `regenerate` and `cancel` bump the generation and abort the
/// previous task, so a late response from a superseded job is never applied.
pub struct VideoJobPoller {
    video_client: Arc<dyn VideoGenerationClient + Send + Sync>,
    config: PollerConfig,
    shared: Arc<Shared>,
}

impl VideoJobPoller {
    pub fn new(
        video_client: Arc<dyn VideoGenerationClient + Send + Sync>,
        config: PollerConfig,
    ) -> Self {
        let (job_tx, _) = watch::channel(VideoJob::idle());
        Self {
            video_client,
            config,
            shared: Arc::new(Shared {
                fence: Mutex::new(Fence {
                    generation: 0,
                    task: None,
                }),
                job_tx,
            }),
        }
    }

    /// Starts a new job, discarding any job already tracked.
    ///
    /// `None` fails immediately without touching the network. Must be called
    /// from within a tokio runtime.
    pub fn submit(&self, request: Option<GenerateVideoRequest>) {
        let mut fence = self.shared.fence.lock();
        fence.generation += 1;
        let generation = fence.generation;
        if let Some(task) = fence.task.take() {
            task.abort();
        }

        let Some(request) = request else {
            let error = PollerError::Validation(MISSING_CONTENT.to_string());
            warn!(generation, error = %error, "video_job_poller: nothing to submit");
            let mut job = VideoJob::idle();
            job.fail(error.to_string());
            self.shared.job_tx.send_replace(job);
            return;
        };

        info!(
            generation,
            strategy_id = ?request.strategy_id,
            "video_job_poller: submitting video job"
        );
        self.shared.job_tx.send_replace(VideoJob::submitting());

        let task = tokio::spawn(drive(
            Arc::clone(&self.shared),
            Arc::clone(&self.video_client),
            self.config,
            generation,
            request,
        ));
        fence.task = Some(task);
    }

    /// Clears the current job and submits again. Late responses for the old job are dropped.
    pub fn regenerate(&self, request: Option<GenerateVideoRequest>) {
        self.cancel();
        self.submit(request);
    }

    /// Stops tracking locally. No request is sent to the service.
    pub fn cancel(&self) {
        let mut fence = self.shared.fence.lock();
        fence.generation += 1;
        if let Some(task) = fence.task.take() {
            task.abort();
        }
        self.shared.job_tx.send_replace(VideoJob::idle());
        debug!(generation = fence.generation, "video_job_poller: cancelled");
    }

    pub fn snapshot(&self) -> VideoJob {
        self.shared.job_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<VideoJob> {
        self.shared.job_tx.subscribe()
    }

    /// Resolves once the tracked job is terminal, or back to `Idle` after a cancel.
    pub async fn wait_for_terminal(&self) -> VideoJob {
        let mut rx = self.shared.job_tx.subscribe();
        match rx
            .wait_for(|job| job.is_terminal() || job.state == JobState::Idle)
            .await
        {
            Ok(job) => job.clone(),
            Err(_) => self.snapshot(),
        }
    }
}

impl Drop for VideoJobPoller {
    fn drop(&mut self) {
        if let Some(task) = self.shared.fence.lock().task.take() {
            task.abort();
        }
    }
}

async fn drive(
    shared: Arc<Shared>,
    video_client: Arc<dyn VideoGenerationClient + Send + Sync>,
    config: PollerConfig,
    generation: u64,
    request: GenerateVideoRequest,
) {
    let submission = match video_client.submit_video(request).await {
        Ok(submission) => submission,
        Err(err) => {
            shared.fail(generation, PollerError::submission(format!("{err:#}")));
            return;
        }
    };

    let job_id = submission.video_id.trim().to_string();
    if job_id.is_empty() {
        shared.fail(
            generation,
            PollerError::submission("service returned an empty job id"),
        );
        return;
    }

    let first_phase = submission.status.unwrap_or(VideoPhase::Queued);
    let initial_delay_ms = config.initial_delay.as_millis() as u64;
    let accepted = shared.apply(generation, |job| {
        job.accept(&job_id, initial_delay_ms);
        if !matches!(first_phase, VideoPhase::Queued) && !first_phase.is_terminal() {
            job.progress(&first_phase, initial_delay_ms);
        }
    });
    if accepted.is_none() {
        return;
    }
    info!(
        job_id = %job_id,
        phase = %first_phase,
        "video_job_poller: job accepted"
    );

    let mut delay = match first_phase {
        VideoPhase::Failed => {
            shared.fail(
                generation,
                PollerError::ServiceReported(REPORTED_FAILURE_FALLBACK.to_string()),
            );
            return;
        }
        // The submission response never carries the URL, so fetch it right away.
        VideoPhase::Completed => Duration::ZERO,
        _ => config.initial_delay,
    };

    loop {
        tokio::time::sleep(delay).await;

        let Some(checks_done) = shared.current(generation).map(|job| job.status_checks) else {
            return;
        };
        if config.max_status_checks > 0 && checks_done >= config.max_status_checks {
            shared.fail(
                generation,
                PollerError::ServiceReported(format!(
                    "Video generation timed out after {} status checks",
                    config.max_status_checks
                )),
            );
            return;
        }

        let step = match video_client.video_status(&job_id).await {
            Err(err) => Step::Fail(PollerError::status_check(format!("{err:#}"))),
            Ok(status) => match status.status {
                VideoPhase::Completed => match status.url.filter(|url| !url.trim().is_empty()) {
                    Some(url) => Step::Complete(url, status.metadata),
                    None => Step::Fail(PollerError::ServiceReported(
                        "Video generation completed without a video URL".to_string(),
                    )),
                },
                VideoPhase::Failed => Step::Fail(PollerError::ServiceReported(
                    status
                        .error
                        .filter(|e| !e.trim().is_empty())
                        .unwrap_or_else(|| REPORTED_FAILURE_FALLBACK.to_string()),
                )),
                phase => Step::Continue(phase),
            },
        };

        match step {
            Step::Continue(phase) => {
                let next = config.interval_for(&phase);
                let next_ms = next.as_millis() as u64;
                let applied = shared.apply(generation, |job| {
                    job.record_status_check();
                    job.progress(&phase, next_ms);
                });
                if applied.is_none() {
                    return;
                }
                debug!(
                    job_id = %job_id,
                    phase = %phase,
                    next_poll_ms = next_ms,
                    "video_job_poller: still in progress"
                );
                delay = next;
            }
            Step::Complete(url, metadata) => {
                let applied = shared.apply(generation, |job| {
                    job.record_status_check();
                    job.complete(url, metadata);
                });
                if applied.is_some() {
                    info!(job_id = %job_id, "video_job_poller: video ready");
                }
                return;
            }
            Step::Fail(error) => {
                shared.apply(generation, |job| job.record_status_check());
                shared.fail(generation, error);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use crates::domain::{
        repositories::video_generation::MockVideoGenerationClient,
        value_objects::video::{VideoContent, VideoStatus, VideoSubmission},
    };
    use mockall::Sequence;
    use std::sync::{
        atomic::{AtomicU32, Ordering},
        mpsc as std_mpsc,
    };
    use tokio::time::Instant;

    fn request() -> GenerateVideoRequest {
        GenerateVideoRequest::new(
            Some("s-1".to_string()),
            VideoContent {
                intent: "stake ETH".to_string(),
                plan: "Stake through a liquid staking pool".to_string(),
                risk_reward: "Low risk, steady yield".to_string(),
                apy: "5%".to_string(),
                risk_level: "Low".to_string(),
            },
        )
    }

    fn submission(job_id: &str, phase: Option<VideoPhase>) -> VideoSubmission {
        VideoSubmission {
            video_id: job_id.to_string(),
            status: phase,
        }
    }

    fn status(phase: VideoPhase, url: Option<&str>, error: Option<&str>) -> VideoStatus {
        VideoStatus {
            video_id: Some("abc123".to_string()),
            status: phase,
            url: url.map(str::to_string),
            error: error.map(str::to_string),
            metadata: None,
        }
    }

    fn poller(mock: MockVideoGenerationClient) -> VideoJobPoller {
        VideoJobPoller::new(Arc::new(mock), PollerConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn walks_processing_rendering_completed_at_phase_intervals() {
        let start = Instant::now();
        let calls: Arc<parking_lot::Mutex<Vec<Duration>>> = Arc::default();
        let mut seq = Sequence::new();
        let mut mock = MockVideoGenerationClient::new();

        mock.expect_submit_video()
            .times(1)
            .withf(|req| req.content.intent == "stake ETH" && req.content.apy == "5%")
            .returning(|_| Ok(submission("abc123", Some(VideoPhase::Processing))));

        let replies = [
            status(VideoPhase::Rendering, None, None),
            status(VideoPhase::Completed, Some("https://cdn/video.mp4"), None),
        ];
        for reply in replies {
            let calls = Arc::clone(&calls);
            mock.expect_video_status()
                .times(1)
                .in_sequence(&mut seq)
                .withf(|job_id| job_id.to_string() == "abc123")
                .returning(move |_| {
                    calls.lock().push(start.elapsed());
                    Ok(reply.clone())
                });
        }

        let poller = poller(mock);
        poller.submit(Some(request()));
        assert_eq!(poller.snapshot().state, JobState::Submitting);

        let job = poller.wait_for_terminal().await;

        assert_eq!(job.state, JobState::Completed);
        assert_eq!(job.job_id.as_deref(), Some("abc123"));
        assert_eq!(job.result_url.as_deref(), Some("https://cdn/video.mp4"));
        assert!(job.last_error.is_none());
        assert_eq!(job.status_checks, 2);
        // initial delay, then the rendering interval
        assert_eq!(
            *calls.lock(),
            vec![Duration::from_millis(2_000), Duration::from_millis(7_000)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn rendering_is_polled_slower_than_processing() {
        let start = Instant::now();
        let calls: Arc<parking_lot::Mutex<Vec<Duration>>> = Arc::default();
        let mut seq = Sequence::new();
        let mut mock = MockVideoGenerationClient::new();

        mock.expect_submit_video()
            .returning(|_| Ok(submission("abc123", None)));

        let replies = [
            status(VideoPhase::Processing, None, None),
            status(VideoPhase::Rendering, None, None),
            status(VideoPhase::Completed, Some("https://cdn/video.mp4"), None),
        ];
        for reply in replies {
            let calls = Arc::clone(&calls);
            mock.expect_video_status()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_| {
                    calls.lock().push(start.elapsed());
                    Ok(reply.clone())
                });
        }

        let poller = poller(mock);
        poller.submit(Some(request()));
        poller.wait_for_terminal().await;

        let calls = calls.lock().clone();
        let after_processing = calls[1] - calls[0];
        let after_rendering = calls[2] - calls[1];
        assert_eq!(after_processing, Duration::from_millis(3_000));
        assert_eq!(after_rendering, Duration::from_millis(5_000));
        assert!(after_processing <= after_rendering);
    }

    #[tokio::test(start_paused = true)]
    async fn reported_failure_keeps_service_message() {
        let mut mock = MockVideoGenerationClient::new();
        mock.expect_submit_video()
            .returning(|_| Ok(submission("abc123", None)));
        mock.expect_video_status().times(1).returning(|_| {
            Ok(status(
                VideoPhase::Failed,
                None,
                Some("Avatar rendering quota exceeded"),
            ))
        });

        let poller = poller(mock);
        poller.submit(Some(request()));
        let job = poller.wait_for_terminal().await;

        assert_eq!(job.state, JobState::Failed);
        assert_eq!(job.last_error.as_deref(), Some("Avatar rendering quota exceeded"));
        assert!(job.result_url.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn reported_failure_without_message_uses_fallback() {
        let mut mock = MockVideoGenerationClient::new();
        mock.expect_submit_video()
            .returning(|_| Ok(submission("abc123", None)));
        mock.expect_video_status()
            .times(1)
            .returning(|_| Ok(status(VideoPhase::Failed, None, None)));

        let poller = poller(mock);
        poller.submit(Some(request()));
        let job = poller.wait_for_terminal().await;

        assert_eq!(job.last_error.as_deref(), Some("Video generation failed"));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_submission_never_polls() {
        let mut mock = MockVideoGenerationClient::new();
        mock.expect_submit_video()
            .times(1)
            .returning(|_| Err(anyhow!("HTTP 500: Internal Server Error")));
        mock.expect_video_status().never();

        let poller = poller(mock);
        poller.submit(Some(request()));
        let job = poller.wait_for_terminal().await;

        assert_eq!(job.state, JobState::Failed);
        assert!(job.job_id.is_none());
        let error = job.last_error.unwrap();
        assert!(error.starts_with("Failed to start video generation:"));
        assert!(error.contains("500"));

        // nothing left to fire
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(poller.snapshot().state, JobState::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn status_check_transport_error_is_terminal() {
        let mut mock = MockVideoGenerationClient::new();
        mock.expect_submit_video()
            .returning(|_| Ok(submission("abc123", None)));
        mock.expect_video_status()
            .times(1)
            .returning(|_| Err(anyhow!("Network error: connection failed")));

        let poller = poller(mock);
        poller.submit(Some(request()));
        let job = poller.wait_for_terminal().await;

        assert_eq!(job.state, JobState::Failed);
        assert_eq!(
            job.last_error.as_deref(),
            Some("Failed to check video status: Network error: connection failed")
        );
        assert_eq!(job.status_checks, 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(poller.snapshot(), job);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_phase_keeps_polling_at_short_interval() {
        let mut seq = Sequence::new();
        let mut mock = MockVideoGenerationClient::new();
        mock.expect_submit_video()
            .returning(|_| Ok(submission("abc123", None)));
        mock.expect_video_status()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(status(VideoPhase::from("encoding"), None, None)));
        mock.expect_video_status()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(status(VideoPhase::Completed, Some("https://cdn/v.mp4"), None)));

        let poller = poller(mock);
        poller.submit(Some(request()));

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        let job = poller.snapshot();
        assert_eq!(job.state, JobState::Processing);
        assert_eq!(job.phase_text, "Status: encoding");
        assert_eq!(job.poll_interval_ms, 3_000);

        let job = poller.wait_for_terminal().await;
        assert_eq!(job.state, JobState::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn completed_without_url_fails() {
        let mut mock = MockVideoGenerationClient::new();
        mock.expect_submit_video()
            .returning(|_| Ok(submission("abc123", None)));
        mock.expect_video_status()
            .times(1)
            .returning(|_| Ok(status(VideoPhase::Completed, Some("  "), None)));

        let poller = poller(mock);
        poller.submit(Some(request()));
        let job = poller.wait_for_terminal().await;

        assert_eq!(job.state, JobState::Failed);
        assert!(job.result_url.is_none());
        assert_eq!(
            job.last_error.as_deref(),
            Some("Video generation completed without a video URL")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn exceeding_status_check_cap_fails() {
        let mut mock = MockVideoGenerationClient::new();
        mock.expect_submit_video()
            .returning(|_| Ok(submission("abc123", None)));
        mock.expect_video_status()
            .times(3)
            .returning(|_| Ok(status(VideoPhase::Processing, None, None)));

        let poller = VideoJobPoller::new(
            Arc::new(mock),
            PollerConfig {
                max_status_checks: 3,
                ..PollerConfig::default()
            },
        );
        poller.submit(Some(request()));
        let job = poller.wait_for_terminal().await;

        assert_eq!(job.state, JobState::Failed);
        assert_eq!(job.status_checks, 3);
        assert_eq!(
            job.last_error.as_deref(),
            Some("Video generation timed out after 3 status checks")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn missing_content_fails_without_network_call() {
        let mut mock = MockVideoGenerationClient::new();
        mock.expect_submit_video().never();
        mock.expect_video_status().never();

        let poller = poller(mock);
        poller.submit(None);

        let job = poller.snapshot();
        assert_eq!(job.state, JobState::Failed);
        assert_eq!(
            job.last_error.as_deref(),
            Some("No strategy data available for video generation")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn empty_job_id_fails_submission() {
        let mut mock = MockVideoGenerationClient::new();
        mock.expect_submit_video()
            .returning(|_| Ok(submission(" ", None)));
        mock.expect_video_status().never();

        let poller = poller(mock);
        poller.submit(Some(request()));
        let job = poller.wait_for_terminal().await;

        assert_eq!(job.state, JobState::Failed);
        assert!(job.job_id.is_none());
        assert_eq!(
            job.last_error.as_deref(),
            Some("Failed to start video generation: service returned an empty job id")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_phase_at_submission_is_terminal() {
        let mut mock = MockVideoGenerationClient::new();
        mock.expect_submit_video()
            .returning(|_| Ok(submission("abc123", Some(VideoPhase::Failed))));
        mock.expect_video_status().never();

        let poller = poller(mock);
        poller.submit(Some(request()));
        let job = poller.wait_for_terminal().await;

        assert_eq!(job.state, JobState::Failed);
        assert_eq!(job.job_id.as_deref(), Some("abc123"));
        assert_eq!(job.last_error.as_deref(), Some("Video generation failed"));
    }

    #[tokio::test(start_paused = true)]
    async fn completed_phase_at_submission_fetches_url_immediately() {
        let start = Instant::now();
        let checked_at: Arc<parking_lot::Mutex<Option<Duration>>> = Arc::default();
        let mut mock = MockVideoGenerationClient::new();
        mock.expect_submit_video()
            .returning(|_| Ok(submission("abc123", Some(VideoPhase::Completed))));
        let recorder = Arc::clone(&checked_at);
        mock.expect_video_status()
            .times(1)
            .returning(move |_| {
                *recorder.lock() = Some(start.elapsed());
                Ok(status(VideoPhase::Completed, Some("https://cdn/ready.mp4"), None))
            });

        let poller = poller(mock);
        poller.submit(Some(request()));
        let job = poller.wait_for_terminal().await;

        assert_eq!(job.result_url.as_deref(), Some("https://cdn/ready.mp4"));
        assert_eq!(*checked_at.lock(), Some(Duration::ZERO));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_freezes_state_and_stops_polling() {
        let mut mock = MockVideoGenerationClient::new();
        mock.expect_submit_video()
            .returning(|_| Ok(submission("abc123", None)));
        mock.expect_video_status()
            .times(1)
            .returning(|_| Ok(status(VideoPhase::Processing, None, None)));

        let poller = poller(mock);
        poller.submit(Some(request()));

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(poller.snapshot().state, JobState::Processing);

        poller.cancel();
        assert_eq!(poller.snapshot(), VideoJob::idle());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(poller.snapshot(), VideoJob::idle());
        assert_eq!(poller.wait_for_terminal().await.state, JobState::Idle);
    }

    /// Hands out `job-1`, `job-2`, ... and answers the first job slowly.
    struct SlowFirstJobClient {
        submissions: AtomicU32,
    }

    #[async_trait]
    impl VideoGenerationClient for SlowFirstJobClient {
        async fn submit_video(
            &self,
            _request: GenerateVideoRequest,
        ) -> anyhow::Result<VideoSubmission> {
            let n = self.submissions.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(submission(&format!("job-{n}"), None))
        }

        async fn video_status(&self, job_id: &str) -> anyhow::Result<VideoStatus> {
            if job_id == "job-1" {
                tokio::time::sleep(Duration::from_secs(10)).await;
                return Ok(status(VideoPhase::Completed, Some("https://cdn/old.mp4"), None));
            }
            Ok(status(VideoPhase::Completed, Some("https://cdn/new.mp4"), None))
        }

        async fn list_videos(&self) -> anyhow::Result<Vec<VideoStatus>> {
            Ok(Vec::new())
        }

        async fn download_video(&self, _url: &str) -> anyhow::Result<bytes::Bytes> {
            unreachable!("not used by the poller")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn regenerate_discards_responses_for_superseded_job() {
        let client = Arc::new(SlowFirstJobClient {
            submissions: AtomicU32::new(0),
        });
        let poller = VideoJobPoller::new(client.clone(), PollerConfig::default());

        poller.submit(Some(request()));
        // job-1's status check is now in flight
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(poller.snapshot().job_id.as_deref(), Some("job-1"));

        poller.regenerate(Some(request()));
        let job = poller.wait_for_terminal().await;
        assert_eq!(job.job_id.as_deref(), Some("job-2"));
        assert_eq!(job.result_url.as_deref(), Some("https://cdn/new.mp4"));

        tokio::time::sleep(Duration::from_secs(30)).await;
        let job = poller.snapshot();
        assert_eq!(job.job_id.as_deref(), Some("job-2"));
        assert_eq!(job.result_url.as_deref(), Some("https://cdn/new.mp4"));
        assert_eq!(client.submissions.load(Ordering::SeqCst), 2);
    }

    /// Holds job-1's status check on a worker thread until released, so its
    /// response arrives after the poller has moved on to job-2.
    struct HeldFirstCheckClient {
        submissions: AtomicU32,
        entered: Mutex<std_mpsc::Sender<()>>,
        release: Mutex<std_mpsc::Receiver<()>>,
        answered: Mutex<std_mpsc::Sender<()>>,
    }

    #[async_trait]
    impl VideoGenerationClient for HeldFirstCheckClient {
        async fn submit_video(
            &self,
            _request: GenerateVideoRequest,
        ) -> anyhow::Result<VideoSubmission> {
            let n = self.submissions.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(submission(&format!("job-{n}"), None))
        }

        async fn video_status(&self, job_id: &str) -> anyhow::Result<VideoStatus> {
            if job_id == "job-1" {
                self.entered.lock().send(()).ok();
                // Blocks without yielding, so an abort cannot interrupt the check.
                self.release.lock().recv().ok();
                self.answered.lock().send(()).ok();
                return Ok(status(VideoPhase::Completed, Some("https://cdn/old.mp4"), None));
            }
            Ok(status(VideoPhase::Completed, Some("https://cdn/new.mp4"), None))
        }

        async fn list_videos(&self) -> anyhow::Result<Vec<VideoStatus>> {
            Ok(Vec::new())
        }

        async fn download_video(&self, _url: &str) -> anyhow::Result<bytes::Bytes> {
            unreachable!("not used by the poller")
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn late_response_from_superseded_job_is_fenced_off() {
        let (entered_tx, entered_rx) = std_mpsc::channel();
        let (release_tx, release_rx) = std_mpsc::channel();
        let (answered_tx, answered_rx) = std_mpsc::channel();
        let client = Arc::new(HeldFirstCheckClient {
            submissions: AtomicU32::new(0),
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
            answered: Mutex::new(answered_tx),
        });
        let config = PollerConfig {
            initial_delay: Duration::from_millis(10),
            processing_interval: Duration::from_millis(10),
            rendering_interval: Duration::from_millis(10),
            max_status_checks: 0,
        };
        let poller = VideoJobPoller::new(client.clone(), config);

        poller.submit(Some(request()));
        entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        poller.regenerate(Some(request()));
        let job = tokio::time::timeout(Duration::from_secs(5), poller.wait_for_terminal())
            .await
            .unwrap();
        assert_eq!(job.job_id.as_deref(), Some("job-2"));

        release_tx.send(()).unwrap();
        answered_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let job = poller.snapshot();
        assert_eq!(job.job_id.as_deref(), Some("job-2"));
        assert_eq!(job.result_url.as_deref(), Some("https://cdn/new.mp4"));
        assert_eq!(job.status_checks, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_generation_cannot_write() {
        let poller = poller(MockVideoGenerationClient::new());
        poller.cancel();

        let stale = poller.shared.apply(0, |job| job.fail("late".to_string()));
        assert!(stale.is_none());
        assert_eq!(poller.snapshot(), VideoJob::idle());
    }

    #[test]
    fn config_enforces_interval_ordering() {
        assert!(PollerConfig::default().validate().is_ok());

        let config = PollerConfig {
            rendering_interval: Duration::from_millis(1_000),
            ..PollerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(PollerConfigError::RenderingBeforeProcessing {
                processing_ms: 3_000,
                rendering_ms: 1_000,
            })
        );

        let config = PollerConfig {
            initial_delay: Duration::from_millis(4_000),
            ..PollerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PollerConfigError::ProcessingBeforeInitial { .. })
        ));
    }
}
