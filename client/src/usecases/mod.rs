pub mod explanation_playback;
pub mod strategy_history;
pub mod strategy_session;
pub mod video_download;
pub mod video_job_poller;
