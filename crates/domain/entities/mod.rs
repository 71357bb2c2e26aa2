pub mod strategies;
pub mod video_jobs;
