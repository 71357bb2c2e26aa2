pub mod speech_playback;
pub mod strategies;
pub mod token_store;
pub mod video_generation;
pub mod voice_capture;
