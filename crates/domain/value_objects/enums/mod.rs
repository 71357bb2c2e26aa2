pub mod job_states;
pub mod risk_levels;
pub mod video_phases;
