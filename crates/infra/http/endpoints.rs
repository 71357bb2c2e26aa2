pub const STRATEGIES: &str = "/api/strategies";
pub const STRATEGIES_HISTORY: &str = "/api/strategies/history";
pub const STRATEGIES_GENERATE: &str = "/api/strategies/generate";

pub const VIDEO_GENERATE: &str = "/api/tavus/generate";
pub const VIDEO_LIST: &str = "/api/tavus/videos";

pub const VOICE_TRANSCRIBE: &str = "/api/voice/transcribe";
pub const VOICE_TTS: &str = "/api/voice/tts";

pub const HEALTH: &str = "/health";

pub fn strategy(strategy_id: &str) -> String {
    format!("{}/{}", STRATEGIES, encode_segment(strategy_id))
}

pub fn strategy_save(strategy_id: &str) -> String {
    format!("{}/save", strategy(strategy_id))
}

pub fn strategy_favorite(strategy_id: &str) -> String {
    format!("{}/favorite", strategy(strategy_id))
}

pub fn video(job_id: &str) -> String {
    format!("/api/tavus/video/{}", encode_segment(job_id))
}

fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_escaped_in_paths() {
        assert_eq!(strategy("abc"), "/api/strategies/abc");
        assert_eq!(strategy_save("a/b"), "/api/strategies/a%2Fb/save");
        assert_eq!(video("job 1"), "/api/tavus/video/job%201");
    }
}
