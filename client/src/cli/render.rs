use crates::domain::{
    entities::{
        strategies::{StrategyEntity, StrategyHistoryEntity},
        video_jobs::VideoJob,
    },
    value_objects::{enums::job_states::JobState, video::VideoStatus},
};
use std::fmt::Write;

pub fn strategy_card(strategy: &StrategyEntity) -> String {
    let mut out = String::new();
    if let Some(title) = &strategy.title {
        let _ = writeln!(out, "{title}");
    }
    let _ = writeln!(out, "Intent:      {}", strategy.intent);
    let _ = writeln!(out, "Risk level:  {}", strategy.risk_level);
    let _ = writeln!(out, "Est. APY:    {}", strategy.apy);
    let _ = writeln!(out, "Risk/reward: {}", strategy.risk_reward);
    if let Some(tags) = strategy.tags.as_ref().filter(|tags| !tags.is_empty()) {
        let _ = writeln!(out, "Tags:        {}", tags.join(", "));
    }
    let _ = writeln!(out, "Generated:   {}", strategy.timestamp);
    if let Some(id) = &strategy.id {
        let _ = writeln!(out, "Id:          {id}");
    }
    let _ = writeln!(out);
    let _ = write!(out, "{}", strategy.plan);
    out
}

pub fn history_row(item: &StrategyHistoryEntity) -> String {
    let star = if item.is_favorite() { "*" } else { " " };
    format!(
        "{star} {id:<12} {date}  {level:<6}  {apy:<8}  {title}",
        id = item.id,
        date = item.created_at.format("%b %-d, %Y"),
        level = item.risk_level.as_str(),
        apy = item.apy,
        title = item.title,
    )
}

pub fn video_row(video: &VideoStatus) -> String {
    format!(
        "{id:<16} {status:<12} {url}",
        id = video.video_id.as_deref().unwrap_or("-"),
        status = video.status.as_str(),
        url = video.url.as_deref().unwrap_or(""),
    )
}

/// One progress line for a video job, or `None` when there is nothing to show.
pub fn job_line(job: &VideoJob) -> Option<String> {
    match job.state {
        JobState::Idle => None,
        JobState::Completed => Some(format!(
            "{} {}",
            job.phase_text,
            job.result_url.as_deref().unwrap_or_default()
        )),
        JobState::Failed => Some(format!(
            "Error: {}",
            job.last_error.as_deref().unwrap_or("Video generation failed")
        )),
        _ => Some(job.phase_text.clone()),
    }
}
