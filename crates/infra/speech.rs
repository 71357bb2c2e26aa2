use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::{
    env,
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};
use tokio::{
    process::{Child, Command},
    sync::Mutex,
};
use tracing::{debug, warn};

use crate::domain::{
    repositories::speech_playback::SpeechPlayback, value_objects::voice::SpeechSettings,
};

const BASE_WORDS_PER_MINUTE: f32 = 175.0;
const BASE_PITCH: f32 = 50.0;
const FINISH_POLL: Duration = Duration::from_millis(100);

/// Speaks through an espeak-compatible command (`-s` wpm, `-p` pitch, `-a` amplitude).
pub struct CommandSpeechPlayback {
    program: String,
    child: Mutex<Option<Child>>,
}

impl CommandSpeechPlayback {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            child: Mutex::new(None),
        }
    }

    fn resolve_program(&self) -> Option<PathBuf> {
        let candidate = Path::new(&self.program);
        if candidate.components().count() > 1 {
            return candidate.is_file().then(|| candidate.to_path_buf());
        }

        let paths = env::var_os("PATH")?;
        env::split_paths(&paths)
            .map(|dir| dir.join(&self.program))
            .find(|path| path.is_file())
    }
}

pub(crate) fn speech_args(text: &str, settings: SpeechSettings) -> Vec<String> {
    let words_per_minute = (BASE_WORDS_PER_MINUTE * settings.rate).clamp(80.0, 450.0);
    let pitch = (BASE_PITCH * settings.pitch).clamp(0.0, 99.0);
    let amplitude = (settings.volume * 100.0).clamp(0.0, 200.0);

    vec![
        "-s".to_string(),
        format!("{}", words_per_minute.round() as u32),
        "-p".to_string(),
        format!("{}", pitch.round() as u32),
        "-a".to_string(),
        format!("{}", amplitude.round() as u32),
        "--".to_string(),
        text.to_string(),
    ]
}

#[async_trait]
impl SpeechPlayback for CommandSpeechPlayback {
    fn is_supported(&self) -> bool {
        self.resolve_program().is_some()
    }

    async fn speak(&self, text: &str, settings: SpeechSettings) -> Result<()> {
        if text.trim().is_empty() {
            bail!("nothing to speak");
        }

        let mut guard = self.child.lock().await;
        if let Some(mut previous) = guard.take() {
            let _ = previous.start_kill();
        }

        let child = Command::new(&self.program)
            .args(speech_args(text, settings))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to start speech command `{}`", self.program))?;

        debug!(program = %self.program, chars = text.len(), "speech: playback started");
        *guard = Some(child);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let Some(mut child) = self.child.lock().await.take() else {
            return Ok(());
        };

        if let Err(err) = child.start_kill() {
            warn!(error = %err, "speech: failed to stop playback");
        }
        let _ = child.wait().await;
        debug!("speech: playback stopped");
        Ok(())
    }

    async fn is_speaking(&self) -> bool {
        let mut guard = self.child.lock().await;
        let running = match guard.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        };
        if !running {
            *guard = None;
        }
        running
    }

    async fn wait_until_finished(&self) -> Result<()> {
        while self.is_speaking().await {
            tokio::time::sleep(FINISH_POLL).await;
        }
        Ok(())
    }
}
