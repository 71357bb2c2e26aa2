use anyhow::{Context, Result, bail};
use crates::{
    domain::{
        entities::{strategies::StrategyEntity, video_jobs::VideoJob},
        repositories::{
            strategies::StrategyClient, token_store::TokenStore,
            video_generation::VideoGenerationClient, voice_capture::VoiceCapture,
        },
        value_objects::{enums::job_states::JobState, video::GenerateVideoRequest},
    },
    infra::{
        http::{
            api_client::{ApiClient, ApiClientConfig},
            strategy_api::StrategyApi,
            video_api::VideoApi,
            voice_api::VoiceApi,
        },
        speech::CommandSpeechPlayback,
        token_store::{FileTokenStore, OverrideTokenStore},
        voice::{LineVoiceCapture, RemoteTranscriptionCapture},
    },
};
use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{info, warn};

use super::{
    args::{Command, HistoryAction, TokenAction},
    render,
};
use crate::{
    config::config_model::{DotEnvyConfig, VideoDefaults},
    usecases::{
        explanation_playback::{ExplanationPlayback, PlaybackState},
        strategy_history::StrategyHistory,
        strategy_session::StrategySession,
        video_download::VideoDownload,
        video_job_poller::{PollerConfig, VideoJobPoller},
    },
};

/// Wires adapters and use cases for one CLI invocation.
pub struct App {
    config: DotEnvyConfig,
    token_store: Arc<OverrideTokenStore<FileTokenStore>>,
    api_client: Arc<ApiClient>,
    strategy_api: Arc<StrategyApi>,
    video_client: Arc<dyn VideoGenerationClient + Send + Sync>,
    voice_api: Arc<VoiceApi>,
}

impl App {
    pub fn new(config: DotEnvyConfig) -> Result<Self> {
        let token_store = Arc::new(OverrideTokenStore::new(
            config.auth.token_override.clone(),
            FileTokenStore::new(&config.auth.token_file),
        ));

        let api_client = Arc::new(ApiClient::new(
            &ApiClientConfig {
                base_url: config.api.base_url.clone(),
                timeout: config.api.timeout(),
            },
            Arc::clone(&token_store) as Arc<dyn TokenStore + Send + Sync>,
        )?);

        let strategy_api = Arc::new(StrategyApi::new(Arc::clone(&api_client)));
        let video_client: Arc<dyn VideoGenerationClient + Send + Sync> =
            Arc::new(VideoApi::new(Arc::clone(&api_client)));
        let voice_api = Arc::new(VoiceApi::new(Arc::clone(&api_client)));

        Ok(Self {
            config,
            token_store,
            api_client,
            strategy_api,
            video_client,
            voice_api,
        })
    }

    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Ask {
                intent,
                audio,
                video,
                speak,
                download,
            } => {
                self.ask(intent, audio, video, speak, download.as_deref())
                    .await
            }
            Command::History { action } => self.history(action).await,
            Command::Video {
                strategy_id,
                download,
            } => {
                let strategy = self
                    .strategy_api
                    .find_strategy(&strategy_id)
                    .await
                    .with_context(|| format!("Failed to load strategy {strategy_id}"))?
                    .to_strategy();
                self.generate_video(&strategy, download.as_deref()).await
            }
            Command::Videos => {
                let videos = self
                    .video_client
                    .list_videos()
                    .await
                    .context("Failed to list videos")?;
                if videos.is_empty() {
                    println!("No videos yet.");
                }
                for video in &videos {
                    println!("{}", render::video_row(video));
                }
                Ok(())
            }
            Command::Tts {
                text,
                output,
                voice,
            } => {
                let audio = self.voice_api.text_to_speech(&text, voice).await?;
                tokio::fs::write(&output, &audio)
                    .await
                    .with_context(|| format!("failed to write {}", output.display()))?;
                println!("Wrote {} bytes to {}", audio.len(), output.display());
                Ok(())
            }
            Command::Token { action } => self.token(action),
            Command::Health => {
                if self.api_client.health_check().await {
                    println!("Backend at {} is healthy", self.api_client.base_url());
                    Ok(())
                } else {
                    bail!("Backend at {} is unreachable", self.api_client.base_url())
                }
            }
        }
    }

    async fn ask(
        &self,
        intent: Option<String>,
        audio: Option<PathBuf>,
        video: bool,
        speak: bool,
        download: Option<&Path>,
    ) -> Result<()> {
        let transcript = match (intent, audio) {
            (Some(intent), _) => intent,
            (None, Some(audio)) => {
                let capture = RemoteTranscriptionCapture::new(audio, Arc::clone(&self.voice_api));
                self.capture(&capture).await?
            }
            (None, None) => {
                eprint!("What would you like to do with your funds? ");
                std::io::stderr().flush().ok();
                self.capture(&LineVoiceCapture::stdin()).await?
            }
        };

        let session = StrategySession::new(Arc::clone(&self.strategy_api));
        let strategy = session.generate_from_transcript(&transcript).await?;
        println!("{}", render::strategy_card(&strategy));

        if speak {
            self.speak_plan(&strategy.plan).await?;
        }
        if video {
            println!();
            self.generate_video(&strategy, download).await?;
        }
        Ok(())
    }

    async fn capture<C: VoiceCapture + Sync>(&self, capture: &C) -> Result<String> {
        if !capture.is_supported() {
            bail!("Speech input is not available");
        }
        capture.capture_transcript().await
    }

    async fn speak_plan(&self, plan: &str) -> Result<()> {
        let playback = ExplanationPlayback::new(Arc::new(CommandSpeechPlayback::new(
            self.config.speech.command.clone(),
        )));

        if playback.toggle(plan).await? == PlaybackState::Playing {
            println!("Playing explanation...");
            playback.wait_until_finished().await?;
        }
        Ok(())
    }

    async fn generate_video(
        &self,
        strategy: &StrategyEntity,
        download: Option<&Path>,
    ) -> Result<()> {
        let poller_config = PollerConfig::try_from(&self.config.video_polling)?;
        let poller = VideoJobPoller::new(Arc::clone(&self.video_client), poller_config);

        poller.submit(Some(video_request(strategy, &self.config.video_defaults)));
        let job = tokio::select! {
            job = follow_progress(&poller) => job,
            _ = tokio::signal::ctrl_c() => {
                poller.cancel();
                warn!("generate_video: cancelled by user");
                bail!("Video generation cancelled");
            }
        };

        match job.state {
            JobState::Completed => {
                if let Some(dir) = download {
                    let path = VideoDownload::new(Arc::clone(&self.video_client))
                        .save(&job, strategy.id.as_deref(), dir)
                        .await?;
                    println!("Saved video to {}", path.display());
                }
                Ok(())
            }
            _ => bail!(
                "{}",
                job.last_error
                    .unwrap_or_else(|| "Video generation failed".to_string())
            ),
        }
    }

    async fn history(&self, action: HistoryAction) -> Result<()> {
        let mut history = StrategyHistory::new(Arc::clone(&self.strategy_api));

        match action {
            HistoryAction::List => {
                let items = history.refresh().await?;
                if items.is_empty() {
                    println!("No strategies yet. Run `voicefi ask` to create one.");
                }
                for item in items {
                    println!("{}", render::history_row(item));
                }
            }
            HistoryAction::Show { id } => {
                let item = history.get(&id).await?;
                println!("{}", render::strategy_card(&item.to_strategy()));
            }
            HistoryAction::Create { intent } => {
                let item = history.create(&intent).await?;
                println!("Created strategy {}", item.id);
            }
            HistoryAction::Update { id, intent } => {
                let item = history.revise(&id, &intent).await?;
                println!("{}", render::strategy_card(&item.to_strategy()));
            }
            HistoryAction::Delete { id } => {
                history.delete(&id).await?;
                println!("Deleted strategy {id}");
            }
            HistoryAction::Save { id } => {
                history.save(&id).await?;
                println!("Saved strategy {id}");
            }
            HistoryAction::Favorite { id } => {
                let item = history.toggle_favorite(&id).await?;
                let label = if item.is_favorite() { "added to" } else { "removed from" };
                println!("Strategy {id} {label} favorites");
            }
        }
        Ok(())
    }

    fn token(&self, action: TokenAction) -> Result<()> {
        match action {
            TokenAction::Set { token } => {
                self.token_store.set_token(&token)?;
                info!(path = %self.config.auth.token_file.display(), "token: saved");
                println!("Token saved");
            }
            TokenAction::Clear => {
                self.token_store.clear_token()?;
                println!("Token cleared");
            }
            TokenAction::Status => {
                let state = match (self.token_store.is_overridden(), self.token_store.token()) {
                    (true, _) => "set from AUTH_TOKEN",
                    (false, Some(_)) => "saved",
                    (false, None) => "not set",
                };
                println!("Token {state}");
            }
        }
        Ok(())
    }
}

/// Builds the submit payload, letting configured template/voice/persona win over the defaults.
pub fn video_request(strategy: &StrategyEntity, defaults: &VideoDefaults) -> GenerateVideoRequest {
    let mut request = GenerateVideoRequest::new(strategy.id.clone(), strategy.video_content());
    if defaults.template.is_some() {
        request.template = defaults.template.clone();
    }
    if defaults.voice.is_some() {
        request.voice = defaults.voice.clone();
    }
    request.persona = defaults.persona.clone();
    request
}

/// Prints each distinct progress line until the job settles.
async fn follow_progress(poller: &VideoJobPoller) -> VideoJob {
    let mut rx = poller.subscribe();
    let mut last_line = None;

    loop {
        let job = rx.borrow_and_update().clone();
        let line = render::job_line(&job);
        if line.is_some() && line != last_line {
            if let Some(text) = &line {
                println!("{text}");
            }
            last_line = line;
        }

        if job.is_terminal() || job.state == JobState::Idle {
            return job;
        }
        if rx.changed().await.is_err() {
            return poller.snapshot();
        }
    }
}
