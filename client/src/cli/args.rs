use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "voicefi",
    version,
    about = "Turn a spoken financial goal into a DeFi strategy, with an optional explainer video"
)]
pub struct Cli {
    /// Strategy backend base URL
    #[arg(long, global = true, env = "API_BASE_URL")]
    pub api_base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a strategy from a typed intent, a recorded clip, or a line on stdin
    Ask {
        /// Intent text; skips voice capture
        #[arg(long, conflicts_with = "audio")]
        intent: Option<String>,

        /// Audio clip to transcribe remotely
        #[arg(long)]
        audio: Option<PathBuf>,

        /// Also generate an explainer video
        #[arg(long)]
        video: bool,

        /// Read the plan aloud
        #[arg(long)]
        speak: bool,

        /// Save the finished video into this directory
        #[arg(long, requires = "video")]
        download: Option<PathBuf>,
    },

    /// Browse and manage saved strategies
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Generate an explainer video for a saved strategy
    Video {
        strategy_id: String,

        /// Save the finished video into this directory
        #[arg(long)]
        download: Option<PathBuf>,
    },

    /// List generated videos
    Videos,

    /// Synthesize speech remotely and write the audio to a file
    Tts {
        text: String,

        #[arg(long, short)]
        output: PathBuf,

        #[arg(long)]
        voice: Option<String>,
    },

    /// Manage the saved bearer token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Check that the backend is reachable
    Health,
}

#[derive(Debug, Subcommand)]
pub enum HistoryAction {
    List,
    Show { id: String },
    /// Store a typed intent without generating a plan
    Create {
        #[arg(long)]
        intent: String,
    },
    /// Replace the intent of a saved strategy
    Update {
        id: String,
        #[arg(long)]
        intent: String,
    },
    Delete { id: String },
    Save { id: String },
    Favorite { id: String },
}

#[derive(Debug, Subcommand)]
pub enum TokenAction {
    Set { token: String },
    Clear,
    Status,
}
