// Voiceover - TTS audio pipeline
// Module declarations
pub mod audio;
pub mod commands;
pub mod error;
pub mod generation;
pub mod settings;
pub mod state;

use anyhow::{Context, Result};
use clap::Parser;

pub use error::{AudioError, DecodeError, GenerationError, PlaybackError, SettingsError};
pub use state::{AppState, GeneratedAudio};

pub fn run() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = commands::Cli::parse();

    // Single-threaded: the audio context and session live on this thread
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(commands::dispatch(cli))
}
