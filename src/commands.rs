// Command handlers for the voiceover binary
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::error::GenerationError;
use crate::generation::{GenerationOutcome, SpeechProvider, SpeechRequest, SpeechResponse};
use crate::settings::AppSettings;
use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "voiceover", version, about = "Render text-to-speech payloads to WAV and play them")]
pub struct Cli {
    /// Directory holding settings.json
    #[arg(long, global = true, default_value = ".")]
    pub settings_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Turn a recorded provider response into a WAV file
    Render(RenderArgs),
    /// Write the default settings file
    InitSettings,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Provider response JSON, or base64 PCM text with --base64
    pub input: PathBuf,

    /// Treat INPUT as a bare base64 payload
    #[arg(long)]
    pub base64: bool,

    /// Directory to write the WAV file into
    #[arg(long, short, default_value = ".")]
    pub out: PathBuf,

    /// Play the audio after rendering
    #[arg(long)]
    pub play: bool,
}

/// Serves a response saved on disk, standing in for the remote service.
pub struct RecordedProvider {
    path: PathBuf,
    raw_base64: bool,
}

impl RecordedProvider {
    pub fn new(path: PathBuf, raw_base64: bool) -> Self {
        Self { path, raw_base64 }
    }
}

impl SpeechProvider for RecordedProvider {
    async fn synthesize(&self, _request: &SpeechRequest) -> Result<SpeechResponse, GenerationError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| GenerationError::Provider(format!("{}: {}", self.path.display(), e)))?;

        if self.raw_base64 {
            return Ok(SpeechResponse::with_audio("audio/L16;codec=pcm", content.trim()));
        }

        SpeechResponse::from_json(&content)
            .map_err(|e| GenerationError::Provider(format!("malformed response: {}", e)))
    }
}

pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Render(args) => render(&cli.settings_dir, args).await,
        Command::InitSettings => init_settings(&cli.settings_dir),
    }
}

async fn render(settings_dir: &Path, args: RenderArgs) -> Result<()> {
    let settings = AppSettings::load(settings_dir).context("Failed to load settings")?;
    let mut state = AppState::new(settings);

    let provider = RecordedProvider::new(args.input, args.base64);
    let outcome = state
        .generate(&provider, &SpeechRequest::default())
        .await
        .context("Failed to generate audio")?;

    if outcome == GenerationOutcome::Empty {
        log::warn!("Nothing to render");
        return Ok(());
    }

    if let Some(path) = state
        .export_wav(&args.out)
        .with_context(|| format!("Failed to write WAV into {:?}", args.out))?
    {
        println!("{}", path.display());
    }

    if args.play {
        state.play().context("Failed to start playback")?;
        state.wait_for_playback_end().await;
    }

    Ok(())
}

fn init_settings(settings_dir: &Path) -> Result<()> {
    AppSettings::default()
        .save(settings_dir)
        .context("Failed to save settings")?;
    println!("{}", AppSettings::get_settings_path(settings_dir).display());
    Ok(())
}
