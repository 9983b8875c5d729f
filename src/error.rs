// Error types shared across the pipeline
use thiserror::Error;

/// The payload was not valid base64.
#[derive(Debug, Error)]
#[error("invalid base64 audio payload: {0}")]
pub struct DecodeError(#[from] pub base64::DecodeError);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AudioError {
    #[error("invalid audio format: {sample_rate} Hz, {channels} channel(s)")]
    InvalidFormat { sample_rate: u32, channels: u16 },
}

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("no audio output device available")]
    NoOutputDevice,

    #[error("unsupported output sample format: {0}")]
    UnsupportedSampleFormat(String),

    #[error("audio device error: {0}")]
    Device(String),

    #[error("audio stream error: {0}")]
    Stream(String),

    #[error("resampling failed: {0}")]
    Resample(String),

    #[error("no generated audio to play")]
    NothingToPlay,

    /// The source already ended on its own (or was replaced) before `stop` reached it.
    #[error("source {0} has already finished")]
    SourceFinished(u64),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("speech provider request failed: {0}")]
    Provider(String),

    #[error("generation was cancelled")]
    Cancelled,

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Audio(#[from] AudioError),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),
}
