// Audio pipeline
// base64 payload -> raw PCM -> playable buffer and downloadable WAV

pub mod buffer;
pub mod decoder;
pub mod output;
pub mod player;
pub mod wav;

pub use buffer::{AudioBuffer, AudioFormat, DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE};
pub use decoder::{decode_base64, RawAudioBytes};
pub use output::AudioContext;
pub use player::{AudioSink, EndReason, PlaybackEvent, PlaybackSession, PlayerState, SourceId};
pub use wav::{WavFile, DEFAULT_WAV_FILE_NAME, WAV_MIME_TYPE};
