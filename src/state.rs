// Application state management
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::audio::{
    decode_base64, AudioBuffer, AudioContext, AudioFormat, AudioSink, PlaybackSession,
    PlayerState, RawAudioBytes, SourceId, WavFile,
};
use crate::error::{GenerationError, PlaybackError};
use crate::generation::{
    cancellable, GenerationCanceller, GenerationOutcome, SpeechProvider, SpeechRequest,
    SpeechResponse,
};
use crate::settings::AppSettings;

/// Everything produced from one successful generation.
#[derive(Debug, Clone)]
pub struct GeneratedAudio {
    pub raw: RawAudioBytes,
    pub buffer: Arc<AudioBuffer>,
    pub wav: WavFile,
}

impl GeneratedAudio {
    /// Decode a base64 payload and derive both the playback buffer and the WAV file.
    ///
    /// Nothing is returned unless every step succeeds.
    pub fn from_base64(payload: &str, format: AudioFormat) -> Result<Self, GenerationError> {
        let raw = decode_base64(payload)?;
        let buffer = AudioBuffer::from_pcm16le_with(&raw, format)?;
        let wav = WavFile::encode(&raw, format.sample_rate);

        Ok(Self {
            raw,
            buffer: Arc::new(buffer),
            wav,
        })
    }
}

pub struct AppState<S: AudioSink = AudioContext> {
    pub settings: AppSettings,
    sink: S,
    session: PlaybackSession,
    result: Option<GeneratedAudio>,
    generating: bool,
    canceller: GenerationCanceller,
}

impl AppState<AudioContext> {
    pub fn new(settings: AppSettings) -> Self {
        let sink = AudioContext::new(settings.audio.volume);
        Self::with_sink(settings, sink)
    }
}

impl<S: AudioSink> AppState<S> {
    pub fn with_sink(settings: AppSettings, sink: S) -> Self {
        Self {
            settings,
            sink,
            session: PlaybackSession::new(),
            result: None,
            generating: false,
            canceller: GenerationCanceller::new(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn result(&self) -> Option<&GeneratedAudio> {
        self.result.as_ref()
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn playback_state(&mut self) -> PlayerState {
        self.session.poll_events();
        self.session.state()
    }

    /// Handle for cancelling an in-flight `generate` from elsewhere.
    pub fn canceller(&self) -> GenerationCanceller {
        self.canceller.clone()
    }

    /// Request speech from `provider` and replace the current result with it.
    ///
    /// Playback and the previous result are cleared before the request goes
    /// out. On any error the state is left exactly as after `reset`.
    pub async fn generate<P: SpeechProvider>(
        &mut self,
        provider: &P,
        request: &SpeechRequest,
    ) -> Result<GenerationOutcome, GenerationError> {
        self.reset();
        self.generating = true;

        let cancelled = self.canceller.subscribe();
        let response = cancellable(provider.synthesize(request), cancelled).await;
        self.generating = false;

        match response {
            Ok(response) => self.accept(&response),
            Err(e) => {
                log::error!("Generation failed: {}", e);
                Err(e)
            }
        }
    }

    /// Take a provider response as the current result, stopping any playback of the old one.
    pub(crate) fn accept(&mut self, response: &SpeechResponse) -> Result<GenerationOutcome, GenerationError> {
        let Some(audio) = response.inline_audio() else {
            log::warn!("Provider response contained no audio payload");
            return Ok(GenerationOutcome::Empty);
        };

        let mut format = self.settings.audio.format();
        if let Some(rate) = audio.sample_rate() {
            format.sample_rate = rate;
        }

        let generated = GeneratedAudio::from_base64(&audio.data, format)?;
        log::info!(
            "Generated {:.2}s of audio ({} bytes PCM, {} Hz)",
            generated.buffer.duration().as_secs_f64(),
            generated.raw.len(),
            format.sample_rate
        );

        self.stop();
        self.result = Some(generated);
        Ok(GenerationOutcome::Ready)
    }

    /// Play the current result from the start, replacing any playback.
    pub fn play(&mut self) -> Result<SourceId, PlaybackError> {
        let buffer = self
            .result
            .as_ref()
            .map(|r| r.buffer.clone())
            .ok_or(PlaybackError::NothingToPlay)?;

        self.session.poll_events();
        self.session.play(&self.sink, buffer)
    }

    pub fn stop(&mut self) {
        self.session.stop(&self.sink);
    }

    /// Stop playback and drop the current result.
    pub fn reset(&mut self) {
        self.stop();
        self.result = None;
    }

    /// Apply any end-of-playback notifications that have arrived.
    pub fn poll_events(&mut self) {
        self.session.poll_events();
    }

    pub async fn wait_for_playback_end(&mut self) {
        self.session.wait_until_idle().await;
    }

    /// Write the current WAV into `dir` under the configured file name.
    pub fn export_wav(&self, dir: &Path) -> std::io::Result<Option<PathBuf>> {
        let Some(result) = &self.result else {
            return Ok(None);
        };

        let path = dir.join(&self.settings.export.file_name);
        result.wav.save(&path)?;
        log::info!("Saved {} ({}) to {:?}", self.settings.export.file_name, result.wav.mime_type(), path);

        Ok(Some(path))
    }
}
