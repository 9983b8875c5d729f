// Audio output using cpal
// Opens the default device on first use and plays one voice at a time

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};
use parking_lot::Mutex;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::cell::OnceCell;
use std::sync::Arc;

use super::buffer::AudioBuffer;
use super::player::{AudioSink, EndReason, EventSender, PlaybackEvent, SourceId};
use crate::error::PlaybackError;

const RESAMPLE_CHUNK: usize = 1024;

/// A buffer rendered to the device layout, plus where playback has got to.
struct Voice {
    id: SourceId,
    samples: Vec<f32>,
    position: usize,
    events: EventSender,
}

impl Voice {
    fn end(self, reason: EndReason) {
        // The receiver may be gone if the session was dropped mid-playback.
        let _ = self.events.send(PlaybackEvent {
            source: self.id,
            reason,
        });
    }
}

/// The one voice the stream callback reads from.
#[derive(Default)]
struct VoiceSlot(Mutex<Option<Voice>>);

impl VoiceSlot {
    /// Install `voice`, ending whatever was there as `Stopped`.
    fn replace(&self, voice: Voice) {
        if let Some(previous) = self.0.lock().replace(voice) {
            log::warn!("Source {} replaced without being stopped", previous.id);
            previous.end(EndReason::Stopped);
        }
    }

    /// End `id` as `Stopped`. A different or missing voice is left alone.
    fn stop(&self, id: SourceId) -> Result<(), PlaybackError> {
        let mut slot = self.0.lock();

        match slot.take() {
            Some(v) if v.id == id => {
                v.end(EndReason::Stopped);
                Ok(())
            }
            other => {
                *slot = other;
                Err(PlaybackError::SourceFinished(id.get()))
            }
        }
    }

    /// End the current voice because the stream broke.
    fn fail(&self) {
        if let Some(v) = self.0.lock().take() {
            v.end(EndReason::Failed);
        }
    }

    /// Copy the next `data.len()` samples out, or silence when idle.
    ///
    /// A voice that runs out is removed and reports `Finished`.
    fn fill<T: cpal::SizedSample + cpal::FromSample<f32>>(&self, data: &mut [T], vol: f32) {
        let mut slot = self.0.lock();

        let finished = match slot.as_mut() {
            Some(v) => {
                for sample in data.iter_mut() {
                    let value = v.samples.get(v.position).copied().unwrap_or(0.0);
                    v.position += 1;
                    *sample = T::from_sample(value * vol);
                }
                v.position >= v.samples.len()
            }
            None => {
                for sample in data.iter_mut() {
                    *sample = T::from_sample(0.0f32);
                }
                false
            }
        };

        if finished {
            if let Some(v) = slot.take() {
                v.end(EndReason::Finished);
            }
        }
    }
}

struct OutputDevice {
    _stream: Stream,
    voice: Arc<VoiceSlot>,
    sample_rate: u32,
    channels: u16,
}

impl OutputDevice {
    fn open(volume: f32) -> Result<Self, PlaybackError> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or(PlaybackError::NoOutputDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| PlaybackError::Device(e.to_string()))?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels();

        let voice = Arc::new(VoiceSlot::default());

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &config.into(), voice.clone(), volume)?
            }
            cpal::SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &config.into(), voice.clone(), volume)?
            }
            cpal::SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &config.into(), voice.clone(), volume)?
            }
            format => return Err(PlaybackError::UnsupportedSampleFormat(format!("{:?}", format))),
        };

        stream
            .play()
            .map_err(|e| PlaybackError::Stream(e.to_string()))?;

        log::info!(
            "Opened audio output: {} Hz, {} channel(s), volume {:.2}",
            sample_rate,
            channels,
            volume
        );

        Ok(Self {
            _stream: stream,
            voice,
            sample_rate,
            channels,
        })
    }

    fn build_stream<T: cpal::SizedSample + cpal::FromSample<f32>>(
        device: &cpal::Device,
        config: &StreamConfig,
        voice: Arc<VoiceSlot>,
        volume: f32,
    ) -> Result<Stream, PlaybackError> {
        let failed = voice.clone();

        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    voice.fill(data, volume);
                },
                move |err| {
                    log::error!("Audio output error: {}", err);
                    failed.fail();
                },
                None,
            )
            .map_err(|e| PlaybackError::Stream(e.to_string()))?;

        Ok(stream)
    }
}

/// The process-wide audio output.
///
/// Nothing touches the sound device until the first `start`; after that
/// the stream stays open until the context is dropped.
pub struct AudioContext {
    device: OnceCell<OutputDevice>,
    volume: f32,
}

impl AudioContext {
    pub fn new(volume: f32) -> Self {
        Self {
            device: OnceCell::new(),
            volume: volume.clamp(0.0, 1.0),
        }
    }

    pub fn is_open(&self) -> bool {
        self.device.get().is_some()
    }

    fn device(&self) -> Result<&OutputDevice, PlaybackError> {
        if let Some(device) = self.device.get() {
            return Ok(device);
        }
        let _ = self.device.set(OutputDevice::open(self.volume)?);
        self.device.get().ok_or(PlaybackError::NoOutputDevice)
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }
}

impl Default for AudioContext {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl AudioSink for AudioContext {
    fn start(
        &self,
        id: SourceId,
        buffer: Arc<AudioBuffer>,
        events: EventSender,
    ) -> Result<(), PlaybackError> {
        let device = self.device()?;
        let samples = render(&buffer, device.sample_rate, device.channels as usize)?;

        device.voice.replace(Voice {
            id,
            samples,
            position: 0,
            events,
        });

        Ok(())
    }

    fn stop(&self, id: SourceId) -> Result<(), PlaybackError> {
        let device = self.device.get().ok_or(PlaybackError::SourceFinished(id.get()))?;
        device.voice.stop(id)
    }
}

/// Resample `buffer` to `rate` and interleave it into `channels` output channels.
///
/// Output channel `k` takes source channel `min(k, n - 1)`, so mono is
/// copied to every speaker.
fn render(buffer: &AudioBuffer, rate: u32, channels: usize) -> Result<Vec<f32>, PlaybackError> {
    if buffer.is_empty() || channels == 0 {
        return Ok(vec![]);
    }

    let resampled;
    let planes: &[Vec<f32>] = if buffer.sample_rate() == rate {
        buffer.channels()
    } else {
        resampled = resample(buffer.channels(), buffer.sample_rate(), rate)?;
        &resampled
    };

    Ok(interleave(planes, channels))
}

fn interleave(planes: &[Vec<f32>], channels: usize) -> Vec<f32> {
    let Some(last) = planes.len().checked_sub(1) else {
        return vec![];
    };
    let frames = planes[0].len();

    let mut interleaved = Vec::with_capacity(frames * channels);

    for frame in 0..frames {
        for ch in 0..channels {
            interleaved.push(planes[ch.min(last)][frame]);
        }
    }

    interleaved
}

fn resample(planes: &[Vec<f32>], from_rate: u32, to_rate: u32) -> Result<Vec<Vec<f32>>, PlaybackError> {
    let frames = planes[0].len();
    let ratio = to_rate as f64 / from_rate as f64;
    let expected = (frames as f64 * ratio).ceil() as usize;

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, RESAMPLE_CHUNK, planes.len())
        .map_err(|e| PlaybackError::Resample(e.to_string()))?;

    // The filter holds back this many output frames; skip them and flush
    // with silence so the tail of the clip is not lost.
    let delay = resampler.output_delay();
    let mut out = vec![Vec::with_capacity(delay + expected); planes.len()];

    let mut position = 0;
    while position < frames {
        let end = (position + RESAMPLE_CHUNK).min(frames);
        let chunk: Vec<&[f32]> = planes.iter().map(|p| &p[position..end]).collect();

        let block = if end - position == RESAMPLE_CHUNK {
            resampler.process(chunk.as_slice(), None)
        } else {
            resampler.process_partial(Some(chunk.as_slice()), None)
        }
        .map_err(|e| PlaybackError::Resample(e.to_string()))?;

        append(&mut out, block);
        position = end;
    }

    while out[0].len() < delay + expected {
        let block = resampler
            .process_partial(None::<&[Vec<f32>]>, None)
            .map_err(|e| PlaybackError::Resample(e.to_string()))?;
        if block[0].is_empty() {
            break;
        }
        append(&mut out, block);
    }

    for channel in &mut out {
        channel.drain(..delay.min(channel.len()));
        channel.truncate(expected);
    }

    Ok(out)
}

fn append(out: &mut [Vec<f32>], block: Vec<Vec<f32>>) {
    for (channel, samples) in out.iter_mut().zip(block) {
        channel.extend(samples);
    }
}
