// PCM audio buffer
// Interprets raw 16-bit little-endian PCM as normalized per-channel samples

use std::time::Duration;

use super::decoder::RawAudioBytes;
use crate::error::AudioError;

pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;
pub const DEFAULT_CHANNELS: u16 = 1;

const BYTES_PER_SAMPLE: usize = 2;
const PCM16_SCALE: f32 = 1.0 / 32768.0;

/// Sample rate and channel count of a PCM payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
        }
    }
}

/// Decoded audio, one `Vec<f32>` per channel, values in [-1.0, 1.0].
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Build a buffer from interleaved signed 16-bit little-endian PCM.
    ///
    /// Each sample is scaled by 1/32768, so -32768 maps to exactly -1.0 and
    /// 32767 stays just below 1.0. Bytes that do not complete a frame are
    /// dropped. `sample_rate` is carried as metadata; nothing is resampled.
    pub fn from_pcm16le(
        raw: &RawAudioBytes,
        sample_rate: u32,
        channel_count: u16,
    ) -> Result<Self, AudioError> {
        if sample_rate == 0 || channel_count == 0 {
            return Err(AudioError::InvalidFormat {
                sample_rate,
                channels: channel_count,
            });
        }

        let num_channels = channel_count as usize;
        let frame_bytes = BYTES_PER_SAMPLE * num_channels;
        let frames = raw.len() / frame_bytes;

        let mut channels = vec![Vec::with_capacity(frames); num_channels];

        for frame in raw.chunks_exact(frame_bytes) {
            for (ch, sample) in frame.chunks_exact(BYTES_PER_SAMPLE).enumerate() {
                let value = i16::from_le_bytes([sample[0], sample[1]]);
                channels[ch].push(value as f32 * PCM16_SCALE);
            }
        }

        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Build a buffer using the given format.
    pub fn from_pcm16le_with(raw: &RawAudioBytes, format: AudioFormat) -> Result<Self, AudioError> {
        Self::from_pcm16le(raw, format.sample_rate, format.channels)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn frame_count(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    /// Samples of one channel, or `None` if `index` is out of range.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frame_count() as f64 / self.sample_rate as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(bytes: &[u8]) -> RawAudioBytes {
        RawAudioBytes::new(bytes.to_vec())
    }

    #[test]
    fn test_scaling_boundaries() {
        let buffer = AudioBuffer::from_pcm16le(&raw(&[0x00, 0x80, 0xFF, 0x7F, 0x00, 0x00]), 24000, 1).unwrap();
        let samples = buffer.channel(0).unwrap();
        assert_eq!(samples[0], -1.0);
        assert_eq!(samples[1], 32767.0 / 32768.0);
        assert!(samples[1] < 1.0);
        assert_eq!(samples[2], 0.0);
    }

    #[test]
    fn test_reference_scenario() {
        let buffer = AudioBuffer::from_pcm16le(&raw(&[0x00, 0x01, 0xFF, 0x7F]), 24000, 1).unwrap();
        let samples = buffer.channel(0).unwrap();
        assert_eq!(samples, &[0.0078125, 32767.0 / 32768.0]);
        assert!((samples[1] - 0.999_969_482).abs() < 1e-7);
        assert_eq!(buffer.frame_count(), 2);
        assert_eq!(buffer.sample_rate(), 24000);
    }

    #[test]
    fn test_every_value_scales_by_32768() {
        for v in [i16::MIN, -12345, -1, 0, 1, 256, 12345, i16::MAX] {
            let buffer = AudioBuffer::from_pcm16le(&raw(&v.to_le_bytes()), 24000, 1).unwrap();
            assert_eq!(buffer.channel(0).unwrap()[0], v as f32 / 32768.0);
        }
    }

    #[test]
    fn test_odd_trailing_byte_dropped() {
        let buffer = AudioBuffer::from_pcm16le(&raw(&[0x00, 0x01, 0xFF]), 24000, 1).unwrap();
        assert_eq!(buffer.frame_count(), 1);
    }

    #[test]
    fn test_frame_count_law() {
        let bytes: Vec<u8> = (0..23u8).collect();
        for channels in 1..=4u16 {
            let buffer = AudioBuffer::from_pcm16le(&raw(&bytes), 16000, channels).unwrap();
            assert_eq!(buffer.frame_count(), bytes.len() / 2 / channels as usize);
            assert_eq!(buffer.channel_count(), channels as usize);
            for ch in buffer.channels() {
                assert_eq!(ch.len(), buffer.frame_count());
            }
        }
    }

    #[test]
    fn test_stereo_deinterleave() {
        // L0=1, R0=-1, L1=2, R1=-2, then a lone left sample that is dropped
        let mut bytes = Vec::new();
        for v in [1i16, -1, 2, -2, 3] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let buffer = AudioBuffer::from_pcm16le(&raw(&bytes), 24000, 2).unwrap();
        assert_eq!(buffer.channel(0).unwrap(), &[1.0 / 32768.0, 2.0 / 32768.0]);
        assert_eq!(buffer.channel(1).unwrap(), &[-1.0 / 32768.0, -2.0 / 32768.0]);
        assert!(buffer.channel(2).is_none());
    }

    #[test]
    fn test_empty_input() {
        let buffer = AudioBuffer::from_pcm16le(&raw(&[]), 24000, 1).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.channel_count(), 1);
        assert_eq!(buffer.duration(), Duration::ZERO);
    }

    #[test]
    fn test_invalid_format() {
        assert_eq!(
            AudioBuffer::from_pcm16le(&raw(&[0, 0]), 0, 1),
            Err(AudioError::InvalidFormat { sample_rate: 0, channels: 1 })
        );
        assert!(AudioBuffer::from_pcm16le(&raw(&[0, 0]), 24000, 0).is_err());
    }

    #[test]
    fn test_duration() {
        let bytes = vec![0u8; 48000];
        let buffer = AudioBuffer::from_pcm16le_with(&raw(&bytes), AudioFormat::default()).unwrap();
        assert_eq!(buffer.duration(), Duration::from_secs(1));
    }
}
