// WAV container encoder
// Wraps raw mono 16-bit PCM in a canonical 44-byte RIFF header

use std::fs;
use std::path::Path;

use super::decoder::RawAudioBytes;

pub const WAV_HEADER_LEN: usize = 44;
pub const WAV_MIME_TYPE: &str = "audio/wav";
pub const DEFAULT_WAV_FILE_NAME: &str = "tiktok-voiceover.wav";

const NUM_CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const BLOCK_ALIGN: u16 = NUM_CHANNELS * BITS_PER_SAMPLE / 8;
const FMT_CHUNK_SIZE: u32 = 16;
const FORMAT_PCM: u16 = 1;

/// A complete WAV file held in memory, ready to be saved or served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavFile {
    bytes: Vec<u8>,
}

impl WavFile {
    /// Encode `raw` as mono 16-bit PCM at `sample_rate`.
    ///
    /// The payload is copied verbatim after the header; its content is not
    /// inspected, so an odd length is written as-is.
    pub fn encode(raw: &RawAudioBytes, sample_rate: u32) -> Self {
        let data_len = raw.len() as u32;
        let byte_rate = sample_rate.wrapping_mul(BLOCK_ALIGN as u32);

        let mut bytes = Vec::with_capacity(WAV_HEADER_LEN + raw.len());

        // RIFF header
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&data_len.wrapping_add(36).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");

        // fmt sub-chunk
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&FMT_CHUNK_SIZE.to_le_bytes());
        bytes.extend_from_slice(&FORMAT_PCM.to_le_bytes());
        bytes.extend_from_slice(&NUM_CHANNELS.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&byte_rate.to_le_bytes());
        bytes.extend_from_slice(&BLOCK_ALIGN.to_le_bytes());
        bytes.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

        // data sub-chunk
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        bytes.extend_from_slice(raw.as_bytes());

        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// PCM payload following the header.
    pub fn data(&self) -> &[u8] {
        &self.bytes[WAV_HEADER_LEN..]
    }

    pub fn mime_type(&self) -> &'static str {
        WAV_MIME_TYPE
    }

    /// Write the file to `path`, replacing anything already there.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        fs::write(path, &self.bytes)?;
        log::debug!("Wrote {} byte WAV to {:?}", self.bytes.len(), path);
        Ok(())
    }
}
