// Payload decoder
// Turns the base64 text carried by a TTS response into raw PCM bytes

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::ops::Deref;

use crate::error::DecodeError;

/// Raw little-endian PCM bytes exactly as the provider sent them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawAudioBytes(Vec<u8>);

impl RawAudioBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for RawAudioBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for RawAudioBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// Decode a standard, padded base64 payload.
///
/// Whitespace around and between lines is ignored, since some transports
/// wrap long payloads. Anything else outside the alphabet is an error.
pub fn decode_base64(payload: &str) -> Result<RawAudioBytes, DecodeError> {
    let bytes = if payload.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD.decode(compact)?
    } else {
        STANDARD.decode(payload)?
    };

    Ok(RawAudioBytes(bytes))
}
