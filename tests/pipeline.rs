use std::io::Cursor;

use voiceover_lib::audio::{decode_base64, AudioBuffer, AudioFormat, WavFile};
use voiceover_lib::GeneratedAudio;

fn pcm_base64(samples: &[i16]) -> String {
    use base64::Engine as _;
    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[test]
fn wav_is_readable_by_standard_reader() {
    let samples: Vec<i16> = (0..480).map(|i| ((i * 137) % 65536 - 32768) as i16).collect();
    let raw = decode_base64(&pcm_base64(&samples)).unwrap();
    let wav = WavFile::encode(&raw, 24000);

    let mut reader = hound::WavReader::new(Cursor::new(wav.as_bytes())).unwrap();
    let format = reader.spec();
    assert_eq!(format.channels, 1);
    assert_eq!(format.sample_rate, 24000);
    assert_eq!(format.bits_per_sample, 16);
    assert_eq!(format.sample_format, hound::SampleFormat::Int);

    let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(decoded, samples);
}

#[test]
fn buffer_and_wav_share_the_same_samples() {
    let samples = [i16::MIN, -1, 0, 1, 256, i16::MAX];
    let generated = GeneratedAudio::from_base64(&pcm_base64(&samples), AudioFormat::default()).unwrap();

    let mut reader = hound::WavReader::new(Cursor::new(generated.wav.as_bytes())).unwrap();
    let from_wav: Vec<f32> = reader
        .samples::<i16>()
        .map(|s| s.unwrap() as f32 / 32768.0)
        .collect();

    assert_eq!(generated.buffer.channel(0).unwrap(), from_wav.as_slice());
    assert_eq!(generated.buffer.channel(0).unwrap()[0], -1.0);
}

#[test]
fn stereo_payload_builds_two_channels() {
    let raw = decode_base64(&pcm_base64(&[100, -100, 200, -200])).unwrap();
    let buffer = AudioBuffer::from_pcm16le(&raw, 48000, 2).unwrap();
    assert_eq!(buffer.frame_count(), 2);
    assert_eq!(buffer.channel(1).unwrap(), &[-100.0 / 32768.0, -200.0 / 32768.0]);
}

#[test]
fn malformed_payload_is_rejected() {
    assert!(GeneratedAudio::from_base64("AAH/fw=", AudioFormat::default()).is_err());
}
