//! Wire encoding for audio samples

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

/// Convert f32 samples to 16-bit little-endian PCM bytes
pub fn pcm16_bytes(samples: &[f32]) -> Vec<u8> {
    samples
        .iter()
        .flat_map(|&sample| {
            let clamped = sample.clamp(-1.0, 1.0);
            let i16_sample = (clamped * 32767.0) as i16;
            i16_sample.to_le_bytes()
        })
        .collect()
}

/// Base64-encoded 16-bit PCM, the form audio takes on the wire
pub fn pcm16_base64(samples: &[f32]) -> String {
    BASE64.encode(pcm16_bytes(samples))
}
