//! Prompt-audio conditioning
//!
//! Prepares a raw reference waveform for the synthesis engine: trims
//! leading/trailing silence, rescales the peak below a clipping-safe
//! ceiling, and appends a fixed run of trailing silence. Always succeeds on
//! a well-formed waveform.

use voice_gateway_core::{Waveform, OUTPUT_SAMPLE_RATE};

/// Peak amplitude ceiling after conditioning
const MAX_PEAK: f32 = 0.8;

/// Conditioning parameters
#[derive(Debug, Clone)]
pub struct ConditionerConfig {
    /// Silence threshold in dB below the peak frame energy
    pub top_db: f32,
    /// Analysis frame length in samples
    pub frame_length: usize,
    /// Hop between analysis frames in samples
    pub hop_length: usize,
    /// Trailing silence appended after trimming, in samples
    pub pad_samples: usize,
}

impl Default for ConditionerConfig {
    fn default() -> Self {
        Self {
            top_db: 60.0,
            frame_length: 440,
            hop_length: 220,
            // 0.2 s at the output rate, used as a fixed count regardless of
            // the prompt's own rate
            pad_samples: (OUTPUT_SAMPLE_RATE as f32 * 0.2) as usize,
        }
    }
}

/// Condition a prompt waveform with the default parameters
pub fn condition(waveform: &Waveform) -> Waveform {
    condition_with(waveform, &ConditionerConfig::default())
}

/// Condition a prompt waveform: trim, rescale, pad
pub fn condition_with(waveform: &Waveform, config: &ConditionerConfig) -> Waveform {
    let (start, end) = trim_bounds(&waveform.samples, config);
    let mut samples: Vec<f32> = waveform.samples[start..end].to_vec();

    let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    if peak > MAX_PEAK {
        let scale = MAX_PEAK / peak;
        for sample in &mut samples {
            *sample *= scale;
        }
    }

    samples.extend(std::iter::repeat(0.0).take(config.pad_samples));

    Waveform::new(samples, waveform.sample_rate)
}

/// Sample range of the non-silent interior of `samples`.
///
/// A frame is silent when its mean power falls more than `top_db` below the
/// loudest frame's. Frames are centered, matching the usual trim behavior of
/// audio analysis toolkits; frame `i` is centered at `i * hop_length`, so
/// the retained range is `[first_loud * hop, (last_loud + 1) * hop]` clamped
/// to the signal. An all-silent signal trims to empty.
fn trim_bounds(samples: &[f32], config: &ConditionerConfig) -> (usize, usize) {
    let powers = frame_powers(samples, config.frame_length, config.hop_length);
    let max_power = powers.iter().fold(0.0f32, |acc, &p| acc.max(p));
    let threshold = max_power * 10f32.powf(-config.top_db / 10.0);

    let loud = |p: &f32| *p > threshold;
    let first = powers.iter().position(loud);
    let last = powers.iter().rposition(loud);

    match (first, last) {
        (Some(first), Some(last)) => {
            let start = first * config.hop_length;
            let end = ((last + 1) * config.hop_length).min(samples.len());
            (start.min(end), end)
        }
        _ => (0, 0),
    }
}

/// Mean power of each centered analysis frame
fn frame_powers(samples: &[f32], frame_length: usize, hop_length: usize) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }
    let half = frame_length / 2;
    let n_frames = samples.len() / hop_length + 1;

    (0..n_frames)
        .map(|frame| {
            let center = frame * hop_length;
            let lo = center.saturating_sub(half);
            let hi = (center + half).min(samples.len());
            let window = &samples[lo..hi];
            if window.is_empty() {
                return 0.0;
            }
            // Samples beyond the signal count as zeros, so divide by the
            // full frame length
            window.iter().map(|s| s * s).sum::<f32>() / frame_length as f32
        })
        .collect()
}
