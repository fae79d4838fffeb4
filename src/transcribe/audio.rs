// WAV decoding and conversion to whisper's input format.
//
// Whisper wants mono f32 samples at 16kHz. Source files can be any channel
// count, bit depth, or rate that hound can decode.

use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// Whisper's required sample rate.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Load a WAV file and convert it to 16kHz mono f32 samples in [-1.0, 1.0].
pub fn load_wav_16k_mono(path: &Path) -> Result<Vec<f32>> {
    let reader = hound::WavReader::open(path)
        .map_err(|e| Error::InvalidInput(format!("cannot read {}: {e}", path.display())))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::InvalidInput(format!("bad sample in {}: {e}", path.display())))?,
        hound::SampleFormat::Int => {
            let max = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| Error::InvalidInput(format!("bad sample in {}: {e}", path.display())))?
        }
    };

    let mono = mix_to_mono(&samples, spec.channels as usize);
    let resampled = resample(&mono, spec.sample_rate, WHISPER_SAMPLE_RATE);

    debug!(
        channels = spec.channels,
        source_rate = spec.sample_rate,
        duration_secs = resampled.len() as f32 / WHISPER_SAMPLE_RATE as f32,
        "decoded audio file"
    );

    Ok(resampled)
}

/// Average interleaved channels down to mono.
fn mix_to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Linear-interpolation resampler. Speech-band fidelity is all whisper
/// needs, so a windowed-sinc filter is not warranted.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let out_len = (samples.len() as f64 / ratio).floor() as usize;
    let mut out = Vec::with_capacity(out_len);

    for i in 0..out_len {
        let pos = i as f64 * ratio;
        let idx = pos as usize;
        let frac = (pos - idx as f64) as f32;
        let a = samples[idx];
        let b = if idx + 1 < samples.len() {
            samples[idx + 1]
        } else {
            a
        };
        out.push(a + (b - a) * frac);
    }

    out
}
