//! Sample format conversion to the fixed target format.

use voxkey_core::TARGET_SAMPLE_RATE;

/// Average interleaved channels down to mono. A mono input is copied
/// through unchanged.
pub fn downmix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let channels = channels as usize;
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Linear-interpolation resample from `source_rate` to the target 16 kHz.
///
/// Output sample `i` maps back to source position `i * ratio`; the value is
/// interpolated between the two neighboring source samples. Equal rates
/// copy through unchanged.
pub fn resample_to_target(samples: &[f32], source_rate: u32) -> Vec<f32> {
    if source_rate == TARGET_SAMPLE_RATE || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = source_rate as f64 / TARGET_SAMPLE_RATE as f64;
    let output_len = (samples.len() as f64 / ratio) as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 * ratio;
        let src_idx = src_pos as usize;
        let frac = (src_pos - src_idx as f64) as f32;

        let a = samples[src_idx];
        let b = if src_idx + 1 < samples.len() {
            samples[src_idx + 1]
        } else {
            a
        };
        output.push(a + (b - a) * frac);
    }

    output
}

/// Full conversion of a raw interleaved chunk to mono 16 kHz.
pub fn convert_chunk(samples: &[f32], channels: u16, source_rate: u32) -> Vec<f32> {
    let mono = downmix_to_mono(samples, channels);
    resample_to_target(&mono, source_rate)
}
