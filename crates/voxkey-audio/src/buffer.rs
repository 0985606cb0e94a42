//! WAV-framed recording buffer in the fixed target format.

use std::io::Cursor;

use voxkey_core::{Result, VoxkeyError, TARGET_CHANNELS, TARGET_SAMPLE_RATE};

/// A complete captured recording, already resampled to the target format
/// (mono, 16 kHz, 16-bit) and framed as a WAV container.
///
/// Ownership moves from capture to the coordinator to the transcriber;
/// the buffer is never aliased by two owners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingBuffer {
    data: Vec<u8>,
}

impl RecordingBuffer {
    /// A recording with zero captured bytes. Callers treat this as
    /// "no speech attempted", not as an error.
    pub fn empty() -> Self {
        Self { data: Vec::new() }
    }

    /// Frame f32 PCM samples (already mono/16 kHz) as a 16-bit WAV buffer.
    /// An empty slice yields an empty buffer with no container header.
    pub fn from_samples(samples: &[f32]) -> Self {
        if samples.is_empty() {
            return Self::empty();
        }

        let spec = hound::WavSpec {
            channels: TARGET_CHANNELS,
            sample_rate: TARGET_SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut data = Vec::with_capacity(44 + samples.len() * 2);
        {
            let mut writer = hound::WavWriter::new(Cursor::new(&mut data), spec)
                .expect("in-memory WAV writer cannot fail");
            for &sample in samples {
                let clamped = sample.clamp(-1.0, 1.0);
                writer
                    .write_sample((clamped * i16::MAX as f32) as i16)
                    .expect("in-memory WAV write cannot fail");
            }
            writer.finalize().expect("in-memory WAV finalize cannot fail");
        }

        Self { data }
    }

    /// Raw WAV bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Byte length of the buffer including the container header.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Decode back to f32 PCM samples for inference.
    pub fn samples(&self) -> Result<Vec<f32>> {
        if self.data.is_empty() {
            return Ok(Vec::new());
        }

        let reader = hound::WavReader::new(Cursor::new(&self.data))
            .map_err(|e| VoxkeyError::Audio(format!("Invalid recording container: {}", e)))?;

        reader
            .into_samples::<i16>()
            .map(|s| {
                s.map(|v| v as f32 / i16::MAX as f32)
                    .map_err(|e| VoxkeyError::Audio(format!("Corrupt recording data: {}", e)))
            })
            .collect()
    }

    /// Duration of the recording in seconds.
    pub fn duration_secs(&self) -> f32 {
        if self.data.len() <= 44 {
            return 0.0;
        }
        // 2 bytes per sample after the 44-byte WAV header.
        (self.data.len() - 44) as f32 / 2.0 / TARGET_SAMPLE_RATE as f32
    }
}

impl Default for RecordingBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer() {
        let buffer = RecordingBuffer::empty();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.samples().unwrap().len(), 0);
        assert_eq!(buffer.duration_secs(), 0.0);
    }

    #[test]
    fn test_from_empty_samples_is_empty() {
        let buffer = RecordingBuffer::from_samples(&[]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_samples_round_trip() {
        let original = vec![0.0f32, 0.25, -0.25, 0.5, -0.5, 1.0, -1.0];
        let buffer = RecordingBuffer::from_samples(&original);
        assert!(!buffer.is_empty());

        let decoded = buffer.samples().unwrap();
        assert_eq!(decoded.len(), original.len());
        for (a, b) in original.iter().zip(decoded.iter()) {
            // 16-bit quantization loses at most one step.
            assert!((a - b).abs() < 1.0 / i16::MAX as f32 * 2.0);
        }
    }

    #[test]
    fn test_out_of_range_samples_are_clamped() {
        let buffer = RecordingBuffer::from_samples(&[2.0, -2.0]);
        let decoded = buffer.samples().unwrap();
        assert!(decoded[0] <= 1.0);
        assert!(decoded[1] >= -1.0);
    }

    #[test]
    fn test_duration() {
        // One second of audio at 16 kHz.
        let samples = vec![0.1f32; 16_000];
        let buffer = RecordingBuffer::from_samples(&samples);
        assert!((buffer.duration_secs() - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_container_is_wav() {
        let buffer = RecordingBuffer::from_samples(&[0.1, 0.2]);
        assert_eq!(&buffer.as_bytes()[..4], b"RIFF");
        assert_eq!(&buffer.as_bytes()[8..12], b"WAVE");
    }
}
