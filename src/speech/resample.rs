//! Mono resampling to the recognizer's 16 kHz input rate

use crate::{RecitalError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

const CHUNK_FRAMES: usize = 1024;

/// Streaming mono resampler with a fixed 16 kHz output rate
///
/// Input arrives in arbitrary chunk sizes; frames are buffered internally
/// and processed in fixed blocks, so callers just push and collect.
pub struct Mono16kResampler {
    inner: Option<SincFixedIn<f32>>,
    pending: Vec<f32>,
}

impl Mono16kResampler {
    /// Create a resampler from `input_rate` to 16 kHz
    ///
    /// An input already at 16 kHz passes through untouched.
    pub fn new(input_rate: u32) -> Result<Self> {
        if input_rate == 0 {
            return Err(RecitalError::Speech("Input sample rate must be > 0".into()));
        }
        if input_rate == 16_000 {
            return Ok(Self {
                inner: None,
                pending: Vec::new(),
            });
        }

        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };
        let inner = SincFixedIn::<f32>::new(
            16_000.0 / input_rate as f64,
            2.0,
            params,
            CHUNK_FRAMES,
            1,
        )
        .map_err(|e| RecitalError::Speech(format!("Failed to create resampler: {}", e)))?;

        Ok(Self {
            inner: Some(inner),
            pending: Vec::new(),
        })
    }

    /// Feed input samples, returning whatever output is ready
    pub fn push(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        let Some(resampler) = self.inner.as_mut() else {
            return Ok(input.to_vec());
        };

        self.pending.extend_from_slice(input);

        let mut output = Vec::new();
        while self.pending.len() >= CHUNK_FRAMES {
            let block: Vec<f32> = self.pending.drain(0..CHUNK_FRAMES).collect();
            let processed = resampler
                .process(&[block], None)
                .map_err(|e| RecitalError::Speech(format!("Resampling failed: {}", e)))?;
            output.extend_from_slice(&processed[0]);
        }
        Ok(output)
    }

    /// Flush buffered input shorter than one block, padding with silence
    pub fn flush(&mut self) -> Result<Vec<f32>> {
        let Some(resampler) = self.inner.as_mut() else {
            return Ok(Vec::new());
        };
        if self.pending.is_empty() {
            return Ok(Vec::new());
        }

        let mut block: Vec<f32> = self.pending.drain(..).collect();
        block.resize(CHUNK_FRAMES, 0.0);
        let processed = resampler
            .process(&[block], None)
            .map_err(|e| RecitalError::Speech(format!("Resampling failed: {}", e)))?;
        Ok(processed[0].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_at_target_rate() {
        let mut resampler = Mono16kResampler::new(16_000).unwrap();
        let input = vec![0.5f32; 480];
        assert_eq!(resampler.push(&input).unwrap(), input);
        assert!(resampler.flush().unwrap().is_empty());
    }

    #[test]
    fn test_downsampling_halves_sample_count() {
        let mut resampler = Mono16kResampler::new(32_000).unwrap();
        let input = vec![0.0f32; CHUNK_FRAMES * 4];
        let output = resampler.push(&input).unwrap();

        let expected = input.len() / 2;
        let tolerance = expected / 10;
        assert!(
            (output.len() as i64 - expected as i64).unsigned_abs() as usize <= tolerance,
            "expected about {} samples, got {}",
            expected,
            output.len()
        );
    }

    #[test]
    fn test_zero_rate_is_rejected() {
        assert!(Mono16kResampler::new(0).is_err());
    }

    #[test]
    fn test_short_tail_flushes() {
        let mut resampler = Mono16kResampler::new(48_000).unwrap();
        resampler.push(&vec![0.1f32; 100]).unwrap();
        let tail = resampler.flush().unwrap();
        assert!(!tail.is_empty());
    }
}
