use crate::{ParleyError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

/// Converts captured audio from the device rate to the recognizer rate.
pub struct AudioResampler {
    resampler: SincFixedIn<f32>,
    input_rate: u32,
    output_rate: u32,
}

impl AudioResampler {
    /// Create a mono resampler from `input_rate` to `output_rate`.
    pub fn new(input_rate: u32, output_rate: u32) -> Result<Self> {
        if input_rate == 0 || output_rate == 0 {
            return Err(ParleyError::ConfigError(
                "Sample rates must be greater than 0".into(),
            ));
        }

        let resample_ratio = output_rate as f64 / input_rate as f64;

        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        // chunk_size is the number of frames consumed per process() call
        let chunk_size = 1024;

        let resampler = SincFixedIn::<f32>::new(resample_ratio, 2.0, params, chunk_size, 1)
            .map_err(|e| {
                ParleyError::AudioProcessingError(format!("Failed to create resampler: {e}"))
            })?;

        debug!("Created resampler: {input_rate} Hz -> {output_rate} Hz");

        Ok(Self {
            resampler,
            input_rate,
            output_rate,
        })
    }

    /// Resample a chunk of mono audio.
    pub fn resample(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let chunk_size = self.resampler.input_frames_max();
        let total_frames = input.len();

        let ratio = self.output_rate as f64 / self.input_rate as f64;
        let mut output = Vec::with_capacity((total_frames as f64 * ratio * 1.1) as usize);

        let mut frame_offset = 0;
        while frame_offset < total_frames {
            let frames_remaining = total_frames - frame_offset;
            let frames_to_read = frames_remaining.min(chunk_size);

            // SincFixedIn requires exactly chunk_size frames per call; the
            // tail of the final chunk is zero-padded
            let mut input_planar = vec![vec![0.0f32; chunk_size]];
            input_planar[0][..frames_to_read]
                .copy_from_slice(&input[frame_offset..frame_offset + frames_to_read]);

            let output_planar = self.resampler.process(&input_planar, None).map_err(|e| {
                ParleyError::AudioProcessingError(format!("Resampling failed: {e}"))
            })?;

            let output_frames = output_planar[0].len();
            let frames_to_take = if frames_remaining < chunk_size {
                // Last chunk: only keep the portion backed by actual input
                ((frames_to_read as f64) * ratio).ceil() as usize
            } else {
                output_frames
            };

            output.extend_from_slice(&output_planar[0][..frames_to_take.min(output_frames)]);

            frame_offset += frames_to_read;
        }

        debug!("Resampled {} frames -> {} frames", total_frames, output.len());

        Ok(output)
    }

    pub fn input_rate(&self) -> u32 {
        self.input_rate
    }

    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    pub fn reset(&mut self) {
        self.resampler.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resampler_creation() {
        assert!(AudioResampler::new(48000, 16000).is_ok());
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(AudioResampler::new(0, 16000).is_err());
        assert!(AudioResampler::new(48000, 0).is_err());
    }

    #[test]
    fn test_downsampling_shrinks() {
        let mut resampler = AudioResampler::new(48000, 16000).unwrap();
        let input: Vec<f32> = (0..3072).map(|i| (i as f32 * 0.01).sin()).collect();
        let output = resampler.resample(&input).unwrap();
        assert!(!output.is_empty());
        assert!(output.len() < input.len());
    }

    #[test]
    fn test_upsampling_grows() {
        let mut resampler = AudioResampler::new(16000, 48000).unwrap();
        let input: Vec<f32> = (0..1024).map(|i| (i as f32 * 0.01).sin()).collect();
        let output = resampler.resample(&input).unwrap();
        assert!(output.len() > input.len() * 2);
    }

    #[test]
    fn test_empty_input() {
        let mut resampler = AudioResampler::new(48000, 16000).unwrap();
        assert!(resampler.resample(&[]).unwrap().is_empty());
    }
}
