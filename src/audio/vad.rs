use crate::{ParleyError, Result};
use tracing::info;
use voice_activity_detector::VoiceActivityDetector as VadDetector;

/// Voice Activity Detection using Silero VAD
pub struct VoiceActivityDetector {
    detector: VadDetector,
    sample_rate: u32,
    threshold: f32,
}

impl VoiceActivityDetector {
    /// Create a new VAD instance.
    ///
    /// `sample_rate` must be 8000 or 16000; `threshold` is the speech
    /// probability above which a chunk counts as speech.
    pub fn new(sample_rate: u32, threshold: f32) -> Result<Self> {
        if ![8000, 16000].contains(&sample_rate) {
            return Err(ParleyError::ConfigError(format!(
                "Invalid sample rate: {sample_rate}. Must be 8000 or 16000"
            )));
        }

        let chunk_size = chunk_size_for(sample_rate);

        let detector = VadDetector::builder()
            .sample_rate(sample_rate as i32)
            .chunk_size(chunk_size)
            .build()
            .map_err(|e| {
                ParleyError::AudioProcessingError(format!("Failed to create VAD: {e:?}"))
            })?;

        info!("Initialized VAD with sample rate: {sample_rate}, threshold: {threshold}");

        Ok(Self {
            detector,
            sample_rate,
            threshold,
        })
    }

    /// Detect whether the audio chunk contains speech.
    pub fn is_speech(&mut self, audio: &[f32]) -> Result<bool> {
        let probability = self.detector.predict(audio.iter().copied());
        Ok(probability >= self.threshold)
    }

    /// Speech probability for the audio chunk (0.0 to 1.0).
    pub fn get_probability(&mut self, audio: &[f32]) -> Result<f32> {
        Ok(self.detector.predict(audio.iter().copied()))
    }

    pub fn reset(&mut self) {
        self.detector.reset();
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Chunk size the detector expects (32 ms of audio).
    pub fn chunk_size(&self) -> usize {
        chunk_size_for(self.sample_rate)
    }
}

fn chunk_size_for(sample_rate: u32) -> usize {
    match sample_rate {
        8000 => 256,
        _ => 512,
    }
}
