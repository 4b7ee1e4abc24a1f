use crate::audio::devices;
use crate::{ParleyError, Result};
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Microphone capture stream delivering mono sample chunks over a channel.
pub struct AudioInput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    is_capturing: Arc<Mutex<bool>>,
}

impl AudioInput {
    /// Create an audio input for the device at `index` in enumeration order.
    pub fn from_device_index(index: usize) -> Result<Self> {
        let device = devices::input_device_by_index(index)?;

        info!(
            "Using input device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config = device
            .default_input_config()
            .map_err(|e| {
                ParleyError::AudioDeviceError(format!("Failed to get input config: {e}"))
            })?
            .into();

        Ok(Self {
            device,
            config,
            stream: None,
            is_capturing: Arc::new(Mutex::new(false)),
        })
    }

    /// Sample rate the device captures at
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Start capturing and send mono sample chunks to `audio_tx`.
    pub fn start(&mut self, audio_tx: Sender<Vec<f32>>) -> Result<()> {
        if *self.is_capturing.lock() {
            warn!("Already capturing");
            return Ok(());
        }

        let channels = self.config.channels as usize;
        let is_capturing = Arc::clone(&self.is_capturing);

        let err_fn = |err| {
            error!("Audio input stream error: {err}");
        };

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if !*is_capturing.lock() {
                        return;
                    }

                    // Average all channels down to mono
                    let samples = if channels == 1 {
                        data.to_vec()
                    } else {
                        data.chunks(channels)
                            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                            .collect()
                    };

                    if let Err(e) = audio_tx.try_send(samples) {
                        debug!("Failed to send audio chunk: {e}");
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| {
                ParleyError::AudioDeviceError(format!("Failed to build input stream: {e}"))
            })?;

        stream.play().map_err(|e| {
            ParleyError::AudioDeviceError(format!("Failed to start input stream: {e}"))
        })?;

        *self.is_capturing.lock() = true;
        self.stream = Some(stream);

        info!("Started audio capture");
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        *self.is_capturing.lock() = false;

        if let Some(stream) = self.stream.take() {
            drop(stream);
            info!("Stopped audio capture");
        }

        Ok(())
    }

    pub fn is_capturing(&self) -> bool {
        *self.is_capturing.lock()
    }
}

impl Drop for AudioInput {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
