#[cfg(feature = "audio-io")]
pub mod devices;
#[cfg(feature = "audio-io")]
pub mod input;
pub mod resampler;
pub mod vad;

#[cfg(feature = "audio-io")]
pub use input::AudioInput;
pub use resampler::AudioResampler;
pub use vad::VoiceActivityDetector;

/// Names of the available input devices, in selection-index order.
///
/// Returns an empty list when the crate is built without audio support.
#[cfg(feature = "audio-io")]
pub fn input_device_names() -> Vec<String> {
    devices::input_device_names()
}

#[cfg(not(feature = "audio-io"))]
pub fn input_device_names() -> Vec<String> {
    Vec::new()
}
