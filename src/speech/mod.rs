pub mod capture;
pub mod stt;

pub use capture::{ListenConfig, ListenHandle, SpeechEvent, UtteranceCollector};
pub use stt::{WhisperConfig, WhisperEngine, WHISPER_SAMPLE_RATE};
