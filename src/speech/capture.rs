//! Single-utterance speech capture
//!
//! Each press of the speech button spawns one short-lived worker: open the
//! selected microphone, accumulate audio while the voice-activity detector
//! reports speech, close the utterance at a silence boundary, transcribe,
//! emit the transcript, exit. Starting a new capture terminates any prior
//! worker before the new one starts.

use crate::speech::stt::WhisperConfig;
use crate::Result;
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, warn};

#[cfg(feature = "audio-io")]
use crate::audio::{AudioInput, AudioResampler, VoiceActivityDetector};
#[cfg(feature = "audio-io")]
use crate::speech::stt::{WhisperEngine, WHISPER_SAMPLE_RATE};
#[cfg(feature = "audio-io")]
use crate::ParleyError;
#[cfg(feature = "audio-io")]
use crossbeam_channel::RecvTimeoutError;
#[cfg(feature = "audio-io")]
use std::time::{Duration, Instant};

/// Configuration for one capture session
#[derive(Clone, Debug)]
pub struct ListenConfig {
    /// Index into the enumerated input devices
    pub device_index: usize,

    /// Speech probability above which a chunk counts as speech
    pub vad_threshold: f32,

    /// Seconds of silence that end the utterance
    pub silence_threshold: f32,

    /// Utterances shorter than this are discarded as noise
    pub min_utterance_secs: f32,

    /// Utterances are cut off at this length
    pub max_utterance_secs: f32,

    /// Give up when no utterance completes within this window
    pub max_listen_secs: f32,

    /// Recognizer configuration
    pub whisper: WhisperConfig,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            vad_threshold: 0.5,
            silence_threshold: 0.8,
            min_utterance_secs: 0.3,
            max_utterance_secs: 30.0,
            max_listen_secs: 15.0,
            whisper: WhisperConfig::default(),
        }
    }
}

/// Events emitted by a capture worker
#[derive(Debug, Clone)]
pub enum SpeechEvent {
    /// The transcribed utterance
    Transcript(String),

    /// Recognition failed; the user receives no text
    Error(String),

    /// The worker has exited
    Finished,
}

/// Handle to a running capture worker.
///
/// Terminating sets the cancel flag and joins the worker, so the thread is
/// gone before a successor starts.
pub struct ListenHandle {
    cancel: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ListenHandle {
    /// Spawn a worker under this handle's cancel flag.
    pub(crate) fn spawn<F>(name: &str, f: F) -> Result<Self>
    where
        F: FnOnce(Arc<AtomicBool>) + Send + 'static,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = Arc::clone(&cancel);

        let thread = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || f(worker_cancel))
            .map_err(|e| crate::ParleyError::ChannelError(format!("Failed to spawn worker: {e}")))?;

        Ok(Self {
            cancel,
            thread: Some(thread),
        })
    }

    /// Signal cancellation and wait for the worker to exit.
    pub fn terminate(mut self) {
        self.cancel.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    /// Wait for the worker to exit without cancelling it.
    pub fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.thread
            .as_ref()
            .map(|t| t.is_finished())
            .unwrap_or(true)
    }
}

impl Drop for ListenHandle {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Accumulates audio into one utterance, closed at a silence boundary.
///
/// Chunks are pushed together with the detector's verdict for that chunk;
/// the collector returns the finished utterance once a boundary is found.
pub struct UtteranceCollector {
    sample_rate: u32,
    silence_threshold: f32,
    min_secs: f32,
    max_secs: f32,
    buffer: Vec<f32>,
    in_speech: bool,
    silence_secs: f32,
}

impl UtteranceCollector {
    pub fn new(sample_rate: u32, config: &ListenConfig) -> Self {
        Self {
            sample_rate,
            silence_threshold: config.silence_threshold,
            min_secs: config.min_utterance_secs,
            max_secs: config.max_utterance_secs,
            buffer: Vec::new(),
            in_speech: false,
            silence_secs: 0.0,
        }
    }

    /// Feed one chunk and its speech verdict.
    ///
    /// Returns the completed utterance once the boundary is reached.
    pub fn push(&mut self, chunk: &[f32], is_speech: bool) -> Option<Vec<f32>> {
        let chunk_secs = chunk.len() as f32 / self.sample_rate as f32;

        if is_speech {
            if !self.in_speech {
                self.in_speech = true;
                self.buffer.clear();
                debug!("Speech started");
            }

            self.buffer.extend_from_slice(chunk);
            self.silence_secs = 0.0;

            if self.buffered_secs() >= self.max_secs {
                debug!("Maximum utterance length reached");
                return Some(self.take());
            }
        } else if self.in_speech {
            // Trailing silence stays in the utterance up to the boundary
            self.buffer.extend_from_slice(chunk);
            self.silence_secs += chunk_secs;

            if self.silence_secs >= self.silence_threshold {
                // Minimum length counts speech only, not the trailing silence
                let speech_secs = self.buffered_secs() - self.silence_secs;

                if speech_secs >= self.min_secs {
                    debug!("Utterance boundary reached");
                    return Some(self.take());
                }

                debug!("Utterance too short ({speech_secs:.2}s of speech), discarding");
                self.reset();
            }
        }

        None
    }

    pub fn buffered_secs(&self) -> f32 {
        self.buffer.len() as f32 / self.sample_rate as f32
    }

    pub fn in_speech(&self) -> bool {
        self.in_speech
    }

    fn take(&mut self) -> Vec<f32> {
        let utterance = std::mem::take(&mut self.buffer);
        self.reset();
        utterance
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.in_speech = false;
        self.silence_secs = 0.0;
    }
}

/// Spawn a capture worker for one utterance.
///
/// Events arrive on `event_tx`; the worker always ends with
/// [`SpeechEvent::Finished`].
#[cfg(feature = "audio-io")]
pub fn listen(config: ListenConfig, event_tx: Sender<SpeechEvent>) -> Result<ListenHandle> {
    ListenHandle::spawn("speech-capture", move |cancel| {
        if let Err(e) = run_listen(&config, &event_tx, &cancel) {
            warn!("speech capture failed: {e}");
            let _ = event_tx.send(SpeechEvent::Error(e.to_string()));
        }
        let _ = event_tx.send(SpeechEvent::Finished);
    })
}

#[cfg(feature = "audio-io")]
fn run_listen(
    config: &ListenConfig,
    event_tx: &Sender<SpeechEvent>,
    cancel: &AtomicBool,
) -> Result<()> {
    let (audio_tx, audio_rx) = crossbeam_channel::bounded::<Vec<f32>>(32);

    let mut input = AudioInput::from_device_index(config.device_index)?;
    let device_rate = input.sample_rate();
    input.start(audio_tx)?;

    let mut resampler = if device_rate != WHISPER_SAMPLE_RATE {
        Some(AudioResampler::new(device_rate, WHISPER_SAMPLE_RATE)?)
    } else {
        None
    };

    let mut vad = VoiceActivityDetector::new(WHISPER_SAMPLE_RATE, config.vad_threshold)?;
    let vad_chunk = vad.chunk_size();

    let mut collector = UtteranceCollector::new(WHISPER_SAMPLE_RATE, config);
    let mut pending: Vec<f32> = Vec::new();

    let started = Instant::now();

    let utterance = loop {
        if cancel.load(Ordering::SeqCst) {
            debug!("capture cancelled");
            return Ok(());
        }

        if started.elapsed().as_secs_f32() > config.max_listen_secs {
            debug!("listen window elapsed without an utterance");
            return Ok(());
        }

        match audio_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(chunk) => {
                let chunk = match resampler.as_mut() {
                    Some(resampler) => resampler.resample(&chunk)?,
                    None => chunk,
                };
                pending.extend(chunk);

                let mut finished = None;
                while pending.len() >= vad_chunk {
                    let frame: Vec<f32> = pending.drain(..vad_chunk).collect();
                    let is_speech = vad.is_speech(&frame)?;

                    if let Some(utterance) = collector.push(&frame, is_speech) {
                        finished = Some(utterance);
                        break;
                    }
                }

                if let Some(utterance) = finished {
                    break utterance;
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                return Err(ParleyError::AudioDeviceError(
                    "input stream closed unexpectedly".into(),
                ));
            }
        }
    };

    input.stop()?;
    drop(input);

    // The recognizer loads per capture; the worker is single-shot
    let engine = WhisperEngine::new(config.whisper.clone())?;
    let text = engine.transcribe(&utterance)?;

    if cancel.load(Ordering::SeqCst) {
        debug!("capture cancelled after transcription");
        return Ok(());
    }

    if text.is_empty() {
        warn!("recognizer could not make out any words");
    } else {
        let _ = event_tx.send(SpeechEvent::Transcript(text));
    }

    Ok(())
}

#[cfg(not(feature = "audio-io"))]
pub fn listen(_config: ListenConfig, _event_tx: Sender<SpeechEvent>) -> Result<ListenHandle> {
    warn!("speech capture requires the audio-io feature");
    Err(crate::ParleyError::ConfigError(
        "built without audio support".into(),
    ))
}
