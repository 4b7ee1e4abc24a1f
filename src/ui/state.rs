//! Application state
//!
//! Central state for the chat window: the conversation log, the text input,
//! the settings record, and the channels to the background workers. Events
//! from the workers are polled once per frame.

use crate::chat::{ChatCommand, ChatEvent};
use crate::config::ChatSettings;
use crate::messages::{write_transcript, Message, MessageStorage, Sender};
use crate::speech::{self, ListenConfig, ListenHandle, SpeechEvent};
use crate::ui::components::settings_panel::SettingsDraft;
use crossbeam_channel::{Receiver, Sender as ChannelSender};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Draft state for a learning-mode verdict on one bot reply
#[derive(Debug, Clone, Default)]
pub struct CorrectionDraft {
    /// Whether the correction field is shown (the user answered "No")
    pub editing: bool,
    /// The correction being typed
    pub text: String,
}

/// Central application state
pub struct AppState {
    /// Conversation log in display order
    pub messages: MessageStorage,

    /// Current text input
    pub input_text: String,

    /// Applied settings
    pub settings: ChatSettings,

    /// Whether a speech capture is running
    pub listening: bool,

    /// Bot replies awaiting a learning-mode verdict, by message id
    pub reviews: HashMap<Uuid, CorrectionDraft>,

    /// Settings panel draft; `Some` while the panel is open
    pub settings_draft: Option<SettingsDraft>,

    /// Last user-visible error
    pub last_error: Option<String>,

    /// Channel to the response worker
    pub chat_command_tx: Option<ChannelSender<ChatCommand>>,

    /// Events from the response worker
    pub chat_event_rx: Option<Receiver<ChatEvent>>,

    /// Id of the in-flight response request; replies for any other id are
    /// stale and dropped
    pub active_request: Option<Uuid>,

    /// Events from the current capture worker
    pub speech_event_rx: Option<Receiver<SpeechEvent>>,

    /// Handle to the current capture worker
    pub listen_handle: Option<ListenHandle>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            messages: MessageStorage::new(),
            input_text: String::new(),
            settings: ChatSettings::default(),
            listening: false,
            reviews: HashMap::new(),
            settings_draft: None,
            last_error: None,
            chat_command_tx: None,
            chat_event_rx: None,
            active_request: None,
            speech_event_rx: None,
            listen_handle: None,
        }
    }

    /// Wire the state to a running response worker.
    pub fn attach_chat(
        &mut self,
        command_tx: ChannelSender<ChatCommand>,
        event_rx: Receiver<ChatEvent>,
    ) {
        self.chat_command_tx = Some(command_tx);
        self.chat_event_rx = Some(event_rx);
    }

    /// Send the current input as a message.
    ///
    /// Empty input produces no bubble and no engine request; non-empty input
    /// produces exactly one of each.
    pub fn send_message(&mut self) {
        let text = self.input_text.trim().to_string();
        if text.is_empty() {
            return;
        }

        self.messages.add(Message::new(Sender::User, text.clone()));
        self.input_text.clear();

        self.request_response(text);
    }

    fn request_response(&mut self, statement: String) {
        let Some(tx) = &self.chat_command_tx else {
            warn!("response engine unavailable; message not delivered");
            return;
        };

        let request_id = Uuid::new_v4();
        if let Some(previous) = self.active_request.replace(request_id) {
            debug!(request_id = %previous, "superseding in-flight response request");
        }

        if tx
            .send(ChatCommand::Respond {
                statement,
                request_id,
            })
            .is_err()
        {
            warn!("response worker is gone");
            self.chat_command_tx = None;
            self.active_request = None;
        }
    }

    /// Feed a corrected reply to the engine in train mode.
    ///
    /// No bubble is appended for the correction itself.
    pub fn submit_correction(&mut self, statement: String) {
        let statement = statement.trim().to_string();
        if statement.is_empty() {
            return;
        }

        let Some(tx) = &self.chat_command_tx else {
            warn!("response engine unavailable; correction not delivered");
            return;
        };

        if tx.send(ChatCommand::Learn { statement }).is_err() {
            warn!("response worker is gone");
            self.chat_command_tx = None;
        }
    }

    /// Append a bot reply to the conversation.
    fn receive_reply(&mut self, text: String) {
        let message = Message::new(Sender::Bot, text);

        if self.settings.learning_mode {
            self.reviews.insert(message.id, CorrectionDraft::default());
        }

        self.messages.add(message);
    }

    /// Clear the conversation and the engine context.
    pub fn clear_chat(&mut self) {
        self.messages.clear();
        self.reviews.clear();

        if let Some(tx) = &self.chat_command_tx {
            let _ = tx.send(ChatCommand::ClearContext);
        }
    }

    /// Open the settings panel with a draft of the current settings.
    pub fn open_settings(&mut self) {
        self.settings_draft = Some(SettingsDraft::from_settings(&self.settings));
    }

    /// Apply an accepted settings record.
    ///
    /// The transcript write and the chat clear are one-shot actions; the
    /// remaining fields persist.
    pub fn apply_settings(&mut self, accepted: ChatSettings) {
        if accepted.create_transcript {
            match write_transcript(Path::new(&accepted.transcript_dir), &self.messages.get_all()) {
                Ok(path) => info!(path = %path.display(), "transcript created"),
                Err(e) => {
                    warn!("transcript export failed: {e}");
                    self.last_error = Some(e.user_message());
                }
            }
        }

        if accepted.clear_chat {
            self.clear_chat();
        }

        if accepted.microphone_index != self.settings.microphone_index {
            info!(index = accepted.microphone_index, "microphone changed");
            self.settings.microphone_index = accepted.microphone_index;
        }

        self.settings.transcript_dir = accepted.transcript_dir;
        self.settings.learning_mode = accepted.learning_mode;
    }

    /// Start a speech capture, terminating any capture already running.
    pub fn start_listening(&mut self) {
        if let Some(previous) = self.listen_handle.take() {
            debug!("terminating prior speech capture");
            previous.terminate();
        }

        let config = ListenConfig {
            device_index: self.settings.microphone_index,
            ..Default::default()
        };

        let (event_tx, event_rx) = crossbeam_channel::bounded(8);

        match speech::capture::listen(config, event_tx) {
            Ok(handle) => {
                self.listen_handle = Some(handle);
                self.speech_event_rx = Some(event_rx);
                self.listening = true;
                info!("speech capture started");
            }
            Err(e) => {
                warn!("failed to start speech capture: {e}");
                self.last_error = Some(e.user_message());
                self.listening = false;
            }
        }
    }

    /// Process incoming events from the background workers.
    pub fn poll_events(&mut self) {
        let chat_events: Vec<ChatEvent> = self
            .chat_event_rx
            .as_ref()
            .map(|rx| rx.try_iter().collect())
            .unwrap_or_default();

        for event in chat_events {
            match event {
                ChatEvent::Reply { text, request_id } => {
                    if self.active_request == Some(request_id) {
                        self.active_request = None;
                        self.receive_reply(text);
                    } else {
                        debug!(%request_id, "dropping reply for superseded request");
                    }
                }
                ChatEvent::Error {
                    message,
                    request_id,
                } => {
                    warn!("response worker error: {message}");
                    if request_id.is_none() || request_id == self.active_request {
                        self.active_request = None;
                    }
                    self.last_error = Some(message);
                }
                ChatEvent::Shutdown => {
                    info!("response worker shut down");
                    self.chat_command_tx = None;
                    self.active_request = None;
                }
            }
        }

        let speech_events: Vec<SpeechEvent> = self
            .speech_event_rx
            .as_ref()
            .map(|rx| rx.try_iter().collect())
            .unwrap_or_default();

        for event in speech_events {
            match event {
                SpeechEvent::Transcript(text) => {
                    debug!("transcript received: '{text}'");
                    if !self.input_text.is_empty() {
                        self.input_text.push(' ');
                    }
                    self.input_text.push_str(&text);
                }
                SpeechEvent::Error(message) => {
                    warn!("speech capture error: {message}");
                    self.last_error = Some(message);
                }
                SpeechEvent::Finished => {
                    self.listening = false;
                    self.speech_event_rx = None;
                    if let Some(handle) = self.listen_handle.take() {
                        handle.join();
                    }
                }
            }
        }
    }

    /// Whether a response request is in flight.
    pub fn awaiting_reply(&self) -> bool {
        self.active_request.is_some()
    }

    /// Tear down the background workers on window close.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.listen_handle.take() {
            handle.terminate();
        }

        if let Some(tx) = self.chat_command_tx.take() {
            let _ = tx.send(ChatCommand::Shutdown);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    fn state_with_chat() -> (AppState, Receiver<ChatCommand>, ChannelSender<ChatEvent>) {
        let (command_tx, command_rx) = bounded(100);
        let (event_tx, event_rx) = bounded(100);

        let mut state = AppState::new();
        state.attach_chat(command_tx, event_rx);

        (state, command_rx, event_tx)
    }

    #[test]
    fn test_empty_input_sends_nothing() {
        let (mut state, command_rx, _event_tx) = state_with_chat();

        state.input_text = String::new();
        state.send_message();

        state.input_text = "   ".to_string();
        state.send_message();

        assert!(state.messages.is_empty());
        assert!(command_rx.try_recv().is_err());
        assert!(state.active_request.is_none());
    }

    #[test]
    fn test_send_produces_one_bubble_and_one_request() {
        let (mut state, command_rx, _event_tx) = state_with_chat();

        state.input_text = "Hello bot".to_string();
        state.send_message();

        let all = state.messages.get_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].sender, Sender::User);
        assert_eq!(all[0].text, "Hello bot");
        assert!(state.input_text.is_empty());

        match command_rx.try_recv() {
            Ok(ChatCommand::Respond { statement, .. }) => assert_eq!(statement, "Hello bot"),
            other => panic!("expected a Respond command, got {other:?}"),
        }
        assert!(command_rx.try_recv().is_err(), "exactly one request expected");
    }

    #[test]
    fn test_reply_appends_bot_bubble() {
        let (mut state, _command_rx, event_tx) = state_with_chat();

        state.input_text = "hi".to_string();
        state.send_message();
        let request_id = state.active_request.unwrap();

        event_tx
            .send(ChatEvent::Reply {
                text: "hello!".to_string(),
                request_id,
            })
            .unwrap();
        state.poll_events();

        let all = state.messages.get_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].sender, Sender::Bot);
        assert_eq!(all[1].text, "hello!");
        assert!(!state.awaiting_reply());
    }

    #[test]
    fn test_stale_reply_is_dropped() {
        let (mut state, _command_rx, event_tx) = state_with_chat();

        state.input_text = "first".to_string();
        state.send_message();

        state.input_text = "second".to_string();
        state.send_message();
        let current = state.active_request.unwrap();

        // A reply for a superseded request never becomes a bubble
        event_tx
            .send(ChatEvent::Reply {
                text: "stale".to_string(),
                request_id: Uuid::new_v4(),
            })
            .unwrap();
        state.poll_events();

        let all = state.messages.get_all();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|m| m.sender == Sender::User));
        assert_eq!(state.active_request, Some(current));
    }

    #[test]
    fn test_learning_mode_marks_replies_for_review() {
        let (mut state, _command_rx, event_tx) = state_with_chat();
        state.settings.learning_mode = true;

        state.input_text = "hi".to_string();
        state.send_message();
        let request_id = state.active_request.unwrap();

        event_tx
            .send(ChatEvent::Reply {
                text: "hello!".to_string(),
                request_id,
            })
            .unwrap();
        state.poll_events();

        let bot = &state.messages.get_all()[1];
        assert!(state.reviews.contains_key(&bot.id));
    }

    #[test]
    fn test_correction_sends_learn_without_bubble() {
        let (mut state, command_rx, _event_tx) = state_with_chat();

        state.submit_correction("The right answer.".to_string());

        assert!(state.messages.is_empty());
        match command_rx.try_recv() {
            Ok(ChatCommand::Learn { statement }) => {
                assert_eq!(statement, "The right answer.")
            }
            other => panic!("expected a Learn command, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_correction_is_ignored() {
        let (mut state, command_rx, _event_tx) = state_with_chat();

        state.submit_correction("  ".to_string());
        assert!(command_rx.try_recv().is_err());
    }

    #[test]
    fn test_clear_chat_clears_engine_context() {
        let (mut state, command_rx, _event_tx) = state_with_chat();

        state.messages.add(Message::new(Sender::User, "hi"));
        state.clear_chat();

        assert!(state.messages.is_empty());
        assert!(matches!(
            command_rx.try_recv(),
            Ok(ChatCommand::ClearContext)
        ));
    }

    #[test]
    fn test_apply_settings_writes_transcript_and_clears() {
        let (mut state, _command_rx, _event_tx) = state_with_chat();

        state.messages.add(Message::new(Sender::User, "hi"));
        state.messages.add(Message::new(Sender::Bot, "hello"));

        let dir = std::env::temp_dir().join(format!("parley-settings-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        state.apply_settings(ChatSettings {
            microphone_index: 1,
            clear_chat: true,
            create_transcript: true,
            transcript_dir: dir.to_string_lossy().into_owned(),
            learning_mode: true,
        });

        let transcript = dir.join(crate::messages::TRANSCRIPT_FILE_NAME);
        let contents = std::fs::read_to_string(&transcript).unwrap();
        assert!(contents.contains("message: hi"));
        assert!(contents.contains("message: hello"));

        // Transcript captures the conversation before the clear
        assert!(state.messages.is_empty());
        assert_eq!(state.settings.microphone_index, 1);
        assert!(state.settings.learning_mode);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_transcript_to_missing_directory_reports_error() {
        let (mut state, _command_rx, _event_tx) = state_with_chat();

        state.apply_settings(ChatSettings {
            create_transcript: true,
            transcript_dir: "/definitely/not/a/real/directory".to_string(),
            ..Default::default()
        });

        assert!(state.last_error.is_some());
    }

    #[test]
    fn test_transcript_received_appends_to_input() {
        let mut state = AppState::new();
        let (event_tx, event_rx) = bounded(8);
        state.speech_event_rx = Some(event_rx);
        state.listening = true;

        event_tx
            .send(SpeechEvent::Transcript("hello there".to_string()))
            .unwrap();
        event_tx.send(SpeechEvent::Finished).unwrap();
        state.poll_events();

        assert_eq!(state.input_text, "hello there");
        assert!(!state.listening);

        // A second transcript joins with a space
        let (event_tx, event_rx) = bounded(8);
        state.speech_event_rx = Some(event_rx);
        event_tx
            .send(SpeechEvent::Transcript("general".to_string()))
            .unwrap();
        state.poll_events();

        assert_eq!(state.input_text, "hello there general");
    }

    #[test]
    fn test_recognition_failure_returns_to_idle() {
        let mut state = AppState::new();
        let (event_tx, event_rx) = bounded(8);
        state.speech_event_rx = Some(event_rx);
        state.listening = true;

        event_tx
            .send(SpeechEvent::Error("recognizer unavailable".to_string()))
            .unwrap();
        event_tx.send(SpeechEvent::Finished).unwrap();
        state.poll_events();

        assert!(state.input_text.is_empty());
        assert!(!state.listening);
        assert!(state.last_error.is_some());
    }
}
