//! Settings panel component
//!
//! Edits a draft of the settings record. OK validates the transcript
//! directory; an invalid directory keeps the panel open with an inline
//! error.

use crate::audio;
use crate::config::ChatSettings;
use crate::ui::theme::Theme;
use egui::{self, RichText};

/// Draft of the settings record while the panel is open
#[derive(Debug, Clone)]
pub struct SettingsDraft {
    pub microphone_index: usize,
    pub clear_chat: bool,
    pub create_transcript: bool,
    pub transcript_dir: String,
    pub learning_mode: bool,

    /// Input device names, in selection-index order
    pub devices: Vec<String>,

    /// Inline validation error
    pub error: Option<String>,
}

impl SettingsDraft {
    /// Build a draft from the applied settings.
    ///
    /// The one-shot action flags always start unchecked.
    pub fn from_settings(settings: &ChatSettings) -> Self {
        Self {
            microphone_index: settings.microphone_index,
            clear_chat: false,
            create_transcript: false,
            transcript_dir: settings.transcript_dir.clone(),
            learning_mode: settings.learning_mode,
            devices: audio::input_device_names(),
            error: None,
        }
    }

    fn to_settings(&self) -> ChatSettings {
        ChatSettings {
            microphone_index: self.microphone_index,
            clear_chat: self.clear_chat,
            create_transcript: self.create_transcript,
            transcript_dir: self.transcript_dir.clone(),
            learning_mode: self.learning_mode,
        }
    }

    /// Validate and accept the draft.
    ///
    /// Returns the settings record on success; on failure the inline error
    /// is set and the panel stays open.
    pub fn accept(&mut self) -> Option<ChatSettings> {
        let settings = self.to_settings();

        match settings.validate() {
            Ok(()) => {
                self.error = None;
                Some(settings)
            }
            Err(message) => {
                self.error = Some(message);
                None
            }
        }
    }
}

/// Settings panel component
pub struct SettingsPanel<'a> {
    draft: &'a mut SettingsDraft,
    theme: &'a Theme,
}

impl<'a> SettingsPanel<'a> {
    pub fn new(draft: &'a mut SettingsDraft, theme: &'a Theme) -> Self {
        Self { draft, theme }
    }

    /// Render the panel. Returns the accepted settings when OK passes
    /// validation.
    pub fn show(self, ui: &mut egui::Ui) -> Option<ChatSettings> {
        let theme = self.theme;
        let draft = self.draft;

        let mut accepted = None;

        ui.vertical(|ui| {
            if let Some(error) = &draft.error {
                ui.label(RichText::new(error).color(theme.error).size(12.0));
                ui.add_space(theme.spacing_sm);
            }

            show_microphone_selector(ui, theme, draft);

            ui.add_space(theme.spacing_sm);

            ui.checkbox(&mut draft.clear_chat, "Clear chat");
            ui.checkbox(&mut draft.create_transcript, "Create chat transcript");
            ui.checkbox(&mut draft.learning_mode, "Learning mode");

            ui.add_space(theme.spacing_sm);

            ui.label(
                RichText::new("Transcript directory")
                    .size(12.0)
                    .color(theme.text_secondary),
            );
            let response = ui.add(
                egui::TextEdit::singleline(&mut draft.transcript_dir)
                    .hint_text("Enter transcript path")
                    .desired_width(f32::INFINITY),
            );
            if response.changed() {
                draft.error = None;
            }

            ui.add_space(theme.spacing_sm);

            if ui.button("OK").clicked() {
                accepted = draft.accept();
            }
        });

        accepted
    }
}

fn show_microphone_selector(ui: &mut egui::Ui, theme: &Theme, draft: &mut SettingsDraft) {
    ui.label(
        RichText::new("Microphone")
            .size(12.0)
            .color(theme.text_secondary),
    );

    if draft.devices.is_empty() {
        ui.label(
            RichText::new("(no input devices found)")
                .size(12.0)
                .color(theme.text_muted),
        );
        return;
    }

    let selected = draft
        .devices
        .get(draft.microphone_index)
        .cloned()
        .unwrap_or_else(|| "Unknown device".to_string());

    egui::ComboBox::from_id_salt("microphone_selector")
        .selected_text(selected)
        .width(ui.available_width())
        .show_ui(ui, |ui| {
            for (index, name) in draft.devices.iter().enumerate() {
                ui.selectable_value(&mut draft.microphone_index, index, name);
            }
        });
}
