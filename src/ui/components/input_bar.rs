//! Input bar component
//!
//! Text input with a live character count, a speech button, and a send
//! button.

use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, Key, RichText};

/// Input bar component for text and voice input
pub struct InputBar<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> InputBar<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let theme = self.theme;
        let state = self.state;

        egui::Frame::none()
            .fill(theme.bg_secondary)
            .rounding(theme.card_rounding)
            .inner_margin(theme.spacing_sm)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        // Reserve room for the two buttons on the right
                        let input_width = (ui.available_width() - 180.0).max(80.0);

                        let text_edit = egui::TextEdit::singleline(&mut state.input_text)
                            .hint_text("Type a message...")
                            .desired_width(input_width)
                            .margin(egui::Margin::symmetric(12.0, 8.0));

                        let response = ui.add(text_edit);

                        // Enter sends, like clicking Send
                        if response.lost_focus()
                            && ui.input(|i| i.key_pressed(Key::Enter))
                            && !state.input_text.trim().is_empty()
                        {
                            state.send_message();
                            response.request_focus();
                        }

                        show_speech_button(ui, theme, state);
                        show_send_button(ui, theme, state);
                    });

                    ui.with_layout(
                        egui::Layout::right_to_left(egui::Align::Center),
                        |ui| {
                            ui.label(
                                RichText::new(format!("{}", state.input_text.chars().count()))
                                    .size(11.0)
                                    .color(theme.text_muted),
                            );
                        },
                    );
                });
            });
    }
}

fn show_speech_button(ui: &mut egui::Ui, theme: &Theme, state: &mut AppState) {
    let (label, color) = if state.listening {
        ("Listening...", theme.listening)
    } else {
        ("Speech", theme.text_secondary)
    };

    let button = egui::Button::new(RichText::new(label).color(color))
        .rounding(theme.button_rounding);

    let response = ui.add_enabled(!state.listening, button);

    if response.clicked() {
        state.start_listening();
    }

    if state.listening {
        ui.ctx().request_repaint();
    }
}

fn show_send_button(ui: &mut egui::Ui, theme: &Theme, state: &mut AppState) {
    let can_send = !state.input_text.trim().is_empty();

    let button = egui::Button::new(RichText::new("Send").color(egui::Color32::WHITE))
        .rounding(theme.button_rounding)
        .fill(if can_send {
            theme.primary
        } else {
            theme.bg_tertiary
        });

    let response = ui.add_enabled(can_send, button);

    if response.clicked() {
        state.send_message();
    }

    response.on_hover_text("Send message (Enter)");
}
