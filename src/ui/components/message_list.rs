//! Message list component
//!
//! Displays the conversation as chat bubbles, newest kept in view. In
//! learning mode each new bot bubble carries an inline verdict prompt.

use crate::messages::{Message, Sender};
use crate::ui::state::{AppState, CorrectionDraft};
use crate::ui::theme::Theme;
use egui::{self, Align, Color32, Key, RichText};
use uuid::Uuid;

enum ReviewAction {
    /// The reply was confirmed as correct
    Accept(Uuid),
    /// The reply was marked wrong; show the correction field
    Reject(Uuid),
    /// A correction was entered for the reply
    Submit(Uuid, String),
}

/// Message list component
pub struct MessageList<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> MessageList<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let theme = self.theme;
        let state = self.state;

        let messages = state.messages.get_all();
        let awaiting = state.awaiting_reply();

        let mut actions: Vec<ReviewAction> = Vec::new();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.add_space(theme.spacing);

                    if messages.is_empty() && !awaiting {
                        show_empty_state(ui, theme);
                    } else {
                        for message in &messages {
                            ui.push_id(message.id, |ui| {
                                let review = state.reviews.get_mut(&message.id);
                                if let Some(action) =
                                    show_message(ui, theme, message, review)
                                {
                                    actions.push(action);
                                }
                            });
                            ui.add_space(theme.spacing_sm);
                        }

                        if awaiting {
                            show_typing_indicator(ui, theme);
                        }
                    }

                    ui.add_space(theme.spacing);
                });
            });

        for action in actions {
            match action {
                ReviewAction::Accept(id) => {
                    state.reviews.remove(&id);
                }
                ReviewAction::Reject(id) => {
                    if let Some(draft) = state.reviews.get_mut(&id) {
                        draft.editing = true;
                    }
                }
                ReviewAction::Submit(id, text) => {
                    state.reviews.remove(&id);
                    state.submit_correction(text);
                }
            }
        }
    }
}

fn show_empty_state(ui: &mut egui::Ui, theme: &Theme) {
    ui.vertical_centered(|ui| {
        ui.add_space(100.0);

        ui.label(
            RichText::new("Welcome to Parley")
                .size(24.0)
                .color(theme.text_primary),
        );

        ui.add_space(theme.spacing);

        ui.label(
            RichText::new("Start a conversation by typing a message or using the Speech button.")
                .size(14.0)
                .color(theme.text_muted),
        );
    });
}

fn show_message(
    ui: &mut egui::Ui,
    theme: &Theme,
    message: &Message,
    review: Option<&mut CorrectionDraft>,
) -> Option<ReviewAction> {
    let is_user = message.sender == Sender::User;

    let bubble_color = if is_user {
        theme.user_bubble
    } else {
        theme.bot_bubble
    };

    let text_color = if is_user {
        Color32::WHITE
    } else {
        theme.text_primary
    };

    let align = if is_user { Align::RIGHT } else { Align::LEFT };

    let mut action = None;

    ui.with_layout(egui::Layout::top_down(align), |ui| {
        ui.label(
            RichText::new(message.sender.display_name())
                .size(12.0)
                .color(theme.text_muted),
        );

        ui.add_space(2.0);

        let max_width = ui.available_width() * 0.75;

        egui::Frame::none()
            .fill(bubble_color)
            .rounding(theme.bubble_rounding)
            .inner_margin(egui::Margin::symmetric(12.0, 8.0))
            .show(ui, |ui| {
                ui.set_max_width(max_width);
                ui.label(RichText::new(&message.text).color(text_color));
            });

        ui.label(
            RichText::new(message.timestamp_display())
                .size(10.0)
                .color(theme.text_muted),
        );

        if let Some(draft) = review {
            action = show_review_prompt(ui, theme, message.id, draft, max_width);
        }
    });

    action
}

/// Learning-mode verdict prompt under a bot bubble.
fn show_review_prompt(
    ui: &mut egui::Ui,
    theme: &Theme,
    message_id: Uuid,
    draft: &mut CorrectionDraft,
    max_width: f32,
) -> Option<ReviewAction> {
    let mut action = None;

    egui::Frame::none()
        .fill(theme.bg_secondary)
        .rounding(theme.card_rounding)
        .inner_margin(egui::Margin::symmetric(10.0, 6.0))
        .show(ui, |ui| {
            ui.set_max_width(max_width);

            ui.label(
                RichText::new("Is this a correct response?")
                    .size(12.0)
                    .color(theme.text_secondary),
            );

            ui.horizontal(|ui| {
                if ui.small_button("Yes").clicked() {
                    action = Some(ReviewAction::Accept(message_id));
                }
                if ui.small_button("No").clicked() {
                    action = Some(ReviewAction::Reject(message_id));
                }
            });

            if draft.editing {
                let response = ui.add(
                    egui::TextEdit::singleline(&mut draft.text)
                        .hint_text("Enter what should be a correct response"),
                );

                let submitted = response.lost_focus()
                    && ui.input(|i| i.key_pressed(Key::Enter))
                    && !draft.text.trim().is_empty();

                if submitted {
                    action = Some(ReviewAction::Submit(message_id, draft.text.clone()));
                }
            }
        });

    action
}

fn show_typing_indicator(ui: &mut egui::Ui, theme: &Theme) {
    ui.with_layout(egui::Layout::top_down(Align::LEFT), |ui| {
        ui.label(
            RichText::new(Sender::Bot.display_name())
                .size(12.0)
                .color(theme.text_muted),
        );

        ui.add_space(2.0);

        egui::Frame::none()
            .fill(theme.bot_bubble)
            .rounding(theme.bubble_rounding)
            .inner_margin(egui::Margin::symmetric(12.0, 8.0))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    for i in 0..3 {
                        let t = ui.ctx().input(|input| input.time);
                        let alpha = ((t * 3.0 + i as f64 * 0.5).sin() * 0.5 + 0.5) as f32;
                        ui.label(
                            RichText::new("●")
                                .size(10.0)
                                .color(theme.text_muted.gamma_multiply(alpha)),
                        );
                    }
                });
            });
    });

    ui.ctx().request_repaint();
}
