//! Main application struct and eframe integration

use crate::chat::{ChatPipeline, EngineConfig};
use crate::ui::components::{InputBar, MessageList, SettingsPanel};
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, CentralPanel, RichText, TopBottomPanel};
use tracing::error;

/// Main Parley application
pub struct ParleyApp {
    /// Application state
    state: AppState,
    /// Visual theme
    theme: Theme,
}

impl ParleyApp {
    /// Create a new Parley application and start the response worker.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let theme = Theme::dark();
        theme.apply(&cc.egui_ctx);

        let mut state = AppState::new();

        let pipeline = ChatPipeline::new(EngineConfig::default());
        let command_tx = pipeline.command_sender();
        let event_rx = pipeline.event_receiver();

        match pipeline.start_worker() {
            Ok(()) => state.attach_chat(command_tx, event_rx),
            Err(e) => {
                error!("failed to start response worker: {e}");
                state.last_error = Some(e.user_message());
            }
        }

        Self { state, theme }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("header")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_secondary)
                    .inner_margin(12.0),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new("Parley")
                            .size(20.0)
                            .strong()
                            .color(self.theme.text_primary),
                    );

                    ui.label(
                        RichText::new("Chat Assistant")
                            .size(14.0)
                            .color(self.theme.text_muted),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Settings").clicked() {
                            self.state.open_settings();
                        }
                    });
                });
            });
    }

    fn show_input_area(&mut self, ctx: &egui::Context) {
        TopBottomPanel::bottom("input_area")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing_sm),
            )
            .show(ctx, |ui| {
                ui.vertical(|ui| {
                    if let Some(message) = self.state.last_error.clone() {
                        ui.horizontal(|ui| {
                            ui.label(
                                RichText::new(message)
                                    .size(12.0)
                                    .color(self.theme.error),
                            );
                            if ui.small_button("✕").clicked() {
                                self.state.last_error = None;
                            }
                        });
                        ui.add_space(self.theme.spacing_sm);
                    }

                    InputBar::new(&mut self.state, &self.theme).show(ui);
                });
            });
    }

    fn show_content(&mut self, ctx: &egui::Context) {
        CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.bg_primary))
            .show(ctx, |ui| {
                MessageList::new(&mut self.state, &self.theme).show(ui);
            });
    }

    fn show_settings(&mut self, ctx: &egui::Context) {
        if self.state.settings_draft.is_none() {
            return;
        }

        let mut open = true;
        let mut accepted = None;

        if let Some(draft) = self.state.settings_draft.as_mut() {
            egui::Window::new("Settings")
                .open(&mut open)
                .collapsible(false)
                .resizable(false)
                .default_width(320.0)
                .show(ctx, |ui| {
                    accepted = SettingsPanel::new(draft, &self.theme).show(ui);
                });
        }

        if let Some(settings) = accepted {
            self.state.apply_settings(settings);
            self.state.settings_draft = None;
        } else if !open {
            // Closed without accepting; the draft is discarded
            self.state.settings_draft = None;
        }
    }
}

impl eframe::App for ParleyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Poll backend events
        self.state.poll_events();

        // Render UI
        self.show_header(ctx);
        self.show_settings(ctx);
        self.show_input_area(ctx);
        self.show_content(ctx);

        // Keep animating while a worker is busy
        if self.state.listening || self.state.awaiting_reply() {
            ctx.request_repaint();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.state.shutdown();
    }
}
