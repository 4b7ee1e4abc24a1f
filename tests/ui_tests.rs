//! UI automation tests using egui_kittest and AccessKit
//!
//! These tests drive the chat surface through the accessibility tree and
//! assert the send-path properties: empty input sends nothing, a non-empty
//! input produces exactly one bubble and one delegated request.

use crossbeam_channel::{bounded, Receiver, Sender};
use egui_kittest::kittest::Queryable;
use egui_kittest::Harness;
use parley::chat::{ChatCommand, ChatEvent};
use parley::messages::{Message, Sender as MessageSender};
use parley::ui::AppState;

/// Application state wrapper for testing, with a live command channel so
/// delegated requests can be asserted.
struct TestApp {
    state: AppState,
    command_rx: Receiver<ChatCommand>,
    event_tx: Sender<ChatEvent>,
}

impl TestApp {
    fn new() -> Self {
        let (command_tx, command_rx) = bounded(100);
        let (event_tx, event_rx) = bounded(100);

        let mut state = AppState::new();
        state.attach_chat(command_tx, event_rx);

        Self {
            state,
            command_rx,
            event_tx,
        }
    }

    fn with_message(self, sender: MessageSender, text: &str) -> Self {
        self.state.messages.add(Message::new(sender, text));
        self
    }
}

/// Render the chat UI for testing
fn render_chat_ui(app: &mut TestApp, ui: &mut egui::Ui) {
    // Message display area
    egui::ScrollArea::vertical()
        .id_salt("test_messages")
        .max_height(300.0)
        .show(ui, |ui| {
            for message in app.state.messages.get_all() {
                let is_user = message.sender == MessageSender::User;
                let label_text = if is_user {
                    format!("User message: {}", message.text)
                } else {
                    format!("Bot response: {}", message.text)
                };

                let response = ui.label(&message.text);
                response.widget_info(|| {
                    egui::WidgetInfo::labeled(egui::WidgetType::Label, true, &label_text)
                });
            }
        });

    ui.separator();

    // Input area
    ui.horizontal(|ui| {
        let text_edit = egui::TextEdit::singleline(&mut app.state.input_text)
            .hint_text("Type a message...")
            .desired_width(200.0)
            .id(egui::Id::new("message_input"));

        let text_response = ui.add(text_edit);
        text_response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, true, "Message input")
        });

        let send_enabled = !app.state.input_text.trim().is_empty();
        let send_response = ui.add_enabled(send_enabled, egui::Button::new("Send"));
        send_response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Button, send_enabled, "Send message")
        });

        if send_response.clicked() {
            app.state.send_message();
        }
    });
}

fn harness(app: TestApp) -> Harness<'static, TestApp> {
    Harness::builder()
        .with_size(egui::Vec2::new(400.0, 500.0))
        .build_state(
            |ctx, app: &mut TestApp| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    render_chat_ui(app, ui);
                });
            },
            app,
        )
}

#[test]
fn test_message_input_exists() {
    let mut harness = harness(TestApp::new());
    harness.run();

    let _input = harness.get_by_label("Message input");
}

#[test]
fn test_send_button_exists() {
    let mut harness = harness(TestApp::new());
    harness.run();

    let _button = harness.get_by_label("Send message");
}

#[test]
fn test_type_text_into_input() {
    let mut harness = harness(TestApp::new());
    harness.run();

    harness.get_by_label("Message input").focus();
    harness.run();

    harness.get_by_label("Message input").type_text("Hello, world!");
    harness.run();

    assert_eq!(harness.state().state.input_text, "Hello, world!");
}

#[test]
fn test_send_creates_bubble_and_one_request() {
    let mut harness = harness(TestApp::new());
    harness.run();

    harness.get_by_label("Message input").focus();
    harness.run();

    harness.get_by_label("Message input").type_text("Test message");
    harness.run();

    harness.get_by_label("Send message").click();
    harness.run();

    // Exactly one outgoing bubble
    let messages = harness.state().state.messages.get_all();
    assert_eq!(messages.len(), 1, "Should have exactly one message");
    assert_eq!(messages[0].sender, MessageSender::User);
    assert_eq!(messages[0].text, "Test message");

    // Input is cleared
    assert!(harness.state().state.input_text.is_empty());

    // Exactly one delegated request
    match harness.state().command_rx.try_recv() {
        Ok(ChatCommand::Respond { statement, .. }) => assert_eq!(statement, "Test message"),
        other => panic!("expected one Respond command, got {other:?}"),
    }
    assert!(
        harness.state().command_rx.try_recv().is_err(),
        "exactly one request expected"
    );
}

#[test]
fn test_cannot_send_empty_message() {
    let mut harness = harness(TestApp::new());
    harness.run();

    harness.get_by_label("Send message").click();
    harness.run();

    // No bubble and no delegated request
    assert!(harness.state().state.messages.is_empty());
    assert!(harness.state().command_rx.try_recv().is_err());
}

#[test]
fn test_user_message_appears_in_list() {
    let mut harness = harness(TestApp::new().with_message(MessageSender::User, "Hello bot!"));
    harness.run();

    let _message = harness.get_by_label("User message: Hello bot!");
}

#[test]
fn test_bot_reply_appears_in_list() {
    let mut harness =
        harness(TestApp::new().with_message(MessageSender::Bot, "Hello! How can I help you?"));
    harness.run();

    let _message = harness.get_by_label("Bot response: Hello! How can I help you?");
}

#[test]
fn test_complete_chat_flow() {
    let mut harness = harness(TestApp::new());
    harness.run();

    // Type and send a message
    harness.get_by_label("Message input").focus();
    harness.run();

    harness.get_by_label("Message input").type_text("What time is it?");
    harness.run();

    harness.get_by_label("Send message").click();
    harness.run();

    // The worker would answer this request; deliver the reply event
    let request_id = match harness.state().command_rx.try_recv() {
        Ok(ChatCommand::Respond { request_id, .. }) => request_id,
        other => panic!("expected a Respond command, got {other:?}"),
    };

    harness
        .state()
        .event_tx
        .send(ChatEvent::Reply {
            text: "It is noon.".to_string(),
            request_id,
        })
        .unwrap();

    harness.state_mut().state.poll_events();
    harness.run();

    // Both bubbles visible, in order
    let messages = harness.state().state.messages.get_all();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, MessageSender::User);
    assert_eq!(messages[1].sender, MessageSender::Bot);

    let _user = harness.get_by_label("User message: What time is it?");
    let _bot = harness.get_by_label("Bot response: It is noon.");
}

#[test]
fn test_multiple_messages_conversation() {
    let mut harness = harness(
        TestApp::new()
            .with_message(MessageSender::User, "Hi!")
            .with_message(MessageSender::Bot, "Hello!")
            .with_message(MessageSender::User, "How are you?")
            .with_message(MessageSender::Bot, "I'm doing well, thanks!"),
    );
    harness.run();

    let _ = harness.get_by_label("User message: Hi!");
    let _ = harness.get_by_label("Bot response: Hello!");
    let _ = harness.get_by_label("User message: How are you?");
    let _ = harness.get_by_label("Bot response: I'm doing well, thanks!");

    assert_eq!(harness.state().state.messages.get_all().len(), 4);
}
