//! Channel-based worker around the response engine
//!
//! The worker thread owns the loaded model. Commands arrive on a bounded
//! channel and replies come back as events polled by the UI thread. Only one
//! response request is outstanding at a time: requests queued behind a newer
//! one are superseded and never reach the engine, and the UI drops replies
//! whose request id has gone stale.

use crate::chat::config::EngineConfig;
use crate::chat::context::ConversationContext;
use crate::chat::corrections::CorrectionStore;
use crate::chat::engine::ChatEngine;
use crate::chat::prompts::system_prompt_with_corrections;
use crate::Result;
use crossbeam_channel::{bounded, Receiver, Sender};
use tokio::runtime::Runtime;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Commands accepted by the response worker
#[derive(Debug, Clone)]
pub enum ChatCommand {
    /// Produce a reply for the given user statement
    Respond {
        statement: String,
        request_id: Uuid,
    },

    /// Train mode: record the statement as model input, produce no reply
    Learn { statement: String },

    /// Clear conversation history
    ClearContext,

    /// Shut the worker down
    Shutdown,
}

/// Events emitted by the response worker
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// The reply for a response request
    Reply { text: String, request_id: Uuid },

    /// An error occurred
    Error {
        message: String,
        request_id: Option<Uuid>,
    },

    /// The worker has shut down
    Shutdown,
}

/// A response request selected for dispatch to the engine
#[derive(Debug, Clone)]
struct PendingRequest {
    statement: String,
    request_id: Uuid,
}

enum BatchOutcome {
    Continue(Option<PendingRequest>),
    Shutdown,
}

/// Response pipeline with channel-based communication
pub struct ChatPipeline {
    config: EngineConfig,
    command_tx: Sender<ChatCommand>,
    command_rx: Receiver<ChatCommand>,
    event_tx: Sender<ChatEvent>,
    event_rx: Receiver<ChatEvent>,
}

impl ChatPipeline {
    pub fn new(config: EngineConfig) -> Self {
        let (command_tx, command_rx) = bounded(100);
        let (event_tx, event_rx) = bounded(100);

        Self {
            config,
            command_tx,
            command_rx,
            event_tx,
            event_rx,
        }
    }

    pub fn command_sender(&self) -> Sender<ChatCommand> {
        self.command_tx.clone()
    }

    pub fn event_receiver(&self) -> Receiver<ChatEvent> {
        self.event_rx.clone()
    }

    /// Start the worker thread that owns the engine.
    pub fn start_worker(self) -> Result<()> {
        let config = self.config;
        let command_rx = self.command_rx;
        let event_tx = self.event_tx;

        std::thread::spawn(move || {
            info!("Response worker starting");

            let runtime = match Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    error!("Failed to create tokio runtime: {e}");
                    let _ = event_tx.send(ChatEvent::Error {
                        message: format!("Runtime creation failed: {e}"),
                        request_id: None,
                    });
                    let _ = event_tx.send(ChatEvent::Shutdown);
                    return;
                }
            };

            let mut corrections = CorrectionStore::load(&config.corrections_path);

            let engine = match runtime.block_on(ChatEngine::new(config.clone())) {
                Ok(engine) => engine,
                Err(e) => {
                    error!("Failed to initialize response engine: {e}");
                    let _ = event_tx.send(ChatEvent::Error {
                        message: e.to_string(),
                        request_id: None,
                    });
                    let _ = event_tx.send(ChatEvent::Shutdown);
                    return;
                }
            };

            let mut context = ConversationContext::new(
                system_prompt_with_corrections(&corrections),
                config.context_size,
            );

            info!("Response worker ready");

            loop {
                let first = match command_rx.recv() {
                    Ok(command) => command,
                    Err(e) => {
                        error!("Command channel error: {e}");
                        break;
                    }
                };

                // Everything already queued is handled in one batch, so a
                // request superseded while waiting never reaches the engine
                let mut batch = vec![first];
                batch.extend(command_rx.try_iter());

                let pending = match process_batch(batch, &mut context, &mut corrections) {
                    BatchOutcome::Continue(pending) => pending,
                    BatchOutcome::Shutdown => {
                        info!("Response worker shutting down");
                        let _ = event_tx.send(ChatEvent::Shutdown);
                        break;
                    }
                };

                let Some(PendingRequest {
                    statement,
                    request_id,
                }) = pending
                else {
                    continue;
                };

                debug!(%request_id, "processing response request");

                context.add_user_message(&statement);
                let messages = context.get_messages();

                match runtime.block_on(engine.respond(&messages)) {
                    Ok(reply) => {
                        context.add_assistant_message(&reply);

                        if event_tx
                            .send(ChatEvent::Reply {
                                text: reply,
                                request_id,
                            })
                            .is_err()
                        {
                            error!("Event channel closed");
                            break;
                        }
                    }
                    Err(e) => {
                        error!("Response generation failed: {e}");
                        let _ = event_tx.send(ChatEvent::Error {
                            message: e.to_string(),
                            request_id: Some(request_id),
                        });
                    }
                }
            }

            info!("Response worker stopped");
        });

        Ok(())
    }
}

/// Handle a batch of queued commands.
///
/// Side-effect commands are applied in arrival order; of the response
/// requests only the newest survives. A `Shutdown` ends the batch
/// immediately.
fn process_batch(
    batch: Vec<ChatCommand>,
    context: &mut ConversationContext,
    corrections: &mut CorrectionStore,
) -> BatchOutcome {
    let mut pending: Option<PendingRequest> = None;

    for command in batch {
        match command {
            ChatCommand::Respond {
                statement,
                request_id,
            } => {
                if let Some(superseded) = pending.replace(PendingRequest {
                    statement,
                    request_id,
                }) {
                    debug!(
                        request_id = %superseded.request_id,
                        "response request superseded before dispatch"
                    );
                }
            }
            ChatCommand::Learn { statement } => {
                learn(context, corrections, statement);
            }
            ChatCommand::ClearContext => {
                info!("Clearing conversation context");
                context.clear();
            }
            ChatCommand::Shutdown => return BatchOutcome::Shutdown,
        }
    }

    BatchOutcome::Continue(pending)
}

/// Record a corrected reply as model input.
fn learn(context: &mut ConversationContext, corrections: &mut CorrectionStore, statement: String) {
    info!("Learning corrected reply");

    let prompt = context.last_user_message().map(|m| m.content.clone());

    context.add_assistant_message(&statement);
    corrections.record(prompt, statement);

    if let Err(e) = corrections.save() {
        warn!("failed to persist corrections: {e}");
    }

    // Learned examples apply from the next request on
    context.set_system_prompt(system_prompt_with_corrections(corrections));
}
