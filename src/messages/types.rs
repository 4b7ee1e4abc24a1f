use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Timestamp format used in bubbles and transcript records
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// Name shown in bubbles and transcript records
    pub fn display_name(&self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Bot => "Bot",
        }
    }
}

/// A single entry in the conversation log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
    pub text: String,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            timestamp: Local::now(),
            text: text.into(),
        }
    }

    pub fn timestamp_display(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}
