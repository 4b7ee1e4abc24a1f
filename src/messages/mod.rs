pub mod storage;
pub mod transcript;
pub mod types;

pub use storage::MessageStorage;
pub use transcript::{write_transcript, TRANSCRIPT_FILE_NAME};
pub use types::{Message, Sender, TIMESTAMP_FORMAT};
