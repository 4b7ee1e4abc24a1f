use super::types::Message;
use parking_lot::RwLock;
use std::sync::Arc;

/// Conversation log in display order, shared between the UI and tests.
#[derive(Debug, Clone)]
pub struct MessageStorage {
    messages: Arc<RwLock<Vec<Message>>>,
}

impl MessageStorage {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn add(&self, message: Message) {
        self.messages.write().push(message);
    }

    pub fn get_all(&self) -> Vec<Message> {
        self.messages.read().clone()
    }

    pub fn clear(&self) {
        self.messages.write().clear();
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }
}

impl Default for MessageStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Sender;

    #[test]
    fn test_add_preserves_order() {
        let storage = MessageStorage::new();
        storage.add(Message::new(Sender::User, "first"));
        storage.add(Message::new(Sender::Bot, "second"));
        storage.add(Message::new(Sender::User, "third"));

        let all = storage.get_all();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].text, "first");
        assert_eq!(all[1].text, "second");
        assert_eq!(all[2].text, "third");
    }

    #[test]
    fn test_clear() {
        let storage = MessageStorage::new();
        storage.add(Message::new(Sender::User, "hello"));
        assert!(!storage.is_empty());

        storage.clear();
        assert!(storage.is_empty());
        assert_eq!(storage.len(), 0);
    }
}
