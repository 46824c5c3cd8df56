//! Append-only conversation history with explicit change notification.
//!
//! The store replaces ambient shared state with a context object owned by
//! the orchestrator: mutation goes through `append`/`extend_from`, and
//! interested parties register listeners instead of reaching into a global.

use std::collections::HashMap;

use crate::errors::{ChatError, ChatResult};
use crate::models::message::Message;
use crate::models::role::Role;

pub type SubscriberId = u64;

type Listener = Box<dyn Fn(&[Message]) + Send>;

#[derive(Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
    listeners: HashMap<SubscriberId, Listener>,
    next_subscriber: SubscriberId,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an existing conversation, e.g. a resumed session.
    /// A malformed initial conversation is an integration bug and fails
    /// construction outright.
    pub fn seeded(initial: Vec<Message>) -> ChatResult<Self> {
        for (index, message) in initial.iter().enumerate() {
            if message.content.is_empty() {
                return Err(ChatError::InvalidConversation(format!(
                    "message at position {} has empty content",
                    index
                )));
            }
        }
        Ok(ConversationStore {
            messages: initial,
            listeners: HashMap::new(),
            next_subscriber: 0,
        })
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
        self.notify();
    }

    /// Append a run of messages, notifying listeners once.
    pub fn extend_from(&mut self, tail: &[Message]) {
        if tail.is_empty() {
            return;
        }
        self.messages.extend_from_slice(tail);
        self.notify();
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriberId
    where
        F: Fn(&[Message]) + Send + 'static,
    {
        let id = self.next_subscriber;
        self.next_subscriber += 1;
        self.listeners.insert(id, Box::new(listener));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    fn notify(&self) {
        for listener in self.listeners.values() {
            listener(&self.messages);
        }
    }

    /// Derive the display form of the conversation: assistant messages take
    /// the parsed content at their position (empty text when absent), user
    /// messages pass through. The stored messages are never mutated.
    pub fn display_messages(&self, parsed: &[String]) -> Vec<Message> {
        self.messages
            .iter()
            .enumerate()
            .map(|(index, message)| match message.role {
                Role::User => message.clone(),
                Role::Assistant => Message {
                    content: parsed.get(index).cloned().unwrap_or_default(),
                    ..message.clone()
                },
            })
            .collect()
    }
}
