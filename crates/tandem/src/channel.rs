//! The streaming channel seam: an incremental completion transport the
//! orchestrator dispatches into without blocking on the full reply.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::message::Message;

/// Events a channel emits as it produces assistant content.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// A new message was appended to the live sequence.
    Message(Message),
    /// The channel failed. The conversation is left untouched; the failure
    /// is surfaced to the user as its own notification.
    Error(String),
    /// The current reply finished streaming (or was cancelled).
    Done,
}

#[async_trait]
pub trait StreamingChannel: Send + Sync {
    /// Request dispatch of an outgoing message. Resolves on dispatch
    /// acceptance, not on completion of the streamed reply.
    async fn append(&self, message: Message) -> Result<()>;

    /// Snapshot of the live message sequence, which grows as replies stream
    /// in.
    fn messages(&self) -> Vec<Message>;

    /// Cooperative cancellation: ask the channel to stop producing further
    /// content. Does not unwind anything already dispatched.
    fn stop(&self);
}
