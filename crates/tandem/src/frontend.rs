//! Hooks the orchestrator raises toward whatever surface hosts the chat.

use async_trait::async_trait;

#[async_trait]
pub trait Frontend: Send + Sync {
    /// One-shot transition when the first message of a session goes out;
    /// awaited before the send proceeds, invoked at most once per session.
    async fn chat_started(&self);

    /// A transient failure the user should see. Emitted exactly once per
    /// failed send attempt.
    fn notify_error(&self, message: &str);
}

/// Frontend that swallows everything, for hosts without a surface of their
/// own (tests, one-shot runs).
pub struct SilentFrontend;

#[async_trait]
impl Frontend for SilentFrontend {
    async fn chat_started(&self) {}

    fn notify_error(&self, _message: &str) {}
}
