//! Provider-backed [`StreamingChannel`]: each dispatched user message kicks
//! off a completion request whose reply grows the live sequence and is
//! reported over an event stream.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error};

use crate::catalog::{self, DEFAULT_MODEL};
use crate::channel::{ChannelEvent, StreamingChannel};
use crate::models::message::Message;
use crate::providers::base::Provider;

pub struct CompletionChannel {
    provider: Arc<dyn Provider>,
    system_prompt: String,
    messages: Arc<Mutex<Vec<Message>>>,
    events: mpsc::UnboundedSender<ChannelEvent>,
    cancel: watch::Sender<bool>,
}

impl CompletionChannel {
    pub fn new(
        provider: Arc<dyn Provider>,
        system_prompt: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<ChannelEvent>) {
        Self::with_initial_messages(provider, system_prompt, Vec::new())
    }

    /// Seed the live sequence, e.g. when resuming a stored session.
    pub fn with_initial_messages(
        provider: Arc<dyn Provider>,
        system_prompt: impl Into<String>,
        initial: Vec<Message>,
    ) -> (Self, mpsc::UnboundedReceiver<ChannelEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let (cancel, _) = watch::channel(false);
        let channel = CompletionChannel {
            provider,
            system_prompt: system_prompt.into(),
            messages: Arc::new(Mutex::new(initial)),
            events,
            cancel,
        };
        (channel, receiver)
    }
}

#[async_trait]
impl StreamingChannel for CompletionChannel {
    async fn append(&self, message: Message) -> Result<()> {
        // The outgoing content carries the model selection; fall back to the
        // catalog default for untagged messages.
        let model = catalog::parse_model_tag(&message.content)
            .map(|(model, _)| model.to_string())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let snapshot = {
            let mut messages = self.messages.lock().unwrap();
            messages.push(message);
            messages.clone()
        };

        // A fresh dispatch supersedes any earlier stop request. The reset
        // wakes earlier tasks' receivers, so cancellation checks the value,
        // not the notification; only stop() ends an in-flight completion.
        self.cancel.send_replace(false);
        let cancel = self.cancel.subscribe();

        let provider = Arc::clone(&self.provider);
        let messages = Arc::clone(&self.messages);
        let events = self.events.clone();
        let system_prompt = self.system_prompt.clone();

        tokio::spawn(async move {
            tokio::select! {
                result = provider.complete(&model, &system_prompt, &snapshot) => match result {
                    Ok((reply, usage)) => {
                        debug!(?usage, "finished streaming");
                        messages.lock().unwrap().push(reply.clone());
                        let _ = events.send(ChannelEvent::Message(reply));
                        let _ = events.send(ChannelEvent::Done);
                    }
                    Err(e) => {
                        error!("completion request failed: {:#}", e);
                        let _ = events.send(ChannelEvent::Error(e.to_string()));
                    }
                },
                _ = cancelled(cancel) => {
                    debug!("completion cancelled");
                    let _ = events.send(ChannelEvent::Done);
                }
            }
        });

        Ok(())
    }

    fn messages(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }

    fn stop(&self) {
        self.cancel.send_replace(true);
    }
}

/// Resolves when the flag reads true. Waiting on the value rather than the
/// change notification means a reset back to false leaves the task running.
async fn cancelled(mut cancel: watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            // The channel is gone; no stop() can arrive anymore.
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::base::Usage;
    use crate::providers::mock::MockProvider;
    use std::time::Duration;

    struct PendingProvider;

    #[async_trait]
    impl Provider for PendingProvider {
        async fn complete(
            &self,
            _model: &str,
            _system: &str,
            _messages: &[Message],
        ) -> Result<(Message, Usage)> {
            futures::future::pending().await
        }
    }

    /// Echoes the latest user message after a short delay
    struct SlowProvider;

    #[async_trait]
    impl Provider for SlowProvider {
        async fn complete(
            &self,
            _model: &str,
            _system: &str,
            messages: &[Message],
        ) -> Result<(Message, Usage)> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let last = messages
                .last()
                .map(|message| message.content.clone())
                .unwrap_or_default();
            Ok((Message::assistant(format!("reply to {}", last)), Usage::default()))
        }
    }

    #[tokio::test]
    async fn test_reply_grows_live_sequence() {
        let provider = Arc::new(MockProvider::new(vec![Message::assistant("the answer")]));
        let (channel, mut events) = CompletionChannel::new(provider, "You are helpful.");

        channel
            .append(Message::user("[Model: gpt-4o]\n\nthe question"))
            .await
            .unwrap();

        match events.recv().await {
            Some(ChannelEvent::Message(reply)) => {
                assert!(reply.is_assistant());
                assert_eq!(reply.content, "the answer");
            }
            other => panic!("expected message event, got {:?}", other),
        }
        assert_eq!(events.recv().await, Some(ChannelEvent::Done));

        let live = channel.messages();
        assert_eq!(live.len(), 2);
        assert!(live[0].is_user());
        assert_eq!(live[1].content, "the answer");
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_dispatch_leaves_earlier_reply_in_flight() {
        let (channel, mut events) = CompletionChannel::new(Arc::new(SlowProvider), "system");

        channel.append(Message::user("one")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        channel.append(Message::user("two")).await.unwrap();

        // Both completions run to the end; only stop() cancels.
        let mut replies = Vec::new();
        for _ in 0..4 {
            match events.recv().await {
                Some(ChannelEvent::Message(reply)) => replies.push(reply.content),
                Some(ChannelEvent::Done) => {}
                other => panic!("unexpected event: {:?}", other),
            }
        }
        assert_eq!(replies, vec!["reply to one", "reply to two"]);
        assert_eq!(channel.messages().len(), 4);
    }

    #[tokio::test]
    async fn test_stop_cancels_in_flight_completion() {
        let (channel, mut events) = CompletionChannel::new(Arc::new(PendingProvider), "system");

        channel.append(Message::user("hello")).await.unwrap();
        channel.stop();

        assert_eq!(events.recv().await, Some(ChannelEvent::Done));
        // The dispatched user message stands; no reply ever lands.
        assert_eq!(channel.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_is_an_error_event() {
        let provider = Arc::new(MockProvider::failing("rate limited"));
        let (channel, mut events) = CompletionChannel::new(provider, "system");

        channel.append(Message::user("hello")).await.unwrap();

        match events.recv().await {
            Some(ChannelEvent::Error(e)) => assert!(e.contains("rate limited")),
            other => panic!("expected error event, got {:?}", other),
        }
        assert_eq!(channel.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_resumed_session_seeds_live_sequence() {
        let provider = Arc::new(MockProvider::new(vec![]));
        let initial = vec![Message::user("old"), Message::assistant("reply")];
        let (channel, _events) =
            CompletionChannel::with_initial_messages(provider, "system", initial);

        assert_eq!(channel.messages().len(), 2);
    }
}
