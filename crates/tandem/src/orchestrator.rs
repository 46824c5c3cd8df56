//! The state machine governing one user message submission lifecycle:
//! validate input, save the workspace, capture pending diffs, compose and
//! dispatch the outgoing message, persist history, reset.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::error;

use crate::catalog::DEFAULT_MODEL;
use crate::channel::StreamingChannel;
use crate::compose::compose;
use crate::errors::ChatError;
use crate::frontend::Frontend;
use crate::models::message::Message;
use crate::parser;
use crate::persist::{HistoryPersister, PersistQueue};
use crate::store::{ConversationStore, SubscriberId};
use crate::workspace::Workspace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    Sending,
}

/// What became of a send request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The message went out to the channel
    Dispatched,
    /// Empty input or a send already in flight; nothing happened
    Dropped,
    /// The attempt failed; the user was notified and may resend manually
    Failed,
}

pub struct SendOrchestrator {
    store: Mutex<ConversationStore>,
    channel: Arc<dyn StreamingChannel>,
    workspace: Arc<dyn Workspace>,
    persist: PersistQueue,
    frontend: Arc<dyn Frontend>,
    model: Mutex<String>,
    input: Mutex<String>,
    state: Mutex<SendState>,
    chat_started: AtomicBool,
    aborted: AtomicBool,
    persisted_len: AtomicUsize,
}

impl SendOrchestrator {
    pub fn new(
        store: ConversationStore,
        channel: Arc<dyn StreamingChannel>,
        workspace: Arc<dyn Workspace>,
        persister: Arc<dyn HistoryPersister>,
        frontend: Arc<dyn Frontend>,
    ) -> Self {
        let chat_started = !store.is_empty();
        let persisted_len = store.len();
        SendOrchestrator {
            store: Mutex::new(store),
            channel,
            workspace,
            persist: PersistQueue::new(persister),
            frontend,
            model: Mutex::new(DEFAULT_MODEL.to_string()),
            input: Mutex::new(String::new()),
            state: Mutex::new(SendState::Idle),
            chat_started: AtomicBool::new(chat_started),
            aborted: AtomicBool::new(false),
            persisted_len: AtomicUsize::new(persisted_len),
        }
    }

    pub fn state(&self) -> SendState {
        *self.state.lock().unwrap()
    }

    pub fn model(&self) -> String {
        self.model.lock().unwrap().clone()
    }

    /// Takes effect on the next send; already-sent messages keep their tag
    pub fn set_model(&self, model: impl Into<String>) {
        *self.model.lock().unwrap() = model.into();
    }

    pub fn input(&self) -> String {
        self.input.lock().unwrap().clone()
    }

    pub fn set_input(&self, input: impl Into<String>) {
        *self.input.lock().unwrap() = input.into();
    }

    pub fn chat_started(&self) -> bool {
        self.chat_started.load(Ordering::SeqCst)
    }

    pub fn aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    pub fn messages(&self) -> Vec<Message> {
        self.store.lock().unwrap().messages().to_vec()
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriberId
    where
        F: Fn(&[Message]) + Send + 'static,
    {
        self.store.lock().unwrap().subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.store.lock().unwrap().unsubscribe(id)
    }

    /// The conversation in its display form: assistant content is replaced
    /// with its parsed representation, user messages pass through.
    pub fn display_messages(&self) -> Vec<Message> {
        let store = self.store.lock().unwrap();
        let parsed = parser::parse_messages(store.messages());
        store.display_messages(&parsed)
    }

    /// Submit the given text, or the input buffer when `None`. Requests with
    /// blank input, or arriving while a send is in flight, are dropped
    /// silently. The state machine always returns to `Idle`, success or not.
    pub async fn send(&self, message_input: Option<&str>) -> SendOutcome {
        let input = match message_input {
            Some(text) => text.to_string(),
            None => self.input.lock().unwrap().clone(),
        };

        {
            let mut state = self.state.lock().unwrap();
            if input.trim().is_empty() || *state == SendState::Sending {
                return SendOutcome::Dropped;
            }
            *state = SendState::Sending;
        }

        if !self.chat_started.swap(true, Ordering::SeqCst) {
            self.frontend.chat_started().await;
        }

        let outcome = match self.dispatch(&input).await {
            Ok(()) => SendOutcome::Dispatched,
            Err(e) => {
                error!("error sending message: {}", e);
                self.frontend.notify_error("Failed to send message");
                SendOutcome::Failed
            }
        };

        *self.state.lock().unwrap() = SendState::Idle;
        self.input.lock().unwrap().clear();
        outcome
    }

    async fn dispatch(&self, input: &str) -> Result<(), ChatError> {
        // Save files before sending the message
        self.workspace
            .save_all_files()
            .await
            .map_err(|e| ChatError::Workspace(e.to_string()))?;

        // Capture and clear in one step; edits landing from here on belong
        // to the next send.
        let modifications = self.workspace.take_modifications();
        self.aborted.store(false, Ordering::SeqCst);

        let content = compose(
            input,
            &self.model.lock().unwrap(),
            modifications.as_deref(),
        );
        let message = Message::user(content);

        // Block on dispatch acceptance only, never on the streamed reply
        self.channel
            .append(message.clone())
            .await
            .map_err(|e| ChatError::Dispatch(e.to_string()))?;

        let snapshot = {
            let mut store = self.store.lock().unwrap();
            store.append(message);
            self.persisted_len.store(store.len(), Ordering::SeqCst);
            store.messages().to_vec()
        };
        self.persist
            .store(snapshot)
            .await
            .map_err(|e| ChatError::Persistence(e.to_string()))?;

        Ok(())
    }

    /// Stop the channel and mark the session aborted. The send state machine
    /// is left alone; an in-flight send finishes its own bookkeeping.
    pub fn abort(&self) {
        self.channel.stop();
        self.aborted.store(true, Ordering::SeqCst);
    }

    /// Reconcile against the channel's live sequence: mirror new messages
    /// into the store, and persist whenever the sequence has grown past the
    /// last persisted length. The dirty check is length-based, so it fires
    /// once per append.
    pub async fn on_channel_update(&self) {
        let live = self.channel.messages();

        {
            let mut store = self.store.lock().unwrap();
            if live.len() > store.len() {
                let tail = live[store.len()..].to_vec();
                store.extend_from(&tail);
            }
        }

        if live.len() > self.persisted_len.load(Ordering::SeqCst) {
            self.persisted_len.store(live.len(), Ordering::SeqCst);
            if let Err(e) = self.persist.store(live).await {
                error!("failed to persist message history: {}", e);
                self.frontend.notify_error(&e.to_string());
            }
        }
    }
}
