use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::error;
use uuid::Uuid;

use tandem::catalog;
use tandem::channel::ChannelEvent;
use tandem::completion::CompletionChannel;
use tandem::errors::ChatError;
use tandem::frontend::Frontend;
use tandem::orchestrator::{SendOrchestrator, SendOutcome};
use tandem::persist::HistoryPersister;
use tandem::providers::openai::OpenAiProvider;
use tandem::store::ConversationStore;
use tandem::workspace::{FileTracker, Workspace};

use crate::frontend::ConsoleFrontend;
use crate::prompt::rustyline::RustylinePrompt;
use crate::prompt::{InputType, Prompt};
use self::session_file::{ensure_session_dir, load_messages, FileHistoryPersister};

pub mod session_file;

const SYSTEM_PROMPT: &str = "You are a careful pair-programming assistant. \
When the user message embeds a <file_modifications> block, treat it as the \
current state of their workspace edits and take it into account before \
answering.";

pub struct Session {
    orchestrator: Arc<SendOrchestrator>,
    events: mpsc::UnboundedReceiver<ChannelEvent>,
    prompt: Box<dyn Prompt>,
    tracker: Arc<FileTracker>,
    session_file: PathBuf,
}

pub fn build_session(name: Option<String>, resume: bool, model: String) -> Result<Session> {
    let name = name.unwrap_or_else(|| Uuid::new_v4().to_string());
    let session_file = ensure_session_dir()?.join(format!("{}.jsonl", name));

    let initial = if resume && session_file.exists() {
        load_messages(&session_file)?
    } else {
        Vec::new()
    };

    let provider = Arc::new(OpenAiProvider::from_env()?);
    let (channel, events) =
        CompletionChannel::with_initial_messages(provider, SYSTEM_PROMPT, initial.clone());
    let store = ConversationStore::seeded(initial)?;

    let tracker = Arc::new(FileTracker::new());
    let persister = Arc::new(FileHistoryPersister::new(session_file.clone()));
    let orchestrator = Arc::new(SendOrchestrator::new(
        store,
        Arc::new(channel),
        Arc::clone(&tracker) as Arc<dyn Workspace>,
        persister as Arc<dyn HistoryPersister>,
        Arc::new(ConsoleFrontend) as Arc<dyn Frontend>,
    ));
    orchestrator.set_model(model);

    Ok(Session {
        orchestrator,
        events,
        prompt: Box::new(RustylinePrompt::new()?),
        tracker,
        session_file,
    })
}

impl Session {
    pub async fn start(mut self) -> Result<()> {
        self.prompt.render_raw(&format!(
            "Recording session to {}\n",
            self.session_file.display()
        ));

        loop {
            let input = self.prompt.get_input()?;
            match input.input_type {
                InputType::Exit => break,
                InputType::AskAgain => continue,
                InputType::Command => {
                    let command = input.content.unwrap_or_default();
                    if !self.handle_command(&command) {
                        break;
                    }
                }
                InputType::Message => {
                    let Some(content) = input.content else {
                        continue;
                    };
                    self.orchestrator.set_input(content);
                    self.prompt.show_busy();
                    let outcome = self.orchestrator.send(None).await;
                    if outcome == SendOutcome::Dispatched {
                        self.wait_for_reply().await;
                    }
                    self.prompt.hide_busy();
                }
            }
        }

        self.prompt.close();
        Ok(())
    }

    /// Returns false when the command ends the session
    fn handle_command(&mut self, command: &str) -> bool {
        let mut parts = command.split_whitespace();
        match parts.next() {
            Some("exit") | Some("quit") => return false,
            Some("models") => {
                for spec in catalog::MODEL_LIST {
                    self.prompt
                        .render_raw(&format!("{:<30} {}\n", spec.name, spec.label));
                }
            }
            Some("model") => match parts.next() {
                Some(name) if catalog::lookup(name).is_some() => {
                    self.orchestrator.set_model(name);
                    self.prompt.render_raw(&format!("Model set to {}\n", name));
                }
                Some(name) => {
                    self.prompt
                        .render_error(&format!("unknown model '{}'", name));
                }
                None => {
                    let model = self.orchestrator.model();
                    self.prompt.render_raw(&format!("Current model: {}\n", model));
                }
            },
            Some("attach") => match parts.next() {
                Some(path) => {
                    if let Err(e) = self.attach_file(path) {
                        self.prompt.render_error(&format!("{:#}", e));
                    }
                }
                None => self.prompt.render_error("usage: /attach <path>"),
            },
            Some("history") => {
                for message in self.orchestrator.display_messages() {
                    if !message.content.is_empty() {
                        self.prompt.render(Box::new(message));
                    }
                }
            }
            _ => {
                self.prompt
                    .render_error(&format!("unknown command '{}'", command));
            }
        }
        true
    }

    /// Record a file's current content as a pending modification so the next
    /// send carries it as diff context.
    fn attach_file(&self, path: &str) -> Result<()> {
        let content =
            fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
        let diff: String = content.lines().map(|line| format!("+{}\n", line)).collect();
        self.tracker.record(path, diff.trim_end());
        Ok(())
    }

    async fn wait_for_reply(&mut self) {
        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(ChannelEvent::Message(_)) => {
                        self.orchestrator.on_channel_update().await;
                        // Render the parsed form, not the raw streamed content
                        if let Some(message) = self.orchestrator.display_messages().pop() {
                            self.prompt.render(Box::new(message));
                        }
                    }
                    Some(ChannelEvent::Error(e)) => {
                        error!("{}", ChatError::Channel(e));
                        self.prompt
                            .render_error("There was an error processing your request");
                        break;
                    }
                    Some(ChannelEvent::Done) | None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    self.orchestrator.abort();
                    self.prompt
                        .render_raw("\nInterrupted. The reply was cancelled.\n");
                    break;
                }
            }
        }
    }
}
