//! A provider that returns pre-configured responses, for tests and offline
//! runs.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::base::{Provider, Usage};
use crate::models::message::Message;

pub struct MockProvider {
    responses: Arc<Mutex<Vec<Message>>>,
    error: Option<String>,
}

impl MockProvider {
    /// Replies with the given messages in order, then with empty assistant
    /// messages once they run out
    pub fn new(responses: Vec<Message>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            error: None,
        }
    }

    /// Fails every completion with the given message
    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            error: Some(error.into()),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        _model: &str,
        _system: &str,
        _messages: &[Message],
    ) -> Result<(Message, Usage)> {
        if let Some(error) = &self.error {
            return Err(anyhow!("{}", error));
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok((Message::assistant(""), Usage::default()))
        } else {
            Ok((responses.remove(0), Usage::default()))
        }
    }
}
