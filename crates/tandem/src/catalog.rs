//! The fixed catalog of completion models and the tag every outgoing user
//! message carries so the channel knows which model to route to.

use lazy_static::lazy_static;
use regex::Regex;

/// A selectable completion model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub provider: &'static str,
}

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

pub const MODEL_LIST: &[ModelSpec] = &[
    ModelSpec {
        name: "gemini-1.5-flash",
        label: "Gemini 1.5 Flash",
        provider: "Google Generative AI",
    },
    ModelSpec {
        name: "gemini-1.5-pro",
        label: "Gemini 1.5 Pro",
        provider: "Google Generative AI",
    },
    ModelSpec {
        name: "claude-3-5-sonnet-20240620",
        label: "Claude 3.5 Sonnet",
        provider: "Anthropic",
    },
    ModelSpec {
        name: "gpt-4o",
        label: "GPT-4o",
        provider: "OpenAI",
    },
    ModelSpec {
        name: "gpt-4o-mini",
        label: "GPT-4o Mini",
        provider: "OpenAI",
    },
];

lazy_static! {
    static ref MODEL_TAG: Regex = Regex::new(r"^\[Model: (.*?)\]\n\n").unwrap();
}

/// The tag prefixed to every outgoing user message
pub fn model_tag(model: &str) -> String {
    format!("[Model: {}]\n\n", model)
}

pub fn lookup(name: &str) -> Option<&'static ModelSpec> {
    MODEL_LIST.iter().find(|spec| spec.name == name)
}

/// Split a message into its model tag and the remaining content, if the
/// message carries one
pub fn parse_model_tag(content: &str) -> Option<(&str, &str)> {
    let captures = MODEL_TAG.captures(content)?;
    let tag = captures.get(0)?;
    let model = captures.get(1)?.as_str();
    Some((model, &content[tag.end()..]))
}
