//! Derives the display form of streamed assistant content: the model tag and
//! any embedded file-modification block are stripped before rendering.

use crate::catalog;
use crate::diff::MODIFICATIONS_TAG;
use crate::models::message::Message;
use crate::models::role::Role;

/// Produce one parsed entry per message, index-aligned with the input.
/// User positions get empty strings; they are passed through unmodified at
/// display time (see [`crate::store::ConversationStore::display_messages`]).
pub fn parse_messages(messages: &[Message]) -> Vec<String> {
    messages
        .iter()
        .map(|message| match message.role {
            Role::User => String::new(),
            Role::Assistant => sanitize(&message.content),
        })
        .collect()
}

fn sanitize(content: &str) -> String {
    let rest = match catalog::parse_model_tag(content) {
        Some((_, rest)) => rest,
        None => content,
    };
    strip_modifications_block(rest).trim().to_string()
}

fn strip_modifications_block(content: &str) -> String {
    let open = format!("<{}>", MODIFICATIONS_TAG);
    let close = format!("</{}>", MODIFICATIONS_TAG);

    let Some(start) = content.find(&open) else {
        return content.to_string();
    };
    let Some(end) = content[start..].find(&close) else {
        return content.to_string();
    };

    let mut out = String::with_capacity(content.len());
    out.push_str(&content[..start]);
    out.push_str(&content[start + end + close.len()..]);
    out
}
