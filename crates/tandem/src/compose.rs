//! Builds the outgoing message content from the raw user text, the active
//! model, and any pending file modifications.

use crate::catalog::model_tag;
use crate::diff::{format_modifications, FileModification};

/// Compose the content of an outgoing user message.
///
/// The model tag always comes first. The diff block is inserted whenever a
/// modification set is present, even an empty one; `None` means the
/// workspace had nothing to report and the block is skipped entirely.
pub fn compose(raw: &str, model: &str, modifications: Option<&[FileModification]>) -> String {
    match modifications {
        Some(modifications) => format!(
            "{}{}\n\n{}",
            model_tag(model),
            format_modifications(modifications),
            raw
        ),
        None => format!("{}{}", model_tag(model), raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::MODIFICATIONS_TAG;

    #[test]
    fn test_no_modifications() {
        let content = compose("fix the bug", "gpt-4o", None);
        assert_eq!(content, "[Model: gpt-4o]\n\nfix the bug");
        assert!(!content.contains(MODIFICATIONS_TAG));
    }

    #[test]
    fn test_defined_but_empty_set_still_embeds_a_block() {
        let content = compose("fix the bug", "gpt-4o", Some(&[]));
        assert_eq!(
            content,
            "[Model: gpt-4o]\n\n<file_modifications>\n</file_modifications>\n\nfix the bug"
        );
    }

    #[test]
    fn test_diff_block_sits_between_tag_and_raw_text() {
        let modifications = vec![FileModification::new("a.ts", "-x\n+y")];
        let content = compose("fix the bug", "gpt-4o", Some(&modifications));
        assert_eq!(
            content,
            format!(
                "[Model: gpt-4o]\n\n{}\n\nfix the bug",
                format_modifications(&modifications)
            )
        );
        // Exactly one diff block
        assert_eq!(
            content.matches(&format!("<{}>", MODIFICATIONS_TAG)).count(),
            1
        );
    }

    #[test]
    fn test_model_selection_flows_into_tag() {
        let content = compose("hello", "claude-3-5-sonnet-20240620", None);
        assert!(content.starts_with("[Model: claude-3-5-sonnet-20240620]\n\n"));
    }
}
