//! Pending workspace file modifications and the markup block they are
//! rendered into when attached to an outgoing message.

use serde::{Deserialize, Serialize};

pub const MODIFICATIONS_TAG: &str = "file_modifications";

/// A recorded change to a workspace file that has not yet been included in
/// any sent message's context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileModification {
    pub path: String,
    pub diff: String,
}

impl FileModification {
    pub fn new<P: Into<String>, D: Into<String>>(path: P, diff: D) -> Self {
        FileModification {
            path: path.into(),
            diff: diff.into(),
        }
    }
}

/// Render pending modifications as a markup block. Pure and deterministic;
/// an empty slice renders an empty block. Callers that have no modification
/// set at all should skip the block entirely (see [`crate::compose`]).
pub fn format_modifications(modifications: &[FileModification]) -> String {
    let mut out = format!("<{}>\n", MODIFICATIONS_TAG);
    for modification in modifications {
        out.push_str(&format!("<diff path=\"{}\">\n", modification.path));
        out.push_str(&modification.diff);
        if !modification.diff.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("</diff>\n");
    }
    out.push_str(&format!("</{}>", MODIFICATIONS_TAG));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set_renders_empty_block() {
        assert_eq!(
            format_modifications(&[]),
            "<file_modifications>\n</file_modifications>"
        );
    }

    #[test]
    fn test_single_modification() {
        let modifications = vec![FileModification::new("a.ts", "-x\n+y")];
        assert_eq!(
            format_modifications(&modifications),
            "<file_modifications>\n<diff path=\"a.ts\">\n-x\n+y\n</diff>\n</file_modifications>"
        );
    }

    #[test]
    fn test_trailing_newline_not_doubled() {
        let modifications = vec![FileModification::new("a.ts", "-x\n+y\n")];
        assert_eq!(
            format_modifications(&modifications),
            "<file_modifications>\n<diff path=\"a.ts\">\n-x\n+y\n</diff>\n</file_modifications>"
        );
    }

    #[test]
    fn test_multiple_modifications_preserve_order() {
        let modifications = vec![
            FileModification::new("a.ts", "-x"),
            FileModification::new("b.ts", "+y"),
        ];
        let block = format_modifications(&modifications);
        let a = block.find("a.ts").unwrap();
        let b = block.find("b.ts").unwrap();
        assert!(a < b);
        assert_eq!(block.matches("<diff ").count(), 2);
    }
}
