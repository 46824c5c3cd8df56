//! The workspace collaborator: file saving and the pending-modification set
//! shared between the orchestrator and whatever edits files.

use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use crate::diff::FileModification;

#[async_trait]
pub trait Workspace: Send + Sync {
    /// Flush unsaved file buffers before a send.
    async fn save_all_files(&self) -> Result<()>;

    /// Capture the pending modification set and clear it in one step, so an
    /// edit landing mid-send is neither lost nor double-counted. Returns
    /// `None` when nothing was recorded since the last reset.
    fn take_modifications(&self) -> Option<Vec<FileModification>>;

    fn reset_modifications(&self);
}

/// In-memory modification tracker. Edit actions call [`FileTracker::record`]
/// as they touch files; the last recorded diff per path wins.
#[derive(Default)]
pub struct FileTracker {
    modifications: Mutex<BTreeMap<String, String>>,
}

impl FileTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record<P: Into<String>, D: Into<String>>(&self, path: P, diff: D) {
        self.modifications
            .lock()
            .unwrap()
            .insert(path.into(), diff.into());
    }

    pub fn is_dirty(&self) -> bool {
        !self.modifications.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl Workspace for FileTracker {
    async fn save_all_files(&self) -> Result<()> {
        // File buffers live with the editing layer; the tracker only holds
        // the diffs recorded against them.
        Ok(())
    }

    fn take_modifications(&self) -> Option<Vec<FileModification>> {
        let mut modifications = self.modifications.lock().unwrap();
        if modifications.is_empty() {
            return None;
        }
        let captured = std::mem::take(&mut *modifications)
            .into_iter()
            .map(|(path, diff)| FileModification::new(path, diff))
            .collect();
        Some(captured)
    }

    fn reset_modifications(&self) {
        self.modifications.lock().unwrap().clear();
    }
}
