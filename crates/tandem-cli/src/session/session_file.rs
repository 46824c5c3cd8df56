use std::fs::{self, File};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;

use tandem::models::message::Message;
use tandem::persist::HistoryPersister;

pub fn ensure_session_dir() -> Result<PathBuf> {
    let home_dir =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    let session_dir = home_dir.join(".config").join("tandem").join("sessions");

    if !session_dir.exists() {
        fs::create_dir_all(&session_dir)?;
    }

    Ok(session_dir)
}

/// Write the full conversation, one message per line
pub fn persist_messages(session_file: &Path, messages: &[Message]) -> Result<()> {
    let file = File::create(session_file)?; // Create or truncate the file
    let mut writer = io::BufWriter::new(file);

    for message in messages {
        serde_json::to_writer(&mut writer, &message)?;
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn load_messages(session_file: &Path) -> Result<Vec<Message>> {
    let reader = io::BufReader::new(File::open(session_file)?);
    let mut messages = Vec::new();

    for line in reader.lines() {
        messages.push(serde_json::from_str::<Message>(&line?)?);
    }

    Ok(messages)
}

/// History persister backed by a jsonl session file
pub struct FileHistoryPersister {
    path: PathBuf,
}

impl FileHistoryPersister {
    pub fn new(path: PathBuf) -> Self {
        FileHistoryPersister { path }
    }
}

#[async_trait]
impl HistoryPersister for FileHistoryPersister {
    async fn store(&self, messages: &[Message]) -> Result<()> {
        persist_messages(&self.path, messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("session.jsonl");

        let messages = vec![
            Message::user("[Model: gpt-4o]\n\nfix the bug"),
            Message::assistant("On it."),
        ];
        persist_messages(&path, &messages)?;

        let loaded = load_messages(&path)?;
        assert_eq!(messages, loaded);
        Ok(())
    }

    #[test]
    fn test_rewrite_truncates_previous_content() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("session.jsonl");

        persist_messages(&path, &[Message::user("one"), Message::user("two")])?;
        persist_messages(&path, &[Message::user("one")])?;

        let loaded = load_messages(&path)?;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].content, "one");
        Ok(())
    }

    #[test]
    fn test_empty_file_loads_empty_conversation() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("session.jsonl");
        File::create(&path)?;

        assert!(load_messages(&path)?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_persister_stores_through_trait() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("session.jsonl");

        let persister = FileHistoryPersister::new(path.clone());
        persister.store(&[Message::user("hello")]).await?;

        let loaded = load_messages(&path)?;
        assert_eq!(loaded[0].content, "hello");
        Ok(())
    }
}
