use thiserror::Error;

/// Failure taxonomy for the chat core.
///
/// Construction errors indicate an integration bug and are returned
/// immediately from constructors. Send-path errors are recovered locally by
/// the orchestrator: logged, surfaced once to the user, never retried.
/// Channel errors arrive through the channel's event stream and leave the
/// conversation untouched.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Invalid conversation: {0}")]
    InvalidConversation(String),

    #[error("Workspace save failed: {0}")]
    Workspace(String),

    #[error("Dispatch failed: {0}")]
    Dispatch(String),

    #[error("History persistence failed: {0}")]
    Persistence(String),

    #[error("Channel error: {0}")]
    Channel(String),
}

pub type ChatResult<T> = Result<T, ChatError>;
