//! tandem is a chat front-end core for an AI-assisted coding tool.
//!
//! The library holds the pieces a chat surface needs behind it: the
//! conversation history, the send orchestration (validate input, save the
//! workspace, attach pending file diffs, dispatch to a completion channel,
//! persist), and trait seams for everything the host environment provides
//! (the streaming channel, the history persister, the workspace, and the
//! frontend surface itself).

pub mod catalog;
pub mod channel;
pub mod completion;
pub mod compose;
pub mod diff;
pub mod errors;
pub mod frontend;
pub mod models;
pub mod orchestrator;
pub mod parser;
pub mod persist;
pub mod providers;
pub mod store;
pub mod workspace;
