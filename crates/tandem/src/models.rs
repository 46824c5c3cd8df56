//! The objects passed between the chat surface, the orchestrator, and the
//! completion channel. Messages are immutable once created; any display-time
//! rewriting produces a derived copy (see [`crate::store`] and
//! [`crate::parser`]).

pub mod message;
pub mod role;
