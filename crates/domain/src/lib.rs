//! Shared vocabulary for the Helmsman workspace: the agent event grammar,
//! capability and tool-outcome types, conversation history, the error enum,
//! and configuration.

pub mod capability;
pub mod chat;
pub mod config;
pub mod error;
pub mod event;
