//! Anthropic Messages API client, shared by field extraction, article
//! generation, and reverse name lookup.

pub(crate) mod client;
pub(crate) mod types;

pub use client::{ClaudeClient, ClaudeError};
