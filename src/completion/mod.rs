//! Outbound client for the external LLM completion API.

mod client;

pub use client::{CompletionClient, CompletionError};
