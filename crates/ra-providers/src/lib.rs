//! ra-providers: LLM provider implementations for research-assistant
//!
//! This crate provides implementations of the Provider trait: an
//! OpenAI-compatible chat-completion client and a retrying decorator that
//! adds per-call timeouts and exponential backoff to any provider.

pub mod openai;
pub mod retry;

pub use openai::OpenAIProvider;
pub use retry::{RetryPolicy, RetryProvider};
