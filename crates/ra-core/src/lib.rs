//! ra-core: Core types and traits for research-assistant
//!
//! This crate provides the foundational types shared by every stage of the
//! research pipeline: the error taxonomy, chat messages, and the `Provider`
//! abstraction over chat-completion endpoints.

pub mod error;
pub mod message;
pub mod provider;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::Error;
pub use message::{Message, Role, StreamChunk, Usage};
pub use provider::{CompletionRequest, CompletionResponse, FinishReason, Provider, StreamResult};

pub type Result<T> = std::result::Result<T, Error>;
