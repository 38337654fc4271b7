//! Model collaborators: embedding and chat generation.
//!
//! The pipeline consumes both capabilities through the [`LlmProvider`]
//! trait; `WorkersAiProvider` is the production implementation backed by
//! the Cloudflare Workers AI REST API.

mod provider;
mod types;
mod workers_ai;

pub use provider::LlmProvider;
pub use types::{ChatMessage, ChatRequest};
pub use workers_ai::WorkersAiProvider;
