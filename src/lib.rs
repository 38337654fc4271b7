//! Retrieval-augmented chat backend.
//!
//! Ingests free-text documents, splits them into chunks, embeds each chunk
//! into a fixed-dimension vector space and stores it in a similarity index.
//! At query time the most relevant chunks ground a generated conversational
//! answer with ranked citations.
//!
//! The core pipeline lives in [`rag`]; the embedding/generation models and
//! the vector index are consumed through the [`llm`] and [`index`] trait
//! contracts. Everything under [`server`] is thin HTTP glue.

pub mod chunker;
pub mod config;
pub mod errors;
pub mod index;
pub mod llm;
pub mod logging;
pub mod rag;
pub mod server;
pub mod state;
