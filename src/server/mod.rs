//! Thin HTTP glue over the retrieval core.

pub mod handlers;
pub mod router;
