//! Grounded answer composition.
//!
//! Embeds the query, retrieves grounding context, assembles the generation
//! prompt with a bounded slice of conversation history, and attaches
//! ranked citations to the response.

use std::sync::Arc;

use serde::Serialize;

use crate::config::AppConfig;
use crate::errors::PipelineError;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};
use super::retriever::{RetrievedMatch, Retriever};

/// How many characters of a match survive into its citation excerpt.
const CITATION_EXCERPT_LEN: usize = 150;

const UNGROUNDED_PROMPT: &str = "You are a helpful AI assistant. \
    Provide a helpful response based on your general knowledge.";

/// A ranked, truncated excerpt shown alongside the answer. The field set
/// is a deployed wire contract: exactly `text`, `score`, `source`.
#[derive(Debug, Clone, Serialize)]
pub struct Citation {
    pub text: String,
    pub score: f64,
    pub source: String,
}

#[derive(Debug, Serialize)]
pub struct ChatOutcome {
    pub response: String,
    pub sources: Vec<Citation>,
    pub context_used: bool,
}

pub struct AnswerComposer {
    llm: Arc<dyn LlmProvider>,
    retriever: Retriever,
    config: Arc<AppConfig>,
}

impl AnswerComposer {
    pub fn new(llm: Arc<dyn LlmProvider>, retriever: Retriever, config: Arc<AppConfig>) -> Self {
        Self {
            llm,
            retriever,
            config,
        }
    }

    /// Answer `query` grounded in retrieved context.
    ///
    /// Query embedding failure is fatal: there is no retrieval without a
    /// query vector, so no generation call is made. Generation failure
    /// propagates with no partial response. History beyond the configured
    /// window is silently dropped to bound prompt size.
    pub async fn answer(
        &self,
        query: &str,
        history: &[ChatMessage],
    ) -> Result<ChatOutcome, PipelineError> {
        if query.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "message is required and must be non-empty".to_string(),
            ));
        }

        let query_vector = self.llm.embed(query).await?;
        let matches = self.retriever.retrieve(&query_vector).await?;

        let context = matches
            .iter()
            .map(|m| m.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let system_prompt = if context.is_empty() {
            UNGROUNDED_PROMPT.to_string()
        } else {
            format!(
                "You are a helpful AI assistant. Use the following context to answer questions:\n\n\
                 Context:\n{}\n\n\
                 Answer based on the context when relevant, but also provide helpful general responses.",
                context
            )
        };

        let window_start = history.len().saturating_sub(self.config.history_window);
        let mut messages = Vec::with_capacity(self.config.history_window + 2);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend(history[window_start..].iter().cloned());
        messages.push(ChatMessage::user(query));

        let request = ChatRequest {
            messages,
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
        };
        let response = self.llm.chat(request).await?;

        let sources = matches
            .iter()
            .take(self.config.max_sources)
            .map(citation)
            .collect();

        Ok(ChatOutcome {
            response,
            sources,
            context_used: !matches.is_empty(),
        })
    }
}

fn citation(m: &RetrievedMatch) -> Citation {
    let excerpt: String = m.text.chars().take(CITATION_EXCERPT_LEN).collect();
    Citation {
        text: format!("{}...", excerpt),
        score: (m.score * 100.0).round() / 100.0,
        source: if m.source.is_empty() {
            "Unknown".to_string()
        } else {
            m.source.clone()
        },
    }
}
