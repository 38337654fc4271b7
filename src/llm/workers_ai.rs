use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::errors::PipelineError;
use super::provider::LlmProvider;
use super::types::ChatRequest;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Cloudflare Workers AI provider.
///
/// Both capabilities go through `POST /accounts/{account}/ai/run/{model}`:
/// the embedding model returns `{ result: { data: [[f32; D]] } }` and the
/// chat model returns `{ result: { response: string } }`.
#[derive(Clone)]
pub struct WorkersAiProvider {
    api_base: String,
    account_id: String,
    api_token: String,
    embedding_model: String,
    chat_model: String,
    client: Client,
}

impl WorkersAiProvider {
    pub fn new(config: &AppConfig) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(PipelineError::embedding)?;

        Ok(Self {
            api_base: config.cloudflare.api_base.trim_end_matches('/').to_string(),
            account_id: config.cloudflare.account_id.clone(),
            api_token: config.cloudflare.api_token.clone(),
            embedding_model: config.embedding_model.clone(),
            chat_model: config.chat_model.clone(),
            client,
        })
    }

    fn run_url(&self, model: &str) -> String {
        format!("{}/accounts/{}/ai/run/{}", self.api_base, self.account_id, model)
    }

    async fn run_model(&self, model: &str, body: Value) -> Result<Value, String> {
        let res = self
            .client
            .post(self.run_url(model))
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(format!("Workers AI returned {}: {}", status, text));
        }

        res.json::<Value>().await.map_err(|e| e.to_string())
    }
}

#[async_trait]
impl LlmProvider for WorkersAiProvider {
    fn name(&self) -> &str {
        "workers_ai"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, PipelineError> {
        if text.trim().is_empty() {
            return Err(PipelineError::EmbeddingUnavailable(
                "cannot embed empty text".to_string(),
            ));
        }

        let payload = self
            .run_model(&self.embedding_model, json!({ "text": text }))
            .await
            .map_err(PipelineError::EmbeddingUnavailable)?;

        let values = payload["result"]["data"][0]
            .as_array()
            .ok_or_else(|| {
                PipelineError::EmbeddingUnavailable("malformed embedding response".to_string())
            })?
            .iter()
            .filter_map(|v| v.as_f64().map(|f| f as f32))
            .collect::<Vec<f32>>();

        if values.is_empty() {
            return Err(PipelineError::EmbeddingUnavailable(
                "embedding response contained no values".to_string(),
            ));
        }

        Ok(values)
    }

    async fn chat(&self, request: ChatRequest) -> Result<String, PipelineError> {
        let mut body = json!({ "messages": request.messages });
        if let Some(obj) = body.as_object_mut() {
            if let Some(t) = request.max_tokens {
                obj.insert("max_tokens".to_string(), json!(t));
            }
            if let Some(t) = request.temperature {
                obj.insert("temperature".to_string(), json!(t));
            }
        }

        let payload = self
            .run_model(&self.chat_model, body)
            .await
            .map_err(PipelineError::GenerationFailed)?;

        payload["result"]["response"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                PipelineError::GenerationFailed("malformed chat response".to_string())
            })
    }
}
