//! Cloudflare Vectorize index client.
//!
//! Speaks the Vectorize v2 REST API. Upserts are NDJSON batches; queries
//! return ranked matches with optional metadata.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::errors::PipelineError;
use super::{IndexedUnit, QueryMatch, UnitMetadata, VectorIndex};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct VectorizeIndex {
    api_base: String,
    account_id: String,
    api_token: String,
    index_name: String,
    client: Client,
}

impl VectorizeIndex {
    pub fn new(config: &AppConfig) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(PipelineError::index)?;

        Ok(Self {
            api_base: config.cloudflare.api_base.trim_end_matches('/').to_string(),
            account_id: config.cloudflare.account_id.clone(),
            api_token: config.cloudflare.api_token.clone(),
            index_name: config.cloudflare.vectorize_index.clone(),
            client,
        })
    }

    fn endpoint(&self, op: &str) -> String {
        format!(
            "{}/accounts/{}/vectorize/v2/indexes/{}/{}",
            self.api_base, self.account_id, self.index_name, op
        )
    }

    async fn check(&self, res: reqwest::Response) -> Result<Value, PipelineError> {
        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(PipelineError::IndexUnavailable(format!(
                "Vectorize returned {}: {}",
                status, text
            )));
        }
        res.json::<Value>().await.map_err(PipelineError::index)
    }
}

#[async_trait]
impl VectorIndex for VectorizeIndex {
    async fn upsert(&self, units: Vec<IndexedUnit>) -> Result<(), PipelineError> {
        // Vectorize expects one JSON record per line.
        let mut body = String::new();
        for unit in &units {
            let line = serde_json::to_string(unit).map_err(PipelineError::index)?;
            body.push_str(&line);
            body.push('\n');
        }

        let res = self
            .client
            .post(self.endpoint("upsert"))
            .bearer_auth(&self.api_token)
            .header("content-type", "application/x-ndjson")
            .body(body)
            .send()
            .await
            .map_err(PipelineError::index)?;

        self.check(res).await?;
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        with_metadata: bool,
    ) -> Result<Vec<QueryMatch>, PipelineError> {
        let body = json!({
            "vector": vector,
            "topK": top_k,
            "returnValues": false,
            "returnMetadata": if with_metadata { "all" } else { "none" },
        });

        let res = self
            .client
            .post(self.endpoint("query"))
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(PipelineError::index)?;

        let payload = self.check(res).await?;
        let matches = payload["result"]["matches"]
            .as_array()
            .cloned()
            .unwrap_or_default();

        Ok(matches
            .into_iter()
            .filter_map(|m| {
                let id = m["id"].as_str()?.to_string();
                let score = m["score"].as_f64()?;
                let metadata = m
                    .get("metadata")
                    .and_then(|v| serde_json::from_value::<UnitMetadata>(v.clone()).ok());
                Some(QueryMatch { id, score, metadata })
            })
            .collect())
    }

    async fn delete(&self, id: &str) -> Result<(), PipelineError> {
        let body = json!({ "ids": [id] });

        let res = self
            .client
            .post(self.endpoint("delete_by_ids"))
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(PipelineError::index)?;

        // Deleting ids that do not exist succeeds with zero mutations.
        self.check(res).await?;
        Ok(())
    }
}
