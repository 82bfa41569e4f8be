//! Remote embedding over an OpenAI-compatible `/embeddings` endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::{l2_normalize, EmbedError, Vectorizer};

/// Calls `POST {url}` with `{"model": ..., "input": [text]}` and a bearer
/// key, then L2-normalizes the returned vector locally so the store never
/// depends on the provider's normalization behavior.
pub struct RemoteVectorizer {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

impl RemoteVectorizer {
    pub fn new(url: String, api_key: Option<String>, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl Vectorizer for RemoteVectorizer {
    async fn vectorize(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let body = serde_json::json!({
            "model": self.model,
            "input": [text],
        });

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| EmbedError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EmbedError::Api(format!("{status}: {detail}")));
        }

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| EmbedError::Api(e.to_string()))?;

        let mut vector = parsed
            .data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .ok_or_else(|| EmbedError::Api("response carried no embedding".into()))?;

        if vector.is_empty() {
            return Err(EmbedError::Api("provider returned an empty vector".into()));
        }

        debug!(model = %self.model, dim = vector.len(), "remote embedding received");
        l2_normalize(&mut vector);
        Ok(vector)
    }

    /// Remote dimension is unknown until the first response; report 0.
    fn dimension(&self) -> usize {
        0
    }
}
