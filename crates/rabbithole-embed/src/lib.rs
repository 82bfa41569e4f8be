//! # rabbithole-embed
//!
//! Turns an accepted sentence into a fixed-length semantic vector.
//!
//! Every backend honors the same contract: the returned vector is
//! mean-pooled across token positions, L2-normalized (a zero norm is
//! treated as 1), and deterministic for a fixed (text, model) pair.
//!
//! Backends:
//! - [`HashVectorizer`]   — deterministic SHA-256 token hashing; no model
//!   files, no network. The default, and what the test suite runs against.
//! - [`RemoteVectorizer`] — OpenAI-compatible embeddings endpoint.
//! - `OnnxVectorizer`     — local transformer inference (`onnx` feature).

use async_trait::async_trait;
use thiserror::Error;

pub mod hash;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod remote;

pub use hash::HashVectorizer;
#[cfg(feature = "onnx")]
pub use onnx::OnnxVectorizer;
pub use remote::RemoteVectorizer;

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("invalid embedding dimension: {0}")]
    InvalidDimension(usize),

    #[error("embedding request failed: {0}")]
    Http(String),

    #[error("embedding API error: {0}")]
    Api(String),

    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    #[error("inference error: {0}")]
    Inference(String),

    #[error("backend unavailable: {0}")]
    Backend(String),
}

/// A black-box text → vector capability.
#[async_trait]
pub trait Vectorizer: Send + Sync {
    /// Embed one text into a mean-pooled, L2-normalized vector.
    async fn vectorize(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    /// Vector length, fixed for the process lifetime. Backends that only
    /// learn the dimension from their first response report 0.
    fn dimension(&self) -> usize;
}

/// Divide by the Euclidean norm in place; a zero norm is treated as 1.
pub(crate) fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x = (f64::from(*x) / norm) as f32;
        }
    }
}

/// Build the backend selected by `RABBITHOLE_EMBED_BACKEND`
/// (`hash` | `remote` | `onnx`, default `hash`).
pub fn from_env() -> Result<Box<dyn Vectorizer>, EmbedError> {
    let backend = std::env::var("RABBITHOLE_EMBED_BACKEND").unwrap_or_else(|_| "hash".into());
    match backend.to_lowercase().as_str() {
        "hash" => {
            let dim = std::env::var("RABBITHOLE_EMBED_DIM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(384);
            Ok(Box::new(HashVectorizer::new(dim)?))
        }
        "remote" => {
            let url = std::env::var("RABBITHOLE_EMBED_URL")
                .map_err(|_| EmbedError::Backend("RABBITHOLE_EMBED_URL is not set".into()))?;
            let api_key = std::env::var("RABBITHOLE_EMBED_API_KEY").ok();
            let model = std::env::var("RABBITHOLE_EMBED_MODEL")
                .unwrap_or_else(|_| "all-MiniLM-L6-v2".into());
            Ok(Box::new(RemoteVectorizer::new(url, api_key, model)))
        }
        #[cfg(feature = "onnx")]
        "onnx" => {
            let model = std::env::var("RABBITHOLE_ONNX_MODEL")
                .map_err(|_| EmbedError::Backend("RABBITHOLE_ONNX_MODEL is not set".into()))?;
            let tokenizer = std::env::var("RABBITHOLE_ONNX_TOKENIZER")
                .map_err(|_| EmbedError::Backend("RABBITHOLE_ONNX_TOKENIZER is not set".into()))?;
            Ok(Box::new(OnnxVectorizer::new(&model, &tokenizer)?))
        }
        #[cfg(not(feature = "onnx"))]
        "onnx" => Err(EmbedError::Backend(
            "built without the `onnx` feature".into(),
        )),
        other => Err(EmbedError::Backend(format!(
            "unknown embed backend: {other}"
        ))),
    }
}
