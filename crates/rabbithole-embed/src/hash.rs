//! Deterministic hash-based embedding.
//!
//! Each whitespace token is expanded into a pseudo-random unit-interval
//! vector by repeatedly hashing `token ‖ counter` with SHA-256; token
//! vectors are then mean-pooled and L2-normalized. No semantics, but the
//! full pipeline (fixed dimension, pooling, normalization, determinism)
//! behaves exactly like a real model, which makes it the right backend for
//! tests and for running the service without model files.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::{l2_normalize, EmbedError, Vectorizer};

#[derive(Debug, Clone)]
pub struct HashVectorizer {
    dim: usize,
}

impl HashVectorizer {
    pub fn new(dim: usize) -> Result<Self, EmbedError> {
        if dim == 0 {
            return Err(EmbedError::InvalidDimension(0));
        }
        Ok(Self { dim })
    }

    /// Expand one token into `dim` floats in [0, 1).
    fn token_features(&self, token: &str) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.dim);
        let mut counter: u64 = 0;
        while out.len() < self.dim {
            let mut hasher = Sha256::new();
            hasher.update(token.as_bytes());
            hasher.update(counter.to_le_bytes());
            let digest = hasher.finalize();
            for chunk in digest.chunks_exact(4) {
                if out.len() == self.dim {
                    break;
                }
                let raw = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                out.push((f64::from(raw) / (f64::from(u32::MAX) + 1.0)) as f32);
            }
            counter += 1;
        }
        out
    }
}

#[async_trait]
impl Vectorizer for HashVectorizer {
    async fn vectorize(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();

        // Mean-pool the per-token features; an empty text pools the text
        // itself as a single pseudo-token so the output stays well-defined.
        let mut pooled = vec![0.0f32; self.dim];
        if tokens.is_empty() {
            pooled = self.token_features(text);
        } else {
            for token in &tokens {
                for (acc, value) in pooled.iter_mut().zip(self.token_features(token)) {
                    *acc += value;
                }
            }
            let count = tokens.len() as f32;
            for value in pooled.iter_mut() {
                *value /= count;
            }
        }

        l2_normalize(&mut pooled);
        Ok(pooled)
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}
