//! Local transformer inference via ONNX Runtime.
//!
//! Loads a sentence-encoder ONNX export plus its `tokenizer.json`, runs the
//! encoder, mean-pools the last hidden state under the attention mask, and
//! L2-normalizes. Inputs are matched by name against what the model
//! declares, so exports with or without `token_type_ids` both work.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use ort::session::Session;
use ort::value::Value;
use tokenizers::Tokenizer;
use tracing::info;

use crate::{l2_normalize, EmbedError, Vectorizer};

pub struct OnnxVectorizer {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    /// Hidden size, learned from the first inference (0 until then).
    dim: AtomicUsize,
}

impl OnnxVectorizer {
    pub fn new(model_path: &str, tokenizer_path: &str) -> Result<Self, EmbedError> {
        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| EmbedError::Tokenizer(e.to_string()))?;
        let session = Session::builder()
            .map_err(|e| EmbedError::Inference(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e| EmbedError::Inference(e.to_string()))?;
        info!(model = model_path, "ONNX embedding model loaded");
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            dim: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Vectorizer for OnnxVectorizer {
    async fn vectorize(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| EmbedError::Tokenizer(e.to_string()))?;

        let ids: Vec<i64> = encoding.get_ids().iter().map(|&id| i64::from(id)).collect();
        let mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| i64::from(m))
            .collect();
        let seq_len = ids.len();
        if seq_len == 0 {
            return Err(EmbedError::Tokenizer("empty encoding".into()));
        }

        let mut session = self
            .session
            .lock()
            .map_err(|_| EmbedError::Inference("session lock poisoned".into()))?;

        let input_names: Vec<String> = session.inputs.iter().map(|i| i.name.clone()).collect();
        let mut inputs = Vec::new();
        for name in &input_names {
            let data = match name.as_str() {
                "input_ids" => ids.clone(),
                "attention_mask" => mask.clone(),
                "token_type_ids" => vec![0i64; seq_len],
                other => {
                    return Err(EmbedError::Inference(format!(
                        "model expects unsupported input: {other}"
                    )))
                }
            };
            let value = Value::from_array((vec![1usize, seq_len], data))
                .map_err(|e| EmbedError::Inference(e.to_string()))?;
            inputs.push((name.as_str(), value.into_dyn()));
        }

        let outputs = session
            .run(inputs)
            .map_err(|e| EmbedError::Inference(e.to_string()))?;
        let hidden_state = outputs
            .values()
            .next()
            .ok_or_else(|| EmbedError::Inference("model produced no outputs".into()))?;
        let (shape, data) = hidden_state
            .try_extract_tensor::<f32>()
            .map_err(|e| EmbedError::Inference(e.to_string()))?;

        // Expect [batch=1, seq, hidden].
        let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
        if dims.len() != 3 || dims[0] != 1 || dims[1] != seq_len {
            return Err(EmbedError::Inference(format!(
                "unexpected output shape: {dims:?}"
            )));
        }
        let hidden = dims[2];

        // Masked mean pooling in f64 for accumulation precision.
        let mut pooled = vec![0.0f64; hidden];
        let mut count = 0.0f64;
        for (pos, &m) in mask.iter().enumerate() {
            if m == 1 {
                for (k, acc) in pooled.iter_mut().enumerate() {
                    *acc += f64::from(data[pos * hidden + k]);
                }
                count += 1.0;
            }
        }
        if count > 0.0 {
            for acc in pooled.iter_mut() {
                *acc /= count;
            }
        }

        let mut vector: Vec<f32> = pooled.into_iter().map(|x| x as f32).collect();
        l2_normalize(&mut vector);
        self.dim.store(hidden, Ordering::Relaxed);
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dim.load(Ordering::Relaxed)
    }
}
