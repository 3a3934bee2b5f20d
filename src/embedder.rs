//! Embedder Contract: a batched text→vector producer the core depends
//! on only through the [`Embedder`] trait object, never a concrete model
//! runtime.

use crate::error::{CoreError, Result};
use async_trait::async_trait;

/// Batched text→vector producer with a single fixed output dimension.
/// Implementations should honor `max_batch_size`-sized calls from the core;
/// the core falls back to per-item calls if a batch call fails.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn dimension(&self) -> usize;
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Deterministic, dependency-free embedder used by default and by the whole
/// test suite: hashes n-grams of the input into a fixed-width, sign-folded,
/// L2-normalized bucket vector. Not semantically meaningful beyond lexical
/// overlap, but stable and fast, so the crate builds and tests end-to-end
/// without a model file or network call.
pub struct HashEmbedder {
    dimension: usize,
    ngram: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension, ngram: 3 }
    }

    fn hash_bucket(&self, gram: &str) -> (usize, f32) {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        use std::hash::{Hash, Hasher};
        gram.hash(&mut hasher);
        let h = hasher.finish();
        let bucket = (h as usize) % self.dimension;
        let sign = if (h >> 63) & 1 == 0 { 1.0 } else { -1.0 };
        (bucket, sign)
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        let normalized = text.to_lowercase();
        let chars: Vec<char> = normalized.chars().filter(|c| !c.is_whitespace() || *c == ' ').collect();
        if chars.len() < self.ngram {
            let (bucket, sign) = self.hash_bucket(&normalized);
            vector[bucket] += sign;
        } else {
            for window in chars.windows(self.ngram) {
                let gram: String = window.iter().collect();
                let (bucket, sign) = self.hash_bucket(&gram);
                vector[bucket] += sign;
            }
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_one(text))
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

#[cfg(feature = "onnx-embedder")]
pub mod ort_embedder {
    //! Wraps a local ONNX sentence-embedding model via `ort` + `tokenizers`.
    //! Not exercised by the test suite: fetching a model file is an
    //! operational concern outside this crate's scope.

    use super::*;
    use ndarray::Axis;
    use ort::session::{builder::GraphOptimizationLevel, Session};
    use ort::value::Tensor;
    use parking_lot::Mutex;
    use std::path::Path;
    use tokenizers::Tokenizer;

    pub struct OrtEmbedder {
        session: Mutex<Session>,
        tokenizer: Tokenizer,
        dimension: usize,
    }

    impl OrtEmbedder {
        pub fn new(model_path: impl AsRef<Path>, tokenizer_path: impl AsRef<Path>, dimension: usize) -> Result<Self> {
            let mut tokenizer = Tokenizer::from_file(tokenizer_path.as_ref())
                .map_err(|e| CoreError::Embedding(format!("failed to load tokenizer: {e}")))?;
            tokenizer
                .with_padding(Some(tokenizers::PaddingParams {
                    strategy: tokenizers::PaddingStrategy::BatchLongest,
                    ..Default::default()
                }))
                .with_truncation(Some(tokenizers::TruncationParams {
                    max_length: 512,
                    ..Default::default()
                }))
                .map_err(|e| CoreError::Embedding(format!("failed to configure tokenizer: {e}")))?;

            let session = Session::builder()
                .map_err(|e| CoreError::Embedding(e.to_string()))?
                .with_optimization_level(GraphOptimizationLevel::Level3)
                .map_err(|e| CoreError::Embedding(e.to_string()))?
                .commit_from_file(model_path.as_ref())
                .map_err(|e| CoreError::Embedding(format!("failed to load onnx model: {e}")))?;

            Ok(Self {
                session: Mutex::new(session),
                tokenizer,
                dimension,
            })
        }

        fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }
            let encodings = self
                .tokenizer
                .encode_batch(texts.to_vec(), true)
                .map_err(|e| CoreError::Embedding(format!("tokenization failed: {e}")))?;
            let batch_size = encodings.len();
            let seq_length = encodings[0].len();

            let mut input_ids = Vec::with_capacity(batch_size * seq_length);
            let mut attention_mask = Vec::with_capacity(batch_size * seq_length);
            let mut token_type_ids = Vec::with_capacity(batch_size * seq_length);
            for encoding in &encodings {
                input_ids.extend(encoding.get_ids().iter().map(|&id| id as i64));
                attention_mask.extend(encoding.get_attention_mask().iter().map(|&m| m as i64));
                token_type_ids.extend(encoding.get_type_ids().iter().map(|&t| t as i64));
            }

            let input_ids = ndarray::Array2::from_shape_vec((batch_size, seq_length), input_ids)
                .map_err(|e| CoreError::Embedding(e.to_string()))?;
            let attention_mask = ndarray::Array2::from_shape_vec((batch_size, seq_length), attention_mask)
                .map_err(|e| CoreError::Embedding(e.to_string()))?;
            let token_type_ids = ndarray::Array2::from_shape_vec((batch_size, seq_length), token_type_ids)
                .map_err(|e| CoreError::Embedding(e.to_string()))?;

            let mut session = self.session.lock();
            let outputs = session
                .run(ort::inputs![
                    "input_ids" => Tensor::from_array(input_ids).map_err(|e| CoreError::Embedding(e.to_string()))?,
                    "attention_mask" => Tensor::from_array(attention_mask).map_err(|e| CoreError::Embedding(e.to_string()))?,
                    "token_type_ids" => Tensor::from_array(token_type_ids).map_err(|e| CoreError::Embedding(e.to_string()))?,
                ])
                .map_err(|e| CoreError::Embedding(format!("onnx inference failed: {e}")))?;

            let array = outputs["last_hidden_state"]
                .try_extract_array::<f32>()
                .map_err(|e| CoreError::Embedding(e.to_string()))?;

            let mut result = Vec::with_capacity(batch_size);
            for i in 0..batch_size {
                let mut embedding: Vec<f32> = array
                    .index_axis(Axis(0), i)
                    .index_axis(Axis(0), 0)
                    .to_owned()
                    .into_raw_vec_and_offset()
                    .0;
                let norm: f32 = embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
                if norm > 0.0 {
                    for v in &mut embedding {
                        *v /= norm;
                    }
                }
                result.push(embedding);
            }
            Ok(result)
        }
    }

    #[async_trait]
    impl Embedder for OrtEmbedder {
        fn dimension(&self) -> usize {
            self.dimension
        }

        async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
            let batch = self.encode_batch(std::slice::from_ref(&text.to_string()))?;
            batch.into_iter().next().ok_or_else(|| CoreError::Embedding("no embedding produced".into()))
        }

        async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.encode_batch(texts)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_text_yields_same_embedding() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed_query("fn add(a: i32, b: i32) -> i32").await.unwrap();
        let b = embedder.embed_query("fn add(a: i32, b: i32) -> i32").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn vectors_are_l2_normalized() {
        let embedder = HashEmbedder::new(32);
        let v = embedder.embed_query("something reasonably long to embed").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn different_text_yields_different_embedding() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed_query("class Widget").await.unwrap();
        let b = embedder.embed_query("function totallyDifferentThing").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn embed_documents_matches_embed_query() {
        let embedder = HashEmbedder::new(32);
        let docs = vec!["one".to_string(), "two".to_string()];
        let batch = embedder.embed_documents(&docs).await.unwrap();
        let single = embedder.embed_query("two").await.unwrap();
        assert_eq!(batch[1], single);
    }
}
</content>
