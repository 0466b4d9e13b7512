//! Sentence embeddings using Model2Vec

use crate::config::Config;
use crate::error::{Result, ResumeScorerError};
use log::{debug, info};
use model2vec_rs::model::StaticModel;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

/// Anything that can turn a list of texts into one vector per text
pub trait SentenceEncoder {
    fn encode(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn model_name(&self) -> &str;
}

pub struct EmbeddingEngine {
    model: StaticModel,
    batch_size: usize,
    enable_caching: bool,
    cache: HashMap<String, Vec<f32>>,
    model_name: String,
    cache_hits: usize,
    cache_misses: usize,
}

#[derive(Debug, Clone)]
pub struct CacheStats {
    pub cache_size: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub model_name: String,
    pub batch_size: usize,
}

impl EmbeddingEngine {
    /// Load a Model2Vec model from a local model directory
    pub fn load(model_path: &Path, model_name: &str, config: &Config) -> Result<Self> {
        let start_time = Instant::now();
        info!("Loading Model2Vec embedding model from: {}", model_path.display());

        let model = StaticModel::from_pretrained(
            model_path,
            None, // token
            None, // normalize
            None, // subfolder
        )
        .map_err(|e| ResumeScorerError::Embedding(format!("Failed to load model: {}", e)))?;

        info!("Model loaded in {:.2?}", start_time.elapsed());

        Ok(Self {
            model,
            batch_size: config.processing.batch_size.max(1),
            enable_caching: config.processing.enable_caching,
            cache: HashMap::new(),
            model_name: model_name.to_string(),
            cache_hits: 0,
            cache_misses: 0,
        })
    }

    fn encode_batch(&mut self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        if !self.enable_caching {
            return Ok(self.model.encode(batch));
        }

        let uncached: Vec<String> = batch
            .iter()
            .filter(|text| !self.cache.contains_key(*text))
            .cloned()
            .collect();

        self.cache_hits += batch.len() - uncached.len();
        self.cache_misses += uncached.len();

        if !uncached.is_empty() {
            let embeddings = self.model.encode(&uncached);
            if embeddings.len() != uncached.len() {
                return Err(ResumeScorerError::Embedding(format!(
                    "Model returned {} embeddings for {} texts",
                    embeddings.len(),
                    uncached.len()
                )));
            }
            for (text, embedding) in uncached.into_iter().zip(embeddings) {
                self.cache.insert(text, embedding);
            }
        }

        batch
            .iter()
            .map(|text| {
                self.cache.get(text).cloned().ok_or_else(|| {
                    ResumeScorerError::Embedding(format!("Missing embedding for '{}'", text))
                })
            })
            .collect()
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            cache_size: self.cache.len(),
            cache_hits: self.cache_hits,
            cache_misses: self.cache_misses,
            model_name: self.model_name.clone(),
            batch_size: self.batch_size,
        }
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

impl SentenceEncoder for EmbeddingEngine {
    fn encode(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let start_time = Instant::now();
        let mut results = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            results.extend(self.encode_batch(batch)?);
        }

        if results.len() != texts.len() {
            return Err(ResumeScorerError::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                results.len()
            )));
        }

        debug!("Encoded {} texts in {:.2?}", texts.len(), start_time.elapsed());
        Ok(results)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
