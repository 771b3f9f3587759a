//! Embedding model seam and the Model2Vec backend

use crate::error::{Result, SkillMatchError};
use anyhow::Context;
use log::info;
use model2vec_rs::model::StaticModel;
use std::path::Path;
use std::time::Instant;

/// A dense vector produced by an embedding model.
pub type Embedding = Vec<f32>;

/// Text embedding model used by the skill matcher.
pub trait Embedder {
    /// Identity of the model. Also the namespace of its persistent cache.
    fn model_name(&self) -> &str;

    /// Encode all texts in a single batched call, one vector per input, in order.
    fn encode_batch(&mut self, texts: &[String]) -> Result<Vec<Embedding>>;
}

/// Static Model2Vec embeddings, loaded from a local folder or the HuggingFace Hub.
pub struct Model2VecEmbedder {
    model: StaticModel,
    model_name: String,
}

impl Model2VecEmbedder {
    /// `model_name` is either a local model directory or a Hub repo id.
    pub fn load(model_name: &str) -> Result<Self> {
        let start_time = Instant::now();
        info!("Loading Model2Vec embedding model: {}", model_name);

        let model = StaticModel::from_pretrained(Path::new(model_name), None, None, None)
            .with_context(|| format!("Failed to load model '{}'", model_name))?;

        info!("Model loaded in {:.2?}", start_time.elapsed());

        Ok(Self {
            model,
            model_name: model_name.to_string(),
        })
    }
}

impl Embedder for Model2VecEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn encode_batch(&mut self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self.model.encode(texts);
        if embeddings.len() != texts.len() {
            return Err(SkillMatchError::Embedding(format!(
                "Model returned {} embeddings for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }
        Ok(embeddings)
    }
}
