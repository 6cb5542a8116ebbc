//! Embedding generation behind an opaque batch interface.
//!
//! The production engine wraps fastembed's ONNX runtime with the
//! BGE-small-en-v1.5 model (384 dimensions). The model is loaded once
//! per process, lazily, and shared read-mostly afterwards; indexing and
//! query flows only see the [`Embedder`] trait.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};

use crate::config::EMBED_DIMENSIONS;
use crate::error::{Result, SidecarError};

/// `embed: texts → fixed-length float vectors`. Must be deterministic
/// across calls within a run.
pub trait Embedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()])?;
        vectors
            .pop()
            .ok_or_else(|| SidecarError::Embedding("empty embedding batch".into()))
    }
}

/// fastembed-backed engine. Cheap to construct; the heavy model load
/// happens on first use and is shared process-wide.
pub struct FastEmbedder;

static MODEL: OnceLock<Mutex<TextEmbedding>> = OnceLock::new();

impl FastEmbedder {
    pub fn new() -> Self {
        Self
    }

    /// Model files persist across runs under the user's home directory,
    /// out of the repository tree.
    fn cache_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".memory-sidecar")
            .join("models")
    }

    fn model() -> Result<&'static Mutex<TextEmbedding>> {
        if let Some(model) = MODEL.get() {
            return Ok(model);
        }
        tracing::info!("Loading embedding model (BGE-small-en-v1.5, 384D)");
        let engine = TextEmbedding::try_new(
            TextInitOptions::new(EmbeddingModel::BGESmallENV15)
                .with_cache_dir(Self::cache_dir())
                .with_show_download_progress(false),
        )
        .map_err(|e| SidecarError::Embedding(format!("failed to load model: {e}")))?;
        Ok(MODEL.get_or_init(|| Mutex::new(engine)))
    }
}

impl Default for FastEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for FastEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let mut model = Self::model()?
            .lock()
            .map_err(|e| SidecarError::Embedding(format!("model lock poisoned: {e}")))?;
        let vectors = model
            .embed(texts.to_vec(), None)
            .map_err(|e| SidecarError::Embedding(e.to_string()))?;
        for vector in &vectors {
            if vector.len() != EMBED_DIMENSIONS {
                return Err(SidecarError::Embedding(format!(
                    "model returned {} dimensions, expected {}",
                    vector.len(),
                    EMBED_DIMENSIONS
                )));
            }
        }
        Ok(vectors)
    }
}
