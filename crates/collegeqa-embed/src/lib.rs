//! Embedding backends for collegeqa.
//!
//! [`get_default_embedder`] picks the BGE-M3 model from a local directory, or
//! the deterministic [`HashEmbedder`] when `APP_USE_FAKE_EMBEDDINGS=1` or
//! `embedding.use_fake = true`. Loading failures are returned, not hidden:
//! the retrieval engine decides whether to degrade.

use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};

use collegeqa_core::config::{expand_path, EmbeddingSettings};
use collegeqa_core::traits::Embedder;

pub mod device;
pub mod hash;
pub mod model;
pub mod pool;
pub mod tokenize;

pub use hash::HashEmbedder;
pub use model::BgeM3Embedder;
pub use pool::masked_mean_l2;

pub const FAKE_DIM: usize = 1024;

pub fn fake_embeddings_requested() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

pub fn get_default_embedder(settings: &EmbeddingSettings) -> Result<Box<dyn Embedder>> {
    if settings.use_fake || fake_embeddings_requested() {
        tracing::info!("using HashEmbedder");
        return Ok(Box::new(HashEmbedder::new(FAKE_DIM)));
    }
    let model_dir = resolve_model_dir(settings.model_dir.as_deref())?;
    Ok(Box::new(BgeM3Embedder::load(&model_dir, settings.max_len)?))
}

/// Model directory precedence: configured path, `APP_MODEL_DIR`, `MODEL_DIR`,
/// then `../models/bge-m3` and `models/bge-m3`.
pub fn resolve_model_dir(configured: Option<&str>) -> Result<PathBuf> {
    let candidates = configured
        .map(expand_path)
        .into_iter()
        .chain(std::env::var("APP_MODEL_DIR").ok().map(PathBuf::from))
        .chain(std::env::var("MODEL_DIR").ok().map(PathBuf::from))
        .chain([Path::new("../models/bge-m3").to_path_buf(), Path::new("models/bge-m3").to_path_buf()]);
    for p in candidates {
        if p.exists() { tracing::info!(dir = %p.display(), "using model dir"); return Ok(p); }
    }
    Err(anyhow!("Could not locate BGE-M3 model directory"))
}
