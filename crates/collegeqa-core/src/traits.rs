use crate::error::Result;
use crate::types::{BackendKind, SearchHit};

/// Text embedding backend.
///
/// Implementations must be deterministic for identical input within one
/// loaded model and return vectors of exactly `dim()` components.
pub trait Embedder: Send + Sync {
    /// Stable identifier for the model (e.g. `bge-m3:d1024`).
    fn embedder_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    fn embed_one(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector"))
    }
}

impl<T: Embedder + ?Sized> Embedder for Box<T> {
    fn embedder_id(&self) -> &str { (**self).embedder_id() }
    fn dim(&self) -> usize { (**self).dim() }
    fn max_len(&self) -> usize { (**self).max_len() }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> { (**self).embed_batch(texts) }
}

/// Ranked search over a corpus built once and never mutated.
///
/// Hits are ordered by descending score with ties broken by corpus order, and
/// hold at most `min(k, len())` entries. The query has already been checked
/// for emptiness by the caller.
pub trait Retriever: Send + Sync {
    fn backend(&self) -> BackendKind;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool { self.len() == 0 }
    fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>>;
}

/// Sort `(doc, score)` pairs by descending score, keeping corpus order for
/// ties, and keep the first `k`.
pub fn rank_top_k(mut scored: Vec<(usize, f32)>, k: usize) -> Vec<(usize, f32)> {
    for (_, s) in &mut scored {
        // NaN and -0.0 both rank as 0 so total_cmp never splits equal scores
        if s.is_nan() || *s == 0.0 { *s = 0.0; }
    }
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(k);
    scored
}
