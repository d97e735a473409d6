use std::collections::HashSet;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use collegeqa_core::error::{Error, Result};
use collegeqa_core::traits::{Embedder, Retriever};
use collegeqa_core::types::{BackendKind, Corpus, SearchHit};

use crate::cache::EmbeddingCache;
use crate::flat_index::{l2_normalize, FlatIndex};

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub batch_size: usize,
    pub show_progress: bool,
}

impl Default for BuildOptions {
    fn default() -> Self { Self { batch_size: 32, show_progress: false } }
}

/// Cosine-similarity retriever over embedded document questions.
pub struct VectorRetriever {
    embedder: Box<dyn Embedder>,
    index: FlatIndex,
}

impl std::fmt::Debug for VectorRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorRetriever")
            .field("embedder", &self.embedder.embedder_id())
            .field("len", &self.index.len())
            .finish()
    }
}

impl VectorRetriever {
    /// Embed every question of `corpus` and index it.
    ///
    /// Any embedder failure is reported as
    /// [`Error::EmbeddingBackendUnavailable`]; the caller may fall back to
    /// lexical search.
    pub fn build(corpus: &Corpus, embedder: Box<dyn Embedder>, opts: &BuildOptions) -> Result<Self> {
        let dim = embedder.dim();
        if dim == 0 { return Err(Error::EmbeddingBackendUnavailable("embedder reports dimension 0".into())); }
        let mut cache = EmbeddingCache::new(embedder.embedder_id());

        let keys: Vec<String> = corpus.documents().iter().map(|d| cache.key(&d.question)).collect();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut pending: Vec<(String, String)> = Vec::new();
        for (doc, key) in corpus.documents().iter().zip(&keys) {
            if seen.insert(key.as_str()) {
                pending.push((key.clone(), doc.question.clone()));
            }
        }
        info!(documents = corpus.len(), distinct = pending.len(), embedder = embedder.embedder_id(), "embedding corpus");

        let pb = progress_bar(pending.len() as u64, opts.show_progress);
        for batch in pending.chunks(opts.batch_size.max(1)) {
            let texts: Vec<String> = batch.iter().map(|(_, text)| text.clone()).collect();
            let vectors = embedder
                .embed_batch(&texts)
                .map_err(|e| Error::EmbeddingBackendUnavailable(e.to_string()))?;
            if vectors.len() != texts.len() {
                return Err(Error::EmbeddingBackendUnavailable(format!(
                    "embedder returned {} vectors for {} texts",
                    vectors.len(),
                    texts.len()
                )));
            }
            for ((key, _), mut v) in batch.iter().zip(vectors) {
                if v.len() != dim { return Err(Error::DimensionMismatch { expected: dim, found: v.len() }); }
                l2_normalize(&mut v);
                cache.put(key.clone(), v);
            }
            pb.inc(batch.len() as u64);
        }
        pb.finish_and_clear();

        let mut vectors = Vec::with_capacity(keys.len());
        for key in &keys {
            let v = cache.get(key).ok_or_else(|| Error::EmbeddingBackendUnavailable("missing embedding for a corpus question".into()))?;
            vectors.push(v.clone());
        }
        let index = FlatIndex::build(dim, vectors)?;
        debug!(cached = cache.len(), indexed = index.len(), "vector index built");
        Ok(Self { embedder, index })
    }

    pub fn dim(&self) -> usize { self.index.dim() }

    pub fn embedder_id(&self) -> &str { self.embedder.embedder_id() }
}

impl Retriever for VectorRetriever {
    fn backend(&self) -> BackendKind { BackendKind::Vector }

    fn len(&self) -> usize { self.index.len() }

    fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        let mut q = self.embedder.embed_one(query).map_err(|e| Error::Search(e.to_string()))?;
        l2_normalize(&mut q);
        Ok(self
            .index
            .search(&q, k)?
            .into_iter()
            .map(|(doc, score)| SearchHit { doc, score: score.clamp(-1.0, 1.0), source: BackendKind::Vector })
            .collect())
    }
}

fn progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible { return ProgressBar::hidden(); }
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} questions ({percent}%)")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
