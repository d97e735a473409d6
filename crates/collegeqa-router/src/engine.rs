use std::sync::Arc;

use tracing::{info, warn};

use collegeqa_core::config::BackendPreference;
use collegeqa_core::error::{Error, Result};
use collegeqa_core::traits::{Embedder, Retriever};
use collegeqa_core::types::{BackendKind, Corpus, Document};
use collegeqa_text::LexicalRetriever;
use collegeqa_vector::{BuildOptions, VectorRetriever};

/// A document with its retrieval score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranked<'a> {
    pub document: &'a Document,
    pub score: f32,
    pub source: BackendKind,
}

/// The corpus plus whichever retriever could be built for it.
///
/// Built once; all query methods take `&self`, so one engine can serve
/// concurrent readers.
pub struct RetrievalEngine {
    corpus: Arc<Corpus>,
    retriever: Box<dyn Retriever>,
    degraded: Option<Error>,
}

impl RetrievalEngine {
    /// Select and build a retriever.
    ///
    /// `load_embedder` is only called when vector search is wanted. If it
    /// fails, or embedding the corpus fails, the engine falls back to
    /// lexical search and keeps the cause in [`degraded`](Self::degraded).
    pub fn build<F>(corpus: Arc<Corpus>, preference: BackendPreference, opts: &BuildOptions, load_embedder: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<Box<dyn Embedder>>,
    {
        if preference == BackendPreference::Lexical {
            return Self::lexical(corpus);
        }
        let vector = load_embedder()
            .map_err(|e| Error::EmbeddingBackendUnavailable(format!("{e:#}")))
            .and_then(|embedder| VectorRetriever::build(&corpus, embedder, opts));
        match vector {
            Ok(retriever) => {
                info!(documents = corpus.len(), embedder = retriever.embedder_id(), "vector retrieval ready");
                Self { corpus, retriever: Box::new(retriever), degraded: None }
            }
            Err(e) => {
                warn!("{e}; falling back to lexical search");
                let mut engine = Self::lexical(corpus);
                engine.degraded = Some(e);
                engine
            }
        }
    }

    pub fn lexical(corpus: Arc<Corpus>) -> Self {
        let retriever = LexicalRetriever::build(&corpus);
        Self { corpus, retriever: Box::new(retriever), degraded: None }
    }

    /// Use a ready-made retriever. It must cover exactly the corpus.
    pub fn from_retriever(corpus: Arc<Corpus>, retriever: Box<dyn Retriever>) -> Result<Self> {
        if retriever.len() != corpus.len() {
            return Err(Error::InvalidConfig(format!(
                "retriever holds {} documents but the corpus has {}",
                retriever.len(),
                corpus.len()
            )));
        }
        Ok(Self { corpus, retriever, degraded: None })
    }

    pub fn backend(&self) -> BackendKind { self.retriever.backend() }

    /// Why vector search is not in use, if it was requested and failed.
    pub fn degraded(&self) -> Option<&Error> { self.degraded.as_ref() }

    pub fn corpus(&self) -> &Corpus { &self.corpus }

    pub fn len(&self) -> usize { self.corpus.len() }

    pub fn is_empty(&self) -> bool { self.corpus.is_empty() }

    /// Top-`k` documents for `query`, best first, ties in corpus order.
    ///
    /// An empty corpus yields an empty list; a blank query is
    /// [`Error::InvalidQuery`].
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<Ranked<'_>>> {
        if query.trim().is_empty() { return Err(Error::InvalidQuery); }
        if self.corpus.is_empty() || k == 0 { return Ok(Vec::new()); }
        let hits = self.retriever.search(query, k.min(self.corpus.len()))?;
        hits.into_iter()
            .map(|h| {
                let document = self
                    .corpus
                    .get(h.doc)
                    .ok_or_else(|| Error::Search(format!("retriever returned unknown document {}", h.doc)))?;
                Ok(Ranked { document, score: h.score, source: h.source })
            })
            .collect()
    }
}
