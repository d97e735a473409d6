use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use collegeqa_core::config::{expand_path, Settings};
use collegeqa_core::corpus::CorpusBuilder;
use collegeqa_core::error::{Error, Result};
use collegeqa_core::traits::Embedder;
use collegeqa_core::types::{Answer, BackendKind, Classification, Corpus, QueryResult};
use collegeqa_embed::get_default_embedder;
use collegeqa_vector::BuildOptions;

use crate::classify::Classifier;
use crate::engine::RetrievalEngine;
use crate::intents::IntentRules;
use crate::router::Router;

/// Everything needed to answer queries, built once and shared by reference.
///
/// Holds no per-query state: `query`, `answer` and `classify` take `&self`.
pub struct RetrievalSession {
    engine: RetrievalEngine,
    classifier: Classifier,
    router: Router,
    default_top_k: usize,
}

impl RetrievalSession {
    pub fn new(engine: RetrievalEngine, classifier: Classifier, router: Router, default_top_k: usize) -> Self {
        Self { engine, classifier, router, default_top_k }
    }

    /// Read the records directory from `settings` and build a session with
    /// the configured embedding backend.
    pub fn open(settings: &Settings) -> Result<Self> {
        Self::open_dir(settings, &expand_path(&settings.data.records_dir), false)
    }

    /// Like [`open`](Self::open) with an explicit records directory.
    pub fn open_dir(settings: &Settings, records_dir: &Path, show_progress: bool) -> Result<Self> {
        let corpus = CorpusBuilder::from_settings(&settings.data).build_corpus(records_dir)?;
        let embedding = settings.embedding.clone();
        Self::from_corpus(corpus, settings, show_progress, move || get_default_embedder(&embedding))
    }

    /// Build from an in-memory corpus with a caller-supplied embedder loader.
    pub fn from_corpus<F>(corpus: Corpus, settings: &Settings, show_progress: bool, load_embedder: F) -> Result<Self>
    where
        F: FnOnce() -> anyhow::Result<Box<dyn Embedder>>,
    {
        settings.validate()?;
        let corpus = Arc::new(corpus);
        let classifier = Classifier::new(&corpus, IntentRules::standard()?);
        let opts = BuildOptions { batch_size: settings.retrieval.batch_size, show_progress };
        let engine = RetrievalEngine::build(corpus, settings.retrieval.backend, &opts, load_embedder);
        info!(backend = %engine.backend(), documents = engine.len(), "retrieval session ready");
        Ok(Self::new(engine, classifier, Router::from_settings(&settings.scoring), settings.retrieval.top_k))
    }

    pub fn classify(&self, text: &str) -> Classification { self.classifier.classify(text) }

    /// Ranked results for `text`.
    pub fn query(&self, text: &str, top_k: usize) -> Result<Vec<QueryResult>> {
        Ok(self.answer(text, top_k)?.results)
    }

    /// [`query`](Self::query) with the configured default `top_k`.
    pub fn query_default(&self, text: &str) -> Result<Vec<QueryResult>> { self.query(text, self.default_top_k) }

    /// Results together with the classification that produced them.
    pub fn answer(&self, text: &str, top_k: usize) -> Result<Answer> {
        if text.trim().is_empty() { return Err(Error::InvalidQuery); }
        let classification = self.classifier.classify(text);
        debug!(kind = %classification.kind, entities = ?classification.mentioned_entities, "classified query");
        let results = self.router.route(&self.engine, &classification, text, top_k)?;
        Ok(Answer { classification, results })
    }

    pub fn backend(&self) -> BackendKind { self.engine.backend() }

    pub fn engine(&self) -> &RetrievalEngine { &self.engine }

    pub fn corpus(&self) -> &Corpus { self.engine.corpus() }

    pub fn default_top_k(&self) -> usize { self.default_top_k }
}
