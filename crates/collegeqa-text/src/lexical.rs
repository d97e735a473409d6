use std::collections::BTreeSet;

use collegeqa_core::error::Result;
use collegeqa_core::traits::{rank_top_k, Retriever};
use collegeqa_core::types::{BackendKind, Corpus, SearchHit};

use crate::tokenize::word_set;

/// Jaccard overlap of two word sets; 0 when both are empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
	let union = a.union(b).count();
	if union == 0 { return 0.0; }
	let intersection = a.intersection(b).count();
	intersection as f32 / union as f32
}

/// Degraded-mode retriever: scores each document by the Jaccard overlap of
/// query words with the words of its question and keywords.
pub struct LexicalRetriever {
	doc_words: Vec<BTreeSet<String>>,
}

impl LexicalRetriever {
	pub fn build(corpus: &Corpus) -> Self {
		let doc_words = corpus
			.documents()
			.iter()
			.map(|d| {
				let mut set = word_set(&d.question);
				for kw in &d.keywords { set.extend(word_set(kw)); }
				set
			})
			.collect();
		tracing::info!(documents = corpus.len(), "lexical index built");
		Self { doc_words }
	}
}

impl Retriever for LexicalRetriever {
	fn backend(&self) -> BackendKind { BackendKind::Lexical }

	fn len(&self) -> usize { self.doc_words.len() }

	fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
		let query_words = word_set(query);
		let scored = self.doc_words.iter().enumerate().map(|(id, words)| (id, jaccard(&query_words, words))).collect();
		Ok(rank_top_k(scored, k)
			.into_iter()
			.map(|(doc, score)| SearchHit { doc, score, source: BackendKind::Lexical })
			.collect())
	}
}
