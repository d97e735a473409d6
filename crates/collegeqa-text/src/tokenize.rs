use std::collections::BTreeSet;
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, TextAnalyzer, TokenStream};

pub fn build_analyzer() -> TextAnalyzer {
	TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(LowerCaser)
		.build()
}

/// Lower-cased words of `text` in order of appearance.
pub fn words(text: &str) -> Vec<String> {
	let mut analyzer = build_analyzer();
	let mut stream = analyzer.token_stream(text);
	let mut out = Vec::new();
	while stream.advance() { out.push(stream.token().text.clone()); }
	out
}

/// Distinct lower-cased words of `text`.
pub fn word_set(text: &str) -> BTreeSet<String> { words(text).into_iter().collect() }
