use std::collections::HashMap;

/// In-memory embedding cache keyed by content hash.
///
/// Many colleges share the same template questions, so the corpus is
/// embedded per distinct question text. Keys include the embedder id so
/// vectors from different models never mix.
#[derive(Debug, Default)]
pub struct EmbeddingCache {
    embedder_id: String,
    entries: HashMap<String, Vec<f32>>,
}

impl EmbeddingCache {
    pub fn new(embedder_id: &str) -> Self { Self { embedder_id: embedder_id.to_string(), entries: HashMap::new() } }

    pub fn key(&self, text: &str) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.embedder_id.as_bytes());
        hasher.update(&[0]);
        hasher.update(text.as_bytes());
        hasher.finalize().to_hex().to_string()
    }

    pub fn get(&self, key: &str) -> Option<&Vec<f32>> { self.entries.get(key) }

    pub fn contains(&self, key: &str) -> bool { self.entries.contains_key(key) }

    pub fn put(&mut self, key: String, vector: Vec<f32>) { self.entries.insert(key, vector); }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}
