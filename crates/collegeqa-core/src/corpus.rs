//! Builds a [`Corpus`] from a directory of per-college JSON records.
//!
//! A record is one `*.json` file. Its FAQ pairs may appear in two shapes which
//! are normalized into the same [`Document`]:
//!
//! ```json
//! { "college_name": "Alpha Institute",
//!   "agent_faq": { "categories": { "Placements": [ {"question": "...", "answer": "..."} ] } },
//!   "frequently_asked_questions": { "Fees": [ {"question": "...", "answer": "..."} ] } }
//! ```
//!
//! Bad records are skipped with a warning; bad pairs are dropped on their own.

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::DataSettings;
use crate::error::{Error, Result};
use crate::types::{Corpus, Document, Entity};

/// Words that appear in most institution names and carry no identity.
pub const GENERIC_NAME_WORDS: &[&str] = &[
    "college", "colleges", "university", "institute", "institution", "engineering", "technology",
    "school", "national", "government", "private",
];

/// Keys whose value is an object of `topic -> [pairs]`.
const FLAT_SECTION_KEYS: &[&str] = &["frequently_asked_questions", "faqs"];
const NAME_KEYS: &[&str] = &["college_name", "name", "entity_id"];
const ALIAS_KEYS: &[&str] = &["keywords", "aliases"];

/// Significant lower-cased words of an entity name: longer than three
/// characters and not a generic institutional word.
pub fn significant_words(name: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    for w in name.split(|c: char| !c.is_alphanumeric()) {
        let w = w.to_lowercase();
        if w.chars().count() > 3 && !GENERIC_NAME_WORDS.contains(&w.as_str()) && !words.contains(&w) {
            words.push(w);
        }
    }
    words
}

/// Entity record as read from disk, before it is appended to the corpus.
#[derive(Debug, Clone)]
pub struct ParsedRecord {
    pub entity: Entity,
    pub documents: Vec<Document>,
    /// Pairs dropped for missing or blank fields.
    pub dropped_pairs: usize,
}

#[derive(Default)]
pub struct CorpusBuilder {
    limit: Option<usize>,
}

impl CorpusBuilder {
    pub fn new() -> Self { Self::default() }

    /// Read at most `limit` record files.
    pub fn with_limit(limit: usize) -> Self { Self { limit: Some(limit) } }

    pub fn from_settings(data: &DataSettings) -> Self { Self { limit: data.max_records } }

    pub fn build_corpus(&self, data_dir: &Path) -> Result<Corpus> {
        if !data_dir.is_dir() {
            return Err(Error::NotFound(format!("records directory {}", data_dir.display())));
        }
        let mut files = list_json_files(data_dir);
        if let Some(limit) = self.limit {
            if files.len() > limit {
                files.truncate(limit);
                info!(limit, "limited record files");
            }
        }
        if files.is_empty() {
            warn!(dir = %data_dir.display(), "no .json records found");
            return Ok(Corpus::default());
        }

        let mut documents = Vec::new();
        let mut entities: Vec<Entity> = Vec::new();
        let mut skipped = 0usize;
        for path in &files {
            match parse_record_file(path) {
                Ok(record) => {
                    if record.dropped_pairs > 0 {
                        debug!(path = %path.display(), dropped = record.dropped_pairs, "dropped incomplete pairs");
                    }
                    merge_entity(&mut entities, record.entity);
                    documents.extend(record.documents);
                }
                Err(e) => {
                    skipped += 1;
                    warn!("{e}; skipping");
                }
            }
        }
        info!(
            records = files.len(),
            skipped,
            entities = entities.len(),
            documents = documents.len(),
            "corpus built"
        );
        Ok(Corpus::new(documents, entities))
    }
}

/// Two files may describe the same college; their documents share one entity.
fn merge_entity(entities: &mut Vec<Entity>, entity: Entity) {
    match entities.iter_mut().find(|e| e.id == entity.id) {
        Some(existing) => {
            existing.document_count += entity.document_count;
            for alias in entity.aliases {
                if !existing.aliases.contains(&alias) { existing.aliases.push(alias); }
            }
        }
        None => entities.push(entity),
    }
}

pub fn parse_record_file(path: &Path) -> Result<ParsedRecord> {
    let raw = fs::read_to_string(path).map_err(|e| Error::record(path, e.to_string()))?;
    let value: Value = serde_json::from_str(&raw).map_err(|e| Error::record(path, e.to_string()))?;
    let fallback_id = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
    parse_record(&value, &fallback_id, path)
}

/// Normalize one parsed record. `fallback_id` is used when the record names no entity.
pub fn parse_record(value: &Value, fallback_id: &str, path: &Path) -> Result<ParsedRecord> {
    let root = value.as_object().ok_or_else(|| Error::record(path, "record root is not an object"))?;
    let entity_id = NAME_KEYS
        .iter()
        .filter_map(|k| root.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(fallback_id)
        .to_string();
    if entity_id.is_empty() {
        return Err(Error::record(path, "record has no entity name"));
    }

    let mut aliases = Vec::new();
    for key in ALIAS_KEYS {
        if let Some(Value::Array(items)) = root.get(*key) {
            for alias in items.iter().filter_map(Value::as_str) {
                let alias = alias.trim().to_lowercase();
                if !alias.is_empty() && !aliases.contains(&alias) { aliases.push(alias); }
            }
        }
    }

    let source = path.to_string_lossy().to_string();
    let mut out = SectionCollector { entity_id: &entity_id, source: &source, path, documents: Vec::new(), dropped: 0 };
    for (key, section) in root {
        if key == "categories" {
            out.categories(section)?;
        } else if FLAT_SECTION_KEYS.contains(&key.as_str()) {
            match section {
                Value::Array(_) => out.pairs(key, section)?,
                _ => out.topics(section)?,
            }
        } else if let Some(nested) = section.as_object().and_then(|o| o.get("categories")) {
            out.categories(nested)?;
        } else if is_pair_list(section) {
            out.pairs(key, section)?;
        }
    }

    let SectionCollector { documents, dropped, .. } = out;
    let entity = Entity {
        name_tokens: significant_words(&entity_id),
        id: entity_id,
        aliases,
        document_count: documents.len(),
    };
    Ok(ParsedRecord { entity, documents, dropped_pairs: dropped })
}

/// A top-level array counts as a topic list when it starts with a Q/A object.
fn is_pair_list(value: &Value) -> bool {
    matches!(value, Value::Array(items) if items.first().and_then(Value::as_object).is_some_and(|o| o.contains_key("question")))
}

struct SectionCollector<'a> {
    entity_id: &'a str,
    source: &'a str,
    path: &'a Path,
    documents: Vec<Document>,
    dropped: usize,
}

impl SectionCollector<'_> {
    /// Shape (a): `{ "<category>": [pairs] }` under a `categories` key.
    fn categories(&mut self, value: &Value) -> Result<()> {
        let map = self.object(value, "categories")?;
        for (category, pairs) in map {
            self.pairs(category, pairs)?;
        }
        Ok(())
    }

    /// Shape (b): `{ "<topic>": [pairs] }` directly. A bare list under the
    /// FAQ key goes straight to [`pairs`](Self::pairs) instead.
    fn topics(&mut self, value: &Value) -> Result<()> {
        let map = self.object(value, "faq section")?;
        for (topic, pairs) in map {
            self.pairs(topic, pairs)?;
        }
        Ok(())
    }

    fn pairs(&mut self, category: &str, value: &Value) -> Result<()> {
        let items = value
            .as_array()
            .ok_or_else(|| Error::record(self.path, format!("category '{category}' is not a list")))?;
        for item in items {
            let pair = item
                .as_object()
                .ok_or_else(|| Error::record(self.path, format!("entry in '{category}' is not an object")))?;
            let (Some(question), Some(answer)) = (text_field(pair, "question"), text_field(pair, "answer")) else {
                self.dropped += 1;
                continue;
            };
            let keywords = match pair.get("keywords") {
                Some(Value::Array(kw)) => kw.iter().filter_map(Value::as_str).map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect(),
                _ => Vec::new(),
            };
            self.documents.push(Document {
                entity_id: self.entity_id.to_string(),
                category: category.trim().to_string(),
                question,
                answer,
                keywords,
                source: self.source.to_string(),
            });
        }
        Ok(())
    }

    fn object<'v>(&self, value: &'v Value, what: &str) -> Result<&'v Map<String, Value>> {
        value.as_object().ok_or_else(|| Error::record(self.path, format!("{what} is not an object")))
    }
}

fn text_field(pair: &Map<String, Value>, key: &str) -> Option<String> {
    pair.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn list_json_files(root: &Path) -> Vec<PathBuf> {
    let mut json_files = Vec::new();
    for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("json") { json_files.push(path.to_path_buf()); }
    }
    json_files.sort();
    json_files
}
