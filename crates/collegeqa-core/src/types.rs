//! Domain types used by the corpus builder, the retrievers and the router.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Position of a document inside the corpus. Every index uses the same
/// numbering, so a `DocId` returned by any retriever resolves through
/// [`Corpus::get`].
pub type DocId = usize;

/// One retrievable question/answer unit.
///
/// - `entity_id`: owning record (a college name)
/// - `category`: topic label such as "Placements" or "Admissions"
/// - `question`: the text that is embedded and searched
/// - `answer`: returned to the caller, never embedded
/// - `keywords`: extra terms used by the lexical fallback
/// - `source`: path of the record file the pair was read from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub entity_id: String,
    pub category: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub source: String,
}

/// Identity and name material of one record, used for entity detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    /// Significant lower-cased words of the name.
    pub name_tokens: Vec<String>,
    /// Lower-cased alternative names taken from the record.
    pub aliases: Vec<String>,
    pub document_count: usize,
}

/// Ordered, index-stable collection of documents plus the entities they
/// belong to. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
    entities: Vec<Entity>,
}

impl Corpus {
    pub fn new(documents: Vec<Document>, entities: Vec<Entity>) -> Self {
        Self { documents, entities }
    }

    pub fn len(&self) -> usize { self.documents.len() }

    pub fn is_empty(&self) -> bool { self.documents.is_empty() }

    pub fn get(&self, id: DocId) -> Option<&Document> { self.documents.get(id) }

    pub fn documents(&self) -> &[Document] { &self.documents }

    pub fn entities(&self) -> &[Entity] { &self.entities }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Document count per category, sorted by category name.
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for doc in &self.documents {
            *counts.entry(doc.category.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn stats(&self) -> CorpusStats {
        CorpusStats {
            documents: self.documents.len(),
            entities: self.entities.len(),
            categories: self.category_counts().len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CorpusStats {
    pub documents: usize,
    pub entities: usize,
    pub categories: usize,
}

/// Indicates which retriever produced a hit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Vector,
    Lexical,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vector => f.write_str("vector"),
            Self::Lexical => f.write_str("lexical"),
        }
    }
}

/// The minimal surface returned by all retrievers.
///
/// `doc` is a corpus position. `score` is a cosine similarity (vector) or a
/// Jaccard overlap (lexical); higher is always better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub doc: DocId,
    pub score: f32,
    pub source: BackendKind,
}

/// How a query is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// No entity named, general intent matched: answered by template.
    General,
    /// No entity named, no general intent: plain retrieval.
    Specific,
    /// Entity named, no general intent: results filtered to the entity.
    EntitySpecific,
    /// Entity named and general intent matched: results boosted toward the entity.
    EntitySpecificGeneral,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::General => "general",
            Self::Specific => "specific",
            Self::EntitySpecific => "entity_specific",
            Self::EntitySpecificGeneral => "entity_specific_general",
        };
        f.write_str(s)
    }
}

/// Canned-answer intents recognized by the general-intent rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Admission,
    Fees,
    Placement,
    Clarification,
}

impl Intent {
    /// Category label used on template results.
    pub fn label(self) -> &'static str {
        match self {
            Self::Admission => "Admissions",
            Self::Fees => "Fees",
            Self::Placement => "Placements",
            Self::Clarification => "General",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub kind: QueryKind,
    pub mentioned_entities: Vec<String>,
    pub intent: Option<Intent>,
}

impl Classification {
    pub fn requires_template_answer(&self) -> bool { self.kind == QueryKind::General }

    pub fn mentions(&self, entity_id: &str) -> bool {
        self.mentioned_entities.iter().any(|e| e == entity_id)
    }
}

/// Caller-facing result. `confidence` is always within `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub entity_id: String,
    pub category: String,
    pub question: String,
    pub answer: String,
    pub confidence: f32,
}

/// Results together with the classification that produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub classification: Classification,
    pub results: Vec<QueryResult>,
}
