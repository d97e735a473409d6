use collegeqa_core::types::{Classification, Corpus, Entity, QueryKind};

use crate::intents::IntentRules;

/// Lower-cased strings whose presence in a query marks an entity as mentioned.
#[derive(Debug, Clone)]
struct EntityMatcher {
    id: String,
    needles: Vec<String>,
}

impl EntityMatcher {
    fn from_entity(entity: &Entity) -> Self {
        let mut needles: Vec<String> = entity.name_tokens.clone();
        let full = entity.id.trim().to_lowercase();
        if full.chars().count() > 3 { needles.push(full); }
        for alias in &entity.aliases {
            if alias.chars().count() > 2 { needles.push(alias.clone()); }
        }
        needles.dedup();
        Self { id: entity.id.clone(), needles }
    }

    fn matches(&self, query_lower: &str) -> bool {
        self.needles.iter().any(|n| query_lower.contains(n.as_str()))
    }
}

/// Decides whether a query is general or names one or more colleges.
///
/// Entity detection is a substring heuristic over significant name words:
/// it favours recall and may report several colleges for one query.
pub struct Classifier {
    entities: Vec<EntityMatcher>,
    rules: IntentRules,
}

impl Classifier {
    pub fn new(corpus: &Corpus, rules: IntentRules) -> Self {
        let entities = corpus.entities().iter().map(EntityMatcher::from_entity).collect();
        Self { entities, rules }
    }

    /// Ids of the entities referenced by `query`, in corpus order.
    pub fn detect_entities(&self, query: &str) -> Vec<String> {
        let lower = query.to_lowercase();
        self.entities.iter().filter(|e| e.matches(&lower)).map(|e| e.id.clone()).collect()
    }

    pub fn classify(&self, query: &str) -> Classification {
        let mentioned_entities = self.detect_entities(query);
        let intent = self.rules.detect(query);
        let kind = match (mentioned_entities.is_empty(), intent.is_some()) {
            (false, false) => QueryKind::EntitySpecific,
            (false, true) => QueryKind::EntitySpecificGeneral,
            (true, true) => QueryKind::General,
            (true, false) => QueryKind::Specific,
        };
        Classification { kind, mentioned_entities, intent }
    }
}
