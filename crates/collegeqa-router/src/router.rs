use tracing::debug;

use collegeqa_core::config::ScoringSettings;
use collegeqa_core::error::Result;
use collegeqa_core::types::{Classification, Intent, QueryKind, QueryResult};

use crate::engine::{Ranked, RetrievalEngine};
use crate::scoring::ConfidenceScorer;

/// `entity_id` reported on template answers.
pub const GENERAL_ENTITY: &str = "General";

/// Canned answers for general questions and their fixed confidences.
#[derive(Debug, Clone)]
pub struct TemplateBook {
    pub admission: String,
    pub fees: String,
    pub placement: String,
    pub clarification: String,
    pub template_confidence: f32,
    pub clarification_confidence: f32,
}

impl Default for TemplateBook {
    fn default() -> Self {
        Self {
            admission: "Admission to most engineering colleges is through an entrance exam such as JEE Main, \
                JEE Advanced or a state CET, followed by centralized counselling based on rank. Some private \
                universities run their own entrance tests. Name a college to see its specific process."
                .to_string(),
            fees: "Annual B.Tech tuition typically ranges from about 50,000 rupees at government colleges to \
                2-4 lakh rupees at private institutes, with hostel and other charges on top. Name a college \
                to see its exact fee structure."
                .to_string(),
            placement: "Placement outcomes vary widely between colleges: average packages commonly fall \
                between 4 and 12 LPA, with top institutes reporting considerably more. Name a college to see \
                its placement statistics."
                .to_string(),
            clarification: "Could you tell me which college you are asking about? I can answer questions on \
                admissions, fees, placements and campus facilities for specific colleges."
                .to_string(),
            template_confidence: 95.0,
            clarification_confidence: 90.0,
        }
    }
}

impl TemplateBook {
    pub fn answer(&self, intent: Intent, query: &str) -> QueryResult {
        let (answer, confidence) = match intent {
            Intent::Admission => (&self.admission, self.template_confidence),
            Intent::Fees => (&self.fees, self.template_confidence),
            Intent::Placement => (&self.placement, self.template_confidence),
            Intent::Clarification => (&self.clarification, self.clarification_confidence),
        };
        QueryResult {
            entity_id: GENERAL_ENTITY.to_string(),
            category: intent.label().to_string(),
            question: query.trim().to_string(),
            answer: answer.clone(),
            confidence: confidence.clamp(0.0, 100.0),
        }
    }
}

/// Turns a classification into results: templates for general questions,
/// filtered or boosted retrieval otherwise.
#[derive(Debug, Clone, Default)]
pub struct Router {
    templates: TemplateBook,
    scorer: ConfidenceScorer,
}

impl Router {
    pub fn new(templates: TemplateBook, scorer: ConfidenceScorer) -> Self { Self { templates, scorer } }

    pub fn from_settings(scoring: &ScoringSettings) -> Self {
        let templates = TemplateBook {
            template_confidence: scoring.template_confidence,
            clarification_confidence: scoring.clarification_confidence,
            ..TemplateBook::default()
        };
        Self::new(templates, ConfidenceScorer::new(scoring.entity_boost))
    }

    pub fn templates(&self) -> &TemplateBook { &self.templates }

    pub fn scorer(&self) -> &ConfidenceScorer { &self.scorer }

    /// Answer `query` according to `classification`.
    ///
    /// `General` never touches the engine. Any other kind that finds
    /// nothing (empty corpus) gets the clarification template, so a real
    /// question is never answered with an empty list unless `top_k` is 0.
    pub fn route(&self, engine: &RetrievalEngine, classification: &Classification, query: &str, top_k: usize) -> Result<Vec<QueryResult>> {
        if top_k == 0 { return Ok(Vec::new()); }
        let results = match classification.kind {
            QueryKind::General => {
                let intent = classification.intent.unwrap_or(Intent::Clarification);
                return Ok(vec![self.templates.answer(intent, query)]);
            }
            QueryKind::EntitySpecific => self.filtered(engine, classification, query, top_k)?,
            QueryKind::EntitySpecificGeneral | QueryKind::Specific => self.boosted(engine, classification, query, top_k)?,
        };
        if results.is_empty() {
            debug!("no retrieval results; answering with clarification template");
            return Ok(vec![self.templates.answer(Intent::Clarification, query)]);
        }
        Ok(results)
    }

    /// Keep only documents of the mentioned entities; if none rank at all,
    /// fall back to the unfiltered top-k.
    fn filtered(&self, engine: &RetrievalEngine, c: &Classification, query: &str, top_k: usize) -> Result<Vec<QueryResult>> {
        let ranked = engine.search(query, engine.len())?;
        let filtered: Vec<&Ranked<'_>> = ranked.iter().filter(|r| c.mentions(&r.document.entity_id)).take(top_k).collect();
        let chosen = if filtered.is_empty() {
            debug!(entities = ?c.mentioned_entities, "entity filter emptied the results; using unfiltered ranking");
            ranked.iter().take(top_k).collect()
        } else {
            filtered
        };
        Ok(chosen.into_iter().map(|r| self.to_result(r, c)).collect())
    }

    /// Rank the whole corpus, boost mentioned entities, re-sort by confidence.
    fn boosted(&self, engine: &RetrievalEngine, c: &Classification, query: &str, top_k: usize) -> Result<Vec<QueryResult>> {
        let depth = if c.mentioned_entities.is_empty() { top_k } else { engine.len() };
        let ranked = engine.search(query, depth)?;
        let mut results: Vec<QueryResult> = ranked.iter().map(|r| self.to_result(r, c)).collect();
        // stable: equal confidences keep retrieval order
        results.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        results.truncate(top_k);
        Ok(results)
    }

    fn to_result(&self, r: &Ranked<'_>, c: &Classification) -> QueryResult {
        let doc = r.document;
        QueryResult {
            entity_id: doc.entity_id.clone(),
            category: doc.category.clone(),
            question: doc.question.clone(),
            answer: doc.answer.clone(),
            confidence: self.scorer.score(r.score, c.mentions(&doc.entity_id)),
        }
    }
}
