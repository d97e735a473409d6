use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use collegeqa_core::config::{BackendPreference, Settings};
use collegeqa_core::corpus::CorpusBuilder;
use collegeqa_core::error::{Error, Result};
use collegeqa_core::traits::{Embedder, Retriever};
use collegeqa_core::types::{BackendKind, Corpus, Document, Entity, Intent, QueryKind, SearchHit};
use collegeqa_embed::HashEmbedder;
use collegeqa_router::{
    Classifier, ConfidenceScorer, IntentRules, RetrievalEngine, RetrievalSession, Router, GENERAL_ENTITY,
};
use collegeqa_text::LexicalRetriever;
use collegeqa_vector::BuildOptions;
use proptest::prelude::*;

fn doc(entity: &str, category: &str, question: &str, answer: &str) -> Document {
    Document {
        entity_id: entity.to_string(),
        category: category.to_string(),
        question: question.to_string(),
        answer: answer.to_string(),
        keywords: vec![],
        source: String::new(),
    }
}

fn entity(id: &str, docs: usize) -> Entity {
    Entity {
        id: id.to_string(),
        name_tokens: collegeqa_core::corpus::significant_words(id),
        aliases: vec![],
        document_count: docs,
    }
}

fn campus_corpus() -> Corpus {
    Corpus::new(
        vec![
            doc("Alpha Institute", "Placements", "What is the average placement package?", "Alpha averages 7 LPA."),
            doc("Alpha Institute", "Hostel", "Is hostel accommodation available?", "Alpha has hostels for all years."),
            doc("Beta College", "Placements", "What is the average placement package?", "Beta averages 5 LPA."),
            doc("Beta College", "Library", "How big is the library?", "Beta's library holds 80,000 books."),
            doc("Gamma University", "Sports", "Are there sports facilities?", "Gamma has a stadium."),
        ],
        vec![entity("Alpha Institute", 2), entity("Beta College", 2), entity("Gamma University", 1)],
    )
}

fn hash_loader() -> anyhow::Result<Box<dyn Embedder>> { Ok(Box::new(HashEmbedder::new(512))) }

fn session(corpus: Corpus) -> RetrievalSession {
    RetrievalSession::from_corpus(corpus, &Settings::default(), false, hash_loader).expect("session")
}

/// Delegates to a lexical retriever and counts `search` calls.
struct SpyRetriever {
    inner: LexicalRetriever,
    calls: Arc<AtomicUsize>,
}

impl Retriever for SpyRetriever {
    fn backend(&self) -> BackendKind { self.inner.backend() }
    fn len(&self) -> usize { self.inner.len() }
    fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.search(query, k)
    }
}

fn spy_session(corpus: Corpus) -> (RetrievalSession, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let corpus = Arc::new(corpus);
    let spy = SpyRetriever { inner: LexicalRetriever::build(&corpus), calls: calls.clone() };
    let classifier = Classifier::new(&corpus, IntentRules::standard().unwrap());
    let engine = RetrievalEngine::from_retriever(corpus, Box::new(spy)).unwrap();
    (RetrievalSession::new(engine, classifier, Router::default(), 5), calls)
}

#[test]
fn standard_rules_compile_and_detect_intents() {
    let rules = IntentRules::standard().unwrap();
    assert!(!rules.is_empty());
    assert_eq!(rules.detect("What are the fees?"), Some(Intent::Fees));
    assert_eq!(rules.detect("what is the admission process"), Some(Intent::Admission));
    assert_eq!(rules.detect("How do I apply?"), Some(Intent::Admission));
    assert_eq!(rules.detect("What is the average package?"), Some(Intent::Placement));
    assert_eq!(rules.detect("Which is the best college?"), Some(Intent::Clarification));
    assert_eq!(rules.detect("fee at Test Institute"), None);
    assert_eq!(rules.detect("hostel facilities"), None);
}

#[test]
fn first_matching_rule_wins() {
    let rules = IntentRules::new([("fee", Intent::Fees), ("fee|placement", Intent::Placement)]).unwrap();
    assert_eq!(rules.detect("FEE details"), Some(Intent::Fees));
    assert_eq!(rules.detect("placement details"), Some(Intent::Placement));
    assert!(matches!(IntentRules::new([("(unclosed", Intent::Fees)]), Err(Error::InvalidConfig(_))));
}

#[test]
fn classification_state_machine() {
    let corpus = campus_corpus();
    let classifier = Classifier::new(&corpus, IntentRules::standard().unwrap());

    let c = classifier.classify("Alpha Institute hostel facilities");
    assert_eq!(c.kind, QueryKind::EntitySpecific);
    assert_eq!(c.mentioned_entities, vec!["Alpha Institute".to_string()]);
    assert!(!c.requires_template_answer());

    let c = classifier.classify("What are the fees at alpha?");
    assert_eq!(c.kind, QueryKind::EntitySpecificGeneral);
    assert_eq!(c.intent, Some(Intent::Fees));

    let c = classifier.classify("What are the fees?");
    assert_eq!(c.kind, QueryKind::General);
    assert!(c.requires_template_answer());

    let c = classifier.classify("is there a swimming pool");
    assert_eq!(c.kind, QueryKind::Specific);
    assert!(c.mentioned_entities.is_empty());
}

#[test]
fn entity_detection_can_match_several_entities() {
    let corpus = campus_corpus();
    let classifier = Classifier::new(&corpus, IntentRules::standard().unwrap());
    let found = classifier.detect_entities("compare beta and gamma libraries");
    assert_eq!(found, vec!["Beta College".to_string(), "Gamma University".to_string()]);
    assert!(classifier.detect_entities("which college has the best library").is_empty());
}

#[test]
fn aliases_mark_entities_as_mentioned() {
    let mut alpha = entity("Indian Institute of Technology Delhi", 0);
    alpha.aliases = vec!["iitd".to_string()];
    let corpus = Corpus::new(vec![], vec![alpha]);
    let classifier = Classifier::new(&corpus, IntentRules::standard().unwrap());
    assert_eq!(classifier.detect_entities("IITD hostel rules").len(), 1);
}

#[test]
fn entity_specific_results_are_filtered_to_the_entity() {
    let session = session(campus_corpus());

    let answer = session.answer("Alpha Institute placement package", 3).unwrap();

    assert_eq!(answer.classification.kind, QueryKind::EntitySpecific);
    assert_eq!(answer.classification.mentioned_entities, vec!["Alpha Institute".to_string()]);
    assert_eq!(answer.results.len(), 2, "Alpha has two documents");
    assert!(answer.results.iter().all(|r| r.entity_id == "Alpha Institute"));
    assert_eq!(answer.results[0].answer, "Alpha averages 7 LPA.");
}

#[test]
fn entity_filter_falls_back_to_unfiltered_results() {
    let mut corpus_docs = campus_corpus().documents().to_vec();
    corpus_docs.retain(|d| d.entity_id != "Gamma University");
    // Gamma is still a known entity but owns no documents
    let corpus = Corpus::new(corpus_docs, vec![entity("Alpha Institute", 2), entity("Beta College", 2), entity("Gamma University", 0)]);
    let session = session(corpus);

    let answer = session.answer("gamma library size", 2).unwrap();

    assert_eq!(answer.classification.kind, QueryKind::EntitySpecific);
    assert_eq!(answer.results.len(), 2);
    assert!(answer.results.iter().all(|r| r.entity_id != "Gamma University"));
}

#[test]
fn general_query_uses_template_without_retrieval() {
    let (session, calls) = spy_session(campus_corpus());

    let results = session.query("What are the fees?", 5).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0, "retriever must not be called");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].entity_id, GENERAL_ENTITY);
    assert_eq!(results[0].category, "Fees");
    assert_eq!(results[0].confidence, 95.0);
}

#[test]
fn specific_query_calls_retriever() {
    let (session, calls) = spy_session(campus_corpus());
    let results = session.query("sports facilities", 2).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].entity_id, "Gamma University");
}

#[test]
fn entity_general_query_boosts_matching_results() {
    let session = session(campus_corpus());

    let answer = session.answer("What is the average placement package at Beta?", 5).unwrap();

    assert_eq!(answer.classification.kind, QueryKind::EntitySpecificGeneral);
    assert_eq!(answer.results.len(), 5, "boosting never filters");
    // Alpha and Beta share the question text; Beta wins only through the boost
    assert_eq!(answer.results[0].entity_id, "Beta College");
    let alpha = answer.results.iter().find(|r| r.entity_id == "Alpha Institute" && r.category == "Placements").unwrap();
    assert!(answer.results[0].confidence >= alpha.confidence);
    for pair in answer.results.windows(2) { assert!(pair[0].confidence >= pair[1].confidence); }
}

#[test]
fn blank_query_is_invalid() {
    let session = session(campus_corpus());
    assert!(matches!(session.query("   ", 5), Err(Error::InvalidQuery)));
    assert!(matches!(session.engine().search("", 5), Err(Error::InvalidQuery)));
}

#[test]
fn empty_corpus_never_errors() {
    let session = session(Corpus::default());
    assert!(session.engine().search("anything", 5).unwrap().is_empty());

    let results = session.query("anything at all", 5).unwrap();
    assert_eq!(results.len(), 1, "clarification template instead of an empty answer");
    assert_eq!(results[0].entity_id, GENERAL_ENTITY);
    assert!(session.query("anything at all", 0).unwrap().is_empty());
}

#[test]
fn top_k_contract_and_determinism() {
    let session = session(campus_corpus());
    for k in [1usize, 3, 5, 9] {
        let hits = session.engine().search("placement package", k).unwrap();
        assert_eq!(hits.len(), k.min(5));
        for pair in hits.windows(2) { assert!(pair[0].score >= pair[1].score); }
        let again = session.engine().search("placement package", k).unwrap();
        assert_eq!(hits, again);
    }
}

#[test]
fn unavailable_backend_degrades_to_lexical() {
    let corpus = Arc::new(campus_corpus());
    let engine = RetrievalEngine::build(corpus, BackendPreference::Auto, &BuildOptions::default(), || {
        Err(anyhow::anyhow!("model weights not found"))
    });

    assert_eq!(engine.backend(), BackendKind::Lexical);
    assert!(matches!(engine.degraded(), Some(Error::EmbeddingBackendUnavailable(_))));
    let hits = engine.search("Alpha placements", 3).unwrap();
    assert_eq!(hits.len(), 3);
    assert!(hits.iter().all(|h| h.source == BackendKind::Lexical));
}

#[test]
fn fallback_results_have_the_same_shape() {
    let mut settings = Settings::default();
    settings.retrieval.backend = BackendPreference::Lexical;
    let lexical = RetrievalSession::from_corpus(campus_corpus(), &settings, false, hash_loader).unwrap();
    let vector = session(campus_corpus());
    assert_eq!(lexical.backend(), BackendKind::Lexical);
    assert_eq!(vector.backend(), BackendKind::Vector);

    let from_lexical = lexical.query("Alpha placements", 3).unwrap();
    let from_vector = vector.query("Alpha placements", 3).unwrap();

    assert!(!from_lexical.is_empty());
    assert_eq!(from_lexical.len(), from_vector.len());
    assert!(from_lexical.iter().all(|r| (0.0..=100.0).contains(&r.confidence)));
}

#[test]
fn retriever_size_must_match_corpus() {
    let small = Corpus::new(campus_corpus().documents()[..2].to_vec(), vec![]);
    let retriever = LexicalRetriever::build(&small);
    assert!(RetrievalEngine::from_retriever(Arc::new(campus_corpus()), Box::new(retriever)).is_err());
}

#[test]
fn end_to_end_single_record() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(
        tmp.path().join("test_institute.json"),
        r#"{"college_name": "Test Institute",
            "frequently_asked_questions": {"Fees": [
                {"question": "What is the fee?", "answer": "The fee is 100000 per year."}
            ]}}"#,
    )
    .unwrap();
    let corpus = CorpusBuilder::new().build_corpus(tmp.path()).unwrap();
    let session = session(corpus);

    let answer = session.answer("fee at Test Institute", 5).unwrap();

    assert_eq!(answer.classification.kind, QueryKind::EntitySpecific);
    assert_eq!(answer.classification.mentioned_entities, vec!["Test Institute".to_string()]);
    assert_eq!(answer.results.len(), 1);
    let result = &answer.results[0];
    assert_eq!(result.entity_id, "Test Institute");
    assert_eq!(result.answer, "The fee is 100000 per year.");
    let raw = session.engine().search("fee at Test Institute", 1).unwrap()[0].score;
    let expected = (raw.clamp(0.0, 1.0) * 100.0 * 1.2).min(100.0);
    assert!((result.confidence - expected).abs() < 1e-3);
    assert!(result.confidence > raw * 100.0 && result.confidence <= 100.0);
}

#[test]
fn open_dir_honours_max_records() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(tmp.path().join("a.json"), r#"{"name": "Alpha Institute", "faqs": [{"question": "Fee?", "answer": "Low"}]}"#).unwrap();
    fs::write(tmp.path().join("b.json"), r#"{"name": "Beta College", "faqs": [{"question": "Fee?", "answer": "High"}]}"#).unwrap();
    let mut settings = Settings::default();
    settings.data.max_records = Some(1);
    settings.embedding.use_fake = true;

    let session = RetrievalSession::open_dir(&settings, tmp.path(), false).unwrap();

    assert_eq!(session.corpus().entities().len(), 1);
    assert_eq!(session.corpus().entities()[0].id, "Alpha Institute");
    assert_eq!(session.backend(), BackendKind::Vector);
}

#[test]
fn session_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RetrievalSession>();

    let session = Arc::new(session(campus_corpus()));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let s = Arc::clone(&session);
            std::thread::spawn(move || s.query("library", 2).unwrap())
        })
        .collect();
    let first = session.query("library", 2).unwrap();
    for h in handles { assert_eq!(h.join().unwrap(), first); }
}

#[test]
fn scorer_caps_and_clamps() {
    let scorer = ConfidenceScorer::new(1.2);
    assert_eq!(scorer.base(-0.3), 0.0);
    assert_eq!(scorer.score(0.9, true), 100.0);
    assert!((scorer.score(0.5, true) - 60.0).abs() < 1e-4);
    assert!((scorer.score(0.5, false) - 50.0).abs() < 1e-4);
    assert_eq!(ConfidenceScorer::new(0.5).boost_factor(), 1.0);
    assert_eq!(ConfidenceScorer::new(f32::INFINITY).boost_factor(), 1.0);
}

proptest! {
    #[test]
    fn confidence_always_within_bounds(raw in proptest::num::f32::ANY, boost in 0.0f32..10.0, matched in any::<bool>()) {
        let c = ConfidenceScorer::new(boost).score(raw, matched);
        prop_assert!((0.0..=100.0).contains(&c));
    }
}
