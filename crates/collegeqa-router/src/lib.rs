//! Query answering on top of the retrievers: the engine factory, the
//! general-vs-specific classifier, confidence scoring and the session object
//! a hosting application keeps for its lifetime.

pub mod classify;
pub mod engine;
pub mod intents;
pub mod router;
pub mod scoring;
pub mod session;

pub use classify::Classifier;
pub use engine::{Ranked, RetrievalEngine};
pub use intents::IntentRules;
pub use router::{Router, TemplateBook, GENERAL_ENTITY};
pub use scoring::ConfidenceScorer;
pub use session::RetrievalSession;
