//! collegeqa-text
//!
//! Word-level retrieval used when no embedding backend is available. Words
//! come from a tantivy analyzer (alphanumeric runs, lower-cased) so the
//! fallback agrees with how queries are tokenized everywhere else.

pub mod lexical;
pub mod tokenize;

pub use lexical::{jaccard, LexicalRetriever};
pub use tokenize::{word_set, words};
