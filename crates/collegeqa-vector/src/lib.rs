//! collegeqa-vector
//!
//! Exact cosine search over unit-length question embeddings. The corpus is
//! embedded once (distinct questions only, see [`cache`]) into a
//! [`FlatIndex`]; [`VectorRetriever`] embeds each query the same way and
//! ranks every stored vector.

pub mod cache;
pub mod flat_index;
pub mod retriever;

pub use cache::EmbeddingCache;
pub use flat_index::{l2_normalize, FlatIndex};
pub use retriever::{BuildOptions, VectorRetriever};
