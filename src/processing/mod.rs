//! Embedding, scoring and ranking

pub mod embeddings;
pub mod pipeline;
pub mod ranker;

pub use pipeline::MatchingPipeline;
