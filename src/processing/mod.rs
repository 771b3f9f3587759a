//! Skill normalization, similarity scoring and matching

pub mod aggregate;
pub mod embedding_cache;
pub mod embeddings;
pub mod lexical;
pub mod matcher;
pub mod normalizer;
pub mod similarity;
