//! Memory implementations for Lyra.
//!
//! - [`SimpleAgentMemory`]: per-agent record list with substring recall
//! - [`InMemoryVectorStore`]: brute-force cosine index over embedded text

pub mod simple;
pub mod vector;

pub use simple::SimpleAgentMemory;
pub use vector::{InMemoryVectorStore, cosine_similarity};
