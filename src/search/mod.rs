//! Query flows over an opened database.

use std::collections::BTreeMap;

use crate::db::{CodeHit, Database, KnowledgeHit};
use crate::embeddings::Embedder;
use crate::error::Result;

/// Search the codebase index by semantic similarity.
pub fn search_codebase(
    db: &Database,
    embedder: &dyn Embedder,
    query: &str,
    top_k: usize,
) -> Result<Vec<CodeHit>> {
    let embedding = embedder.embed_one(query)?;
    db.search_code(&embedding, top_k)
}

/// Store a knowledge entry with its embedding. Returns the row id.
pub fn store_knowledge(
    db: &Database,
    embedder: &dyn Embedder,
    content: &str,
    category: &str,
    tags: Option<&BTreeMap<String, String>>,
) -> Result<i64> {
    db.init_knowledge_schema()?;
    let embedding = embedder.embed_one(content)?;
    db.insert_knowledge(content, category, tags, &embedding)
}

/// Search knowledge entries by semantic similarity, optionally fused
/// with full-text rank (hybrid).
pub fn query_knowledge(
    db: &Database,
    embedder: &dyn Embedder,
    query: &str,
    category: Option<&str>,
    top_k: usize,
    hybrid: bool,
) -> Result<Vec<KnowledgeHit>> {
    db.init_knowledge_schema()?;
    let embedding = embedder.embed_one(query)?;
    if hybrid {
        db.search_knowledge_hybrid(&embedding, query, category, top_k)
    } else {
        db.search_knowledge(&embedding, category, top_k)
    }
}
