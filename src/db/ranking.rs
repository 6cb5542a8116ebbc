//! Reciprocal Rank Fusion (RRF) for combining vector and full-text rankings.
//!
//! RRF score = sum over lists of `1 / (k + rank + 1)` with zero-based rank.
//! k = 60 is the standard constant from the original paper.

use std::collections::HashMap;

use super::KnowledgeHit;

pub const RRF_K: f64 = 60.0;

/// Fuse ranked knowledge result lists into a single list of at most `top_k`
/// entries, best fused score first. The fused score replaces `relevance`.
///
/// Neither search exposes the primary-key id, so entries are keyed by the
/// surrogate `(stored_at, first 80 chars of content)`; when the same key
/// appears in several lists, the first-seen entry body is kept.
pub fn fuse(lists: &[Vec<KnowledgeHit>], top_k: usize) -> Vec<KnowledgeHit> {
    let mut scores: HashMap<(String, String), f64> = HashMap::new();
    let mut bodies: HashMap<(String, String), KnowledgeHit> = HashMap::new();
    let mut order: Vec<(String, String)> = Vec::new();

    for list in lists {
        for (rank, hit) in list.iter().enumerate() {
            let key = fuse_key(hit);
            let contribution = 1.0 / (RRF_K + rank as f64 + 1.0);
            *scores.entry(key.clone()).or_insert(0.0) += contribution;
            bodies.entry(key.clone()).or_insert_with(|| {
                order.push(key.clone());
                hit.clone()
            });
        }
    }

    let mut fused: Vec<KnowledgeHit> = order
        .into_iter()
        .map(|key| {
            let mut hit = bodies.remove(&key).unwrap();
            hit.relevance = scores[&key];
            hit
        })
        .collect();

    // NaN-safe descending sort on the fused score.
    fused.sort_by(|a, b| {
        b.relevance
            .partial_cmp(&a.relevance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    fused.truncate(top_k);
    fused
}

fn fuse_key(hit: &KnowledgeHit) -> (String, String) {
    let prefix: String = hit.content.chars().take(80).collect();
    (hit.stored_at.clone(), prefix)
}
