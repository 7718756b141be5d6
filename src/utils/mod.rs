use crate::models::ScoredProduct;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

pub mod metrics;
pub mod validation;

/// Jaccard similarity of two sets: |A ∩ B| / |A ∪ B|. Returns 0.0 when
/// both sets are empty.
pub fn jaccard(a: &HashSet<Uuid>, b: &HashSet<Uuid>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();

    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Rank accumulated scores descending and truncate. Ties break by product
/// id ascending so identical inputs always produce identical output.
pub fn rank_descending(scores: HashMap<Uuid, f64>, limit: usize) -> Vec<ScoredProduct> {
    let mut ranked: Vec<(Uuid, f64)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    ranked
        .into_iter()
        .take(limit)
        .map(|(product_id, score)| ScoredProduct { product_id, score })
        .collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
