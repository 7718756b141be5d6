use crate::config::RecommendationConfig;
use crate::error::EngineResult;
use crate::models::ScoredProduct;
use crate::services::store::InteractionStore;
use crate::utils::{jaccard, rank_descending};
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use tracing::debug;
use uuid::Uuid;

/// Collaborative-filtering candidates: propagate interactions from the
/// most Jaccard-similar users onto products the target user has not
/// touched. The all-pairs scan is the latency-risk operation of the
/// engine; the similarity floor and neighbor cap bound the accumulation
/// work, and neighbor histories are fetched concurrently.
pub async fn collaborative_candidates(
    store: &dyn InteractionStore,
    config: &RecommendationConfig,
    user_id: Uuid,
    user_products: &HashSet<Uuid>,
    limit: usize,
) -> EngineResult<Vec<ScoredProduct>> {
    if user_products.is_empty() {
        // no signal to propagate
        return Ok(Vec::new());
    }

    let other_users: Vec<Uuid> = store
        .get_all_user_ids()
        .await?
        .into_iter()
        .filter(|id| *id != user_id)
        .collect();

    let histories = join_all(
        other_users
            .iter()
            .map(|other| store.get_interactions(*other)),
    )
    .await;

    let mut neighbors = Vec::new();
    for (other_id, history) in other_users.into_iter().zip(histories) {
        let records = history?;
        let other_products: HashSet<Uuid> =
            records.iter().map(|r| r.event.product_id).collect();

        let similarity = jaccard(user_products, &other_products);
        if similarity > config.similarity_floor {
            neighbors.push((other_id, similarity, records));
        }
    }

    neighbors.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    neighbors.truncate(config.neighbor_limit);

    debug!(
        user_id = %user_id,
        neighbors = neighbors.len(),
        "collaborative neighbor selection complete"
    );

    let mut scores: HashMap<Uuid, f64> = HashMap::new();
    for (_, similarity, records) in &neighbors {
        for record in records {
            let product_id = record.event.product_id;
            if user_products.contains(&product_id) {
                continue;
            }

            let mut weight =
                similarity * config.interaction_weight(record.event.interaction_type);
            if let Some(rating) = record.event.rating {
                weight *= rating as f64 / 5.0;
            }

            *scores.entry(product_id).or_insert(0.0) += weight;
        }
    }

    Ok(rank_descending(scores, limit))
}
