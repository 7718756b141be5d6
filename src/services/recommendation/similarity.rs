use crate::config::RecommendationConfig;
use crate::error::EngineResult;
use crate::models::{ProductFeatures, ScoredProduct};
use crate::services::store::InteractionStore;
use crate::utils::rank_descending;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// Pairwise product similarity in [0, 1]: weighted sum over category,
/// brand, price, and rating agreement. The price term divides by the
/// larger of the two average prices, which keeps the score symmetric.
pub fn product_similarity(
    config: &RecommendationConfig,
    a: &ProductFeatures,
    b: &ProductFeatures,
) -> f64 {
    let mut similarity = 0.0;

    if a.category_id == b.category_id {
        similarity += config.category_similarity_weight;
    }

    if let (Some(brand_a), Some(brand_b)) = (&a.brand, &b.brand) {
        if brand_a == brand_b {
            similarity += config.brand_similarity_weight;
        }
    }

    if let (Some(price_a), Some(price_b)) = (a.avg_price(), b.avg_price()) {
        let denominator = price_a.max(price_b);
        if denominator > 0.0 {
            let price_diff = (price_a - price_b).abs() / denominator;
            similarity += config.price_similarity_weight * (1.0 - price_diff).max(0.0);
        } else {
            // both free: identical prices
            similarity += config.price_similarity_weight;
        }
    }

    let rating_diff = (a.average_rating - b.average_rating).abs() / 5.0;
    similarity += config.rating_similarity_weight * (1.0 - rating_diff).max(0.0);

    similarity
}

/// "Similar products" listing: other active products in the reference
/// product's category, ranked by pairwise similarity. An unknown
/// reference product yields an empty list, not an error.
pub async fn similar_products(
    store: &dyn InteractionStore,
    config: &RecommendationConfig,
    product_id: Uuid,
    limit: usize,
) -> EngineResult<Vec<ScoredProduct>> {
    let reference = match store.get_product(product_id).await? {
        Some(product) => product,
        None => {
            debug!(product_id = %product_id, "similar-products reference not in catalog");
            return Ok(Vec::new());
        }
    };

    let candidates = store
        .get_active_products_in_category(reference.category_id)
        .await?;

    let scores: HashMap<Uuid, f64> = candidates
        .iter()
        .filter(|candidate| candidate.product_id != product_id)
        .map(|candidate| {
            (
                candidate.product_id,
                product_similarity(config, &reference, candidate),
            )
        })
        .collect();

    Ok(rank_descending(scores, limit))
}
