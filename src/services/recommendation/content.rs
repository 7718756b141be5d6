use crate::config::RecommendationConfig;
use crate::error::EngineResult;
use crate::models::{PreferenceModel, ScoredProduct};
use crate::services::store::InteractionStore;
use crate::utils::rank_descending;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Content-based candidates: score active catalog products in the user's
/// preferred categories against the preference model. Unrated products
/// are fully discounted by the average-rating multiplier — a deliberate
/// cold-start penalty.
pub async fn content_candidates(
    store: &dyn InteractionStore,
    config: &RecommendationConfig,
    preferences: &PreferenceModel,
    user_products: &HashSet<Uuid>,
    limit: usize,
) -> EngineResult<Vec<ScoredProduct>> {
    if preferences.category_weights.is_empty() {
        return Ok(Vec::new());
    }

    let mut scores: HashMap<Uuid, f64> = HashMap::new();

    for (&category_id, &category_weight) in &preferences.category_weights {
        let products = store.get_active_products_in_category(category_id).await?;

        for product in products {
            if user_products.contains(&product.product_id) {
                continue;
            }

            let mut score = category_weight;

            if let Some(brand) = &product.brand {
                if let Some(brand_weight) = preferences.brand_weights.get(brand) {
                    score *= 1.0 + brand_weight;
                }
            }

            score *= product.average_rating / 5.0;

            *scores.entry(product.product_id).or_insert(0.0) += score;
        }
    }

    Ok(rank_descending(scores, limit))
}
