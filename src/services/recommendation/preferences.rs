use crate::config::RecommendationConfig;
use crate::models::{InteractionRecord, PreferenceModel};
use crate::utils::mean;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Process-wide cache of preference models, one entry per user. Entries
/// are replaced atomically on publish and never mutated in place, so a
/// concurrent reader either sees the old model or the new one, never a
/// half-written entry.
#[derive(Debug, Default)]
pub struct PreferenceCache {
    entries: DashMap<Uuid, Arc<PreferenceModel>>,
}

impl PreferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: Uuid) -> Option<Arc<PreferenceModel>> {
        self.entries.get(&user_id).map(|entry| entry.clone())
    }

    /// Publish a freshly computed model, replacing any prior entry.
    pub fn publish(&self, user_id: Uuid, model: PreferenceModel) -> Arc<PreferenceModel> {
        let model = Arc::new(model);
        self.entries.insert(user_id, model.clone());
        model
    }

    pub fn invalidate(&self, user_id: Uuid) {
        self.entries.remove(&user_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Derive a preference model from a user's joined interaction history.
/// A user with no interactions gets empty maps and `None` scalars.
pub fn build_preference_model(
    config: &RecommendationConfig,
    records: &[InteractionRecord],
) -> PreferenceModel {
    let mut category_weights: HashMap<Uuid, f64> = HashMap::new();
    let mut category_names: HashMap<Uuid, String> = HashMap::new();
    let mut brand_weights: HashMap<String, f64> = HashMap::new();
    let mut prices = Vec::new();
    let mut ratings = Vec::new();

    for record in records {
        let weight = config.interaction_weight(record.event.interaction_type);
        let product = &record.product;

        *category_weights.entry(product.category_id).or_insert(0.0) += weight;
        category_names
            .entry(product.category_id)
            .or_insert_with(|| product.category_name.clone());

        if let Some(brand) = &product.brand {
            *brand_weights.entry(brand.clone()).or_insert(0.0) += weight;
        }

        if let Some(avg_price) = product.avg_price() {
            prices.push(avg_price);
        }

        if let Some(rating) = record.event.rating {
            ratings.push(rating as f64);
        }
    }

    normalize(&mut category_weights);
    normalize_by_key(&mut brand_weights);

    PreferenceModel {
        category_weights,
        category_names,
        brand_weights,
        avg_price_preference: mean(&prices),
        avg_rating_given: mean(&ratings),
        interaction_count: records.len(),
    }
}

fn normalize(weights: &mut HashMap<Uuid, f64>) {
    let total: f64 = weights.values().sum();
    if total > 0.0 {
        for value in weights.values_mut() {
            *value /= total;
        }
    }
}

fn normalize_by_key(weights: &mut HashMap<String, f64>) {
    let total: f64 = weights.values().sum();
    if total > 0.0 {
        for value in weights.values_mut() {
            *value /= total;
        }
    }
}
