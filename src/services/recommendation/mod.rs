use crate::config::RecommendationConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::*;
use crate::services::store::InteractionStore;
use crate::utils::metrics::EngineMetrics;
use crate::utils::validation;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub mod analytics;
pub mod collaborative;
pub mod content;
pub mod preferences;
pub mod similarity;
pub mod trending;

pub use preferences::{build_preference_model, PreferenceCache};
pub use similarity::product_similarity;

/// The personalized recommendation engine. Every public operation runs
/// synchronously within the calling task; the only shared mutable state
/// is the per-user preference cache, whose entries are swapped
/// atomically.
pub struct RecommendationEngine {
    store: Arc<dyn InteractionStore>,
    config: RecommendationConfig,
    preferences: PreferenceCache,
    metrics: Arc<EngineMetrics>,
}

impl RecommendationEngine {
    pub fn new(store: Arc<dyn InteractionStore>, config: RecommendationConfig) -> Self {
        Self {
            store,
            config,
            preferences: PreferenceCache::new(),
            metrics: Arc::new(EngineMetrics::new()),
        }
    }

    pub fn metrics(&self) -> Arc<EngineMetrics> {
        self.metrics.clone()
    }

    pub fn config(&self) -> &RecommendationConfig {
        &self.config
    }

    /// Record one interaction and synchronously refresh the user's
    /// cached preference model, so the next read is guaranteed fresh.
    /// Write failures propagate: silently dropping a write is a
    /// correctness bug, not a degraded read.
    pub async fn track_interaction(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        interaction_type: InteractionType,
        rating: Option<u8>,
    ) -> EngineResult<()> {
        validation::validate_track_request(user_id, product_id, interaction_type, rating)?;

        self.store
            .append_interaction(user_id, product_id, interaction_type, rating)
            .await
            .map_err(|e| self.note_store_error(e))?;
        self.metrics.record_interaction();

        if let Err(e) = self.refresh_preferences(user_id).await {
            // the append committed; drop the stale entry so the next
            // read rebuilds from the store
            self.preferences.invalidate(user_id);
            return Err(self.note_store_error(e));
        }

        Ok(())
    }

    /// Combined recommendations: 2x-limit candidate pools from the
    /// collaborative and content-based filters, merged 0.6/0.4 and
    /// annotated with human-readable reasons. Each signal source is
    /// isolated — a failure on one side does not lose the other's
    /// contribution.
    pub async fn get_user_recommendations(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> EngineResult<Vec<RecommendationItem>> {
        validation::validate_user_id(user_id)?;
        validation::validate_limit(limit, self.config.max_limit)?;

        let records = self
            .store
            .get_interactions(user_id)
            .await
            .map_err(|e| self.note_store_error(e))?;
        let user_products: HashSet<Uuid> =
            records.iter().map(|r| r.event.product_id).collect();
        let prefs = self.preference_model_from_records(user_id, &records);

        let candidate_limit = limit * self.config.candidate_multiplier;
        let (collab_result, content_result) = tokio::join!(
            collaborative::collaborative_candidates(
                self.store.as_ref(),
                &self.config,
                user_id,
                &user_products,
                candidate_limit,
            ),
            content::content_candidates(
                self.store.as_ref(),
                &self.config,
                prefs.as_ref(),
                &user_products,
                candidate_limit,
            ),
        );

        let mut source_errors = Vec::new();
        let collab = self.signal_or_empty(collab_result, "collaborative", &mut source_errors);
        let content = self.signal_or_empty(content_result, "content-based", &mut source_errors);

        // both sides down means there is nothing to degrade to
        if source_errors.len() == 2 {
            return Err(source_errors.remove(0));
        }

        let mut combined: HashMap<Uuid, f64> = HashMap::new();
        for candidate in &collab {
            *combined.entry(candidate.product_id).or_insert(0.0) +=
                candidate.score * self.config.collaborative_weight;
        }
        for candidate in &content {
            *combined.entry(candidate.product_id).or_insert(0.0) +=
                candidate.score * self.config.content_weight;
        }

        let ranked = crate::utils::rank_descending(combined, limit);

        let mut recommendations = Vec::with_capacity(ranked.len());
        for candidate in ranked {
            let product = match self
                .store
                .get_product(candidate.product_id)
                .await
                .map_err(|e| self.note_store_error(e))?
            {
                Some(product) => product,
                None => continue, // product left the catalog mid-request
            };

            recommendations.push(RecommendationItem {
                product_id: candidate.product_id,
                score: candidate.score,
                reasons: build_reasons(&self.config, prefs.as_ref(), &product),
            });
        }

        self.metrics.record_served(recommendations.len());
        info!(
            user_id = %user_id,
            count = recommendations.len(),
            "served recommendations"
        );

        Ok(recommendations)
    }

    /// Products similar to a reference product, within its category.
    pub async fn get_similar_products(
        &self,
        product_id: Uuid,
        limit: usize,
    ) -> EngineResult<Vec<ScoredProduct>> {
        validation::validate_product_id(product_id)?;
        validation::validate_limit(limit, self.config.max_limit)?;

        similarity::similar_products(self.store.as_ref(), &self.config, product_id, limit)
            .await
            .map_err(|e| self.note_store_error(e))
    }

    /// Trending products over the trailing window, optionally scoped to
    /// a category.
    pub async fn get_trending_products(
        &self,
        category_id: Option<Uuid>,
        limit: usize,
    ) -> EngineResult<Vec<TrendingProduct>> {
        validation::validate_limit(limit, self.config.max_limit)?;

        trending::trending_products(self.store.as_ref(), &self.config, category_id, limit)
            .await
            .map_err(|e| self.note_store_error(e))
    }

    /// Behavioral analytics rollup for one user.
    pub async fn get_user_analytics(&self, user_id: Uuid) -> EngineResult<UserAnalytics> {
        validation::validate_user_id(user_id)?;

        analytics::user_analytics(self.store.as_ref(), user_id)
            .await
            .map_err(|e| self.note_store_error(e))
    }

    /// The user's preference model, from the cache when present,
    /// recomputed from the store otherwise.
    pub async fn preference_model(&self, user_id: Uuid) -> EngineResult<Arc<PreferenceModel>> {
        if let Some(model) = self.preferences.get(user_id) {
            self.metrics.record_cache_hit();
            return Ok(model);
        }

        self.metrics.record_cache_miss();
        self.refresh_preferences(user_id)
            .await
            .map_err(|e| self.note_store_error(e))
    }

    async fn refresh_preferences(&self, user_id: Uuid) -> EngineResult<Arc<PreferenceModel>> {
        let records = self.store.get_interactions(user_id).await?;
        let model = build_preference_model(&self.config, &records);
        Ok(self.preferences.publish(user_id, model))
    }

    /// Cache lookup that reuses an already-fetched history on miss
    /// instead of a second store round trip.
    fn preference_model_from_records(
        &self,
        user_id: Uuid,
        records: &[InteractionRecord],
    ) -> Arc<PreferenceModel> {
        if let Some(model) = self.preferences.get(user_id) {
            self.metrics.record_cache_hit();
            return model;
        }

        self.metrics.record_cache_miss();
        self.preferences
            .publish(user_id, build_preference_model(&self.config, records))
    }

    fn signal_or_empty(
        &self,
        result: EngineResult<Vec<ScoredProduct>>,
        source: &str,
        errors: &mut Vec<EngineError>,
    ) -> Vec<ScoredProduct> {
        match result {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(source = source, error = %e, "signal source failed, continuing without it");
                errors.push(self.note_store_error(e));
                Vec::new()
            }
        }
    }

    fn note_store_error(&self, error: EngineError) -> EngineError {
        if error.is_store_unavailable() {
            self.metrics.record_store_error();
        }
        error
    }
}

fn build_reasons(
    config: &RecommendationConfig,
    preferences: &PreferenceModel,
    product: &ProductFeatures,
) -> Vec<String> {
    let mut reasons = Vec::new();

    if preferences.category_weights.contains_key(&product.category_id) {
        reasons.push(format!(
            "You've shown interest in {} products",
            product.category_name
        ));
    }

    if let Some(brand) = &product.brand {
        if preferences.brand_weights.contains_key(brand) {
            reasons.push(format!("You like {} products", brand));
        }
    }

    if product.average_rating >= config.highly_rated_threshold {
        reasons.push(format!("Highly rated ({:.1}/5.0)", product.average_rating));
    }

    if product.review_count >= config.popular_review_count {
        reasons.push(format!("Popular choice ({} reviews)", product.review_count));
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_reasons() {
        let config = RecommendationConfig::default();
        let category_id = Uuid::new_v4();

        let mut preferences = PreferenceModel::default();
        preferences.category_weights.insert(category_id, 1.0);
        preferences.brand_weights.insert("Acme".to_string(), 1.0);

        let product = ProductFeatures::new(Uuid::new_v4(), category_id, "Electronics")
            .with_brand("Acme")
            .with_rating(4.6, 25);

        let reasons = build_reasons(&config, &preferences, &product);
        assert_eq!(reasons.len(), 4);
        assert_eq!(reasons[0], "You've shown interest in Electronics products");
        assert_eq!(reasons[1], "You like Acme products");
        assert_eq!(reasons[2], "Highly rated (4.6/5.0)");
        assert_eq!(reasons[3], "Popular choice (25 reviews)");
    }

    #[test]
    fn test_build_reasons_empty_for_unknown_product() {
        let config = RecommendationConfig::default();
        let preferences = PreferenceModel::default();
        let product = ProductFeatures::new(Uuid::new_v4(), Uuid::new_v4(), "Garden");

        assert!(build_reasons(&config, &preferences, &product).is_empty());
    }
}
