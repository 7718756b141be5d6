use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reviewrec::services::recommendation::{collaborative, content};
use reviewrec::*;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

fn engine_over(store: Arc<InMemoryStore>) -> RecommendationEngine {
    RecommendationEngine::new(store, Config::default().recommendation)
}

fn seed_product(
    store: &InMemoryStore,
    category_id: Uuid,
    category: &str,
    brand: Option<&str>,
    price: Option<(f64, f64)>,
    rating: f64,
    reviews: u32,
) -> Uuid {
    let product_id = Uuid::new_v4();
    let mut product = ProductFeatures::new(product_id, category_id, category);
    if let Some(brand) = brand {
        product = product.with_brand(brand);
    }
    if let Some((min, max)) = price {
        product = product.with_price_range(min, max);
    }
    product = product.with_rating(rating, reviews);
    store.add_product(product);
    product_id
}

#[tokio::test]
async fn test_scenario_a_collaborative_neighbor() {
    let store = Arc::new(InMemoryStore::new());
    let category = Uuid::new_v4();
    let p1 = seed_product(&store, category, "Electronics", None, None, 4.0, 5);
    let p2 = seed_product(&store, category, "Electronics", None, None, 4.0, 5);
    let p3 = seed_product(&store, category, "Electronics", None, None, 4.0, 5);

    let u1 = Uuid::new_v4();
    let u2 = Uuid::new_v4();

    let engine = engine_over(store.clone());
    engine
        .track_interaction(u1, p1, InteractionType::View, None)
        .await
        .unwrap();
    engine
        .track_interaction(u1, p2, InteractionType::Purchase, Some(5))
        .await
        .unwrap();
    engine
        .track_interaction(u2, p1, InteractionType::View, None)
        .await
        .unwrap();
    engine
        .track_interaction(u2, p3, InteractionType::Purchase, Some(4))
        .await
        .unwrap();

    let u1_products: HashSet<Uuid> = [p1, p2].into_iter().collect();
    let candidates = collaborative::collaborative_candidates(
        store.as_ref(),
        engine.config(),
        u1,
        &u1_products,
        10,
    )
    .await
    .unwrap();

    // J(U1,U2) = 1/3; P3 score = 1/3 * 5.0 * (4/5) = 1.333
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].product_id, p3);
    assert!((candidates[0].score - 1.0 / 3.0 * 5.0 * 0.8).abs() < 1e-9);
}

#[tokio::test]
async fn test_monotonic_interaction_weighting() {
    let store = Arc::new(InMemoryStore::new());
    let category = Uuid::new_v4();
    let shared = seed_product(&store, category, "Books", None, None, 4.0, 5);
    let bought = seed_product(&store, category, "Books", None, None, 4.0, 5);
    let viewed = seed_product(&store, category, "Books", None, None, 4.0, 5);

    let target = Uuid::new_v4();
    let buyer = Uuid::new_v4();
    let viewer = Uuid::new_v4();

    let engine = engine_over(store.clone());
    engine
        .track_interaction(target, shared, InteractionType::View, None)
        .await
        .unwrap();
    engine
        .track_interaction(buyer, shared, InteractionType::View, None)
        .await
        .unwrap();
    engine
        .track_interaction(buyer, bought, InteractionType::Purchase, None)
        .await
        .unwrap();
    engine
        .track_interaction(viewer, shared, InteractionType::View, None)
        .await
        .unwrap();
    engine
        .track_interaction(viewer, viewed, InteractionType::View, None)
        .await
        .unwrap();

    let target_products: HashSet<Uuid> = [shared].into_iter().collect();
    let candidates = collaborative::collaborative_candidates(
        store.as_ref(),
        engine.config(),
        target,
        &target_products,
        10,
    )
    .await
    .unwrap();

    let score_of = |id: Uuid| {
        candidates
            .iter()
            .find(|c| c.product_id == id)
            .map(|c| c.score)
            .unwrap()
    };
    // equal neighbor similarity, so the purchase must outweigh the view
    assert!(score_of(bought) > score_of(viewed));
}

#[tokio::test]
async fn test_exclusion_invariant() {
    let store = Arc::new(InMemoryStore::new());
    let category = Uuid::new_v4();
    let interacted: Vec<Uuid> = (0..3)
        .map(|_| seed_product(&store, category, "Games", Some("Acme"), Some((20.0, 40.0)), 4.5, 15))
        .collect();
    for _ in 0..5 {
        seed_product(&store, category, "Games", Some("Acme"), Some((20.0, 40.0)), 4.2, 12);
    }

    let user = Uuid::new_v4();
    let other = Uuid::new_v4();
    let engine = engine_over(store.clone());

    for &product in &interacted {
        engine
            .track_interaction(user, product, InteractionType::Purchase, Some(4))
            .await
            .unwrap();
        engine
            .track_interaction(other, product, InteractionType::View, None)
            .await
            .unwrap();
    }

    let recommendations = engine.get_user_recommendations(user, 10).await.unwrap();
    assert!(!recommendations.is_empty());

    let interacted_set: HashSet<Uuid> = interacted.into_iter().collect();
    for item in &recommendations {
        assert!(!interacted_set.contains(&item.product_id));
    }
}

#[tokio::test]
async fn test_recommendations_carry_reasons() {
    let store = Arc::new(InMemoryStore::new());
    let category = Uuid::new_v4();
    let seen = seed_product(&store, category, "Audio", Some("Acme"), None, 4.0, 3);
    let candidate = seed_product(&store, category, "Audio", Some("Acme"), None, 4.8, 30);

    let user = Uuid::new_v4();
    let engine = engine_over(store.clone());
    engine
        .track_interaction(user, seen, InteractionType::Purchase, Some(5))
        .await
        .unwrap();

    let recommendations = engine.get_user_recommendations(user, 5).await.unwrap();
    let item = recommendations
        .iter()
        .find(|r| r.product_id == candidate)
        .expect("content-based candidate expected");

    assert!(item
        .reasons
        .contains(&"You've shown interest in Audio products".to_string()));
    assert!(item.reasons.contains(&"You like Acme products".to_string()));
    assert!(item.reasons.contains(&"Highly rated (4.8/5.0)".to_string()));
    assert!(item
        .reasons
        .contains(&"Popular choice (30 reviews)".to_string()));
}

#[tokio::test]
async fn test_zero_rated_product_never_scores_positive() {
    let store = Arc::new(InMemoryStore::new());
    let category = Uuid::new_v4();
    let seen = seed_product(&store, category, "Tools", None, None, 4.0, 8);
    let cold_start = seed_product(&store, category, "Tools", None, None, 0.0, 0);

    let user = Uuid::new_v4();
    let engine = engine_over(store.clone());
    engine
        .track_interaction(user, seen, InteractionType::Purchase, Some(5))
        .await
        .unwrap();

    let prefs = engine.preference_model(user).await.unwrap();
    let user_products: HashSet<Uuid> = [seen].into_iter().collect();
    let candidates = content::content_candidates(
        store.as_ref(),
        engine.config(),
        prefs.as_ref(),
        &user_products,
        10,
    )
    .await
    .unwrap();

    assert!(!candidates
        .iter()
        .any(|c| c.product_id == cold_start && c.score > 0.0));
}

#[tokio::test]
async fn test_trending_empty_store() {
    let store = Arc::new(InMemoryStore::new());
    let engine = engine_over(store);

    let trending = engine.get_trending_products(None, 10).await.unwrap();
    assert!(trending.is_empty());
}

#[tokio::test]
async fn test_trending_window_and_idempotence() {
    let store = Arc::new(InMemoryStore::new());
    let category = Uuid::new_v4();
    let hot = seed_product(&store, category, "Phones", None, None, 4.0, 10);
    let stale = seed_product(&store, category, "Phones", None, None, 4.0, 10);

    let engine = engine_over(store.clone());
    for _ in 0..3 {
        engine
            .track_interaction(Uuid::new_v4(), hot, InteractionType::Review, Some(5))
            .await
            .unwrap();
    }

    // outside the 7-day window
    store.insert_event(InteractionEvent {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        product_id: stale,
        interaction_type: InteractionType::Purchase,
        rating: Some(5),
        timestamp: Utc::now() - Duration::days(30),
    });

    let first = engine.get_trending_products(None, 10).await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].product_id, hot);
    assert_eq!(first[0].recent_interactions, 3);
    // 3 interactions * (5/5)
    assert!((first[0].trend_score - 3.0).abs() < 1e-9);

    let second = engine.get_trending_products(None, 10).await.unwrap();
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.product_id, b.product_id);
        assert_eq!(a.trend_score, b.trend_score);
    }
}

#[tokio::test]
async fn test_trending_category_scope() {
    let store = Arc::new(InMemoryStore::new());
    let phones = Uuid::new_v4();
    let books = Uuid::new_v4();
    let phone = seed_product(&store, phones, "Phones", None, None, 4.0, 10);
    let book = seed_product(&store, books, "Books", None, None, 4.0, 10);

    let engine = engine_over(store.clone());
    engine
        .track_interaction(Uuid::new_v4(), phone, InteractionType::View, None)
        .await
        .unwrap();
    engine
        .track_interaction(Uuid::new_v4(), book, InteractionType::View, None)
        .await
        .unwrap();

    let trending = engine.get_trending_products(Some(books), 10).await.unwrap();
    assert_eq!(trending.len(), 1);
    assert_eq!(trending[0].product_id, book);
    // unrated window: count surfaces, score stays zero
    assert_eq!(trending[0].trend_score, 0.0);
    assert_eq!(trending[0].recent_interactions, 1);
}

#[tokio::test]
async fn test_similar_products_ranking() {
    let store = Arc::new(InMemoryStore::new());
    let category = Uuid::new_v4();
    let reference = seed_product(
        &store, category, "Laptops", Some("Acme"), Some((100.0, 100.0)), 4.0, 10,
    );
    let close = seed_product(
        &store, category, "Laptops", Some("Acme"), Some((150.0, 150.0)), 4.0, 8,
    );
    let far = seed_product(
        &store, category, "Laptops", Some("Bolt"), Some((900.0, 900.0)), 1.0, 2,
    );

    let engine = engine_over(store);
    let similar = engine.get_similar_products(reference, 10).await.unwrap();

    assert_eq!(similar.len(), 2);
    assert_eq!(similar[0].product_id, close);
    assert_eq!(similar[1].product_id, far);
    // Scenario D: 0.4 + 0.3 + 0.2*(1 - 50/150) + 0.1 = 0.8333
    assert!((similar[0].score - 0.83333).abs() < 1e-3);
    for entry in &similar {
        assert!((0.0..=1.0).contains(&entry.score));
    }
}

#[tokio::test]
async fn test_similar_products_unknown_reference_is_empty() {
    let store = Arc::new(InMemoryStore::new());
    let engine = engine_over(store);

    let similar = engine.get_similar_products(Uuid::new_v4(), 5).await.unwrap();
    assert!(similar.is_empty());
}

#[tokio::test]
async fn test_track_interaction_refreshes_preference_cache() {
    let store = Arc::new(InMemoryStore::new());
    let category = Uuid::new_v4();
    let product = seed_product(&store, category, "Cameras", Some("Acme"), None, 4.0, 5);

    let user = Uuid::new_v4();
    let engine = engine_over(store.clone());

    engine
        .track_interaction(user, product, InteractionType::View, None)
        .await
        .unwrap();
    assert_eq!(engine.preference_model(user).await.unwrap().interaction_count, 1);

    engine
        .track_interaction(user, product, InteractionType::Review, Some(4))
        .await
        .unwrap();
    let model = engine.preference_model(user).await.unwrap();
    assert_eq!(model.interaction_count, 2);
    assert_eq!(model.avg_rating_given, Some(4.0));

    let weight_sum: f64 = model.category_weights.values().sum();
    assert!((weight_sum - 1.0).abs() < 1e-9);
    assert_eq!(store.interaction_count(), 2);
}

#[tokio::test]
async fn test_empty_history_recommendations_are_empty_not_error() {
    let store = Arc::new(InMemoryStore::new());
    let engine = engine_over(store);

    let recommendations = engine
        .get_user_recommendations(Uuid::new_v4(), 10)
        .await
        .unwrap();
    assert!(recommendations.is_empty());
}

#[tokio::test]
async fn test_invalid_input_rejected() {
    let store = Arc::new(InMemoryStore::new());
    let engine = engine_over(store);

    let zero_limit = engine.get_user_recommendations(Uuid::new_v4(), 0).await;
    assert!(matches!(zero_limit, Err(EngineError::InvalidInput(_))));

    let bad_rating = engine
        .track_interaction(Uuid::new_v4(), Uuid::new_v4(), InteractionType::Review, Some(6))
        .await;
    assert!(matches!(bad_rating, Err(EngineError::InvalidInput(_))));

    let nil_user = engine.get_user_analytics(Uuid::nil()).await;
    assert!(matches!(nil_user, Err(EngineError::InvalidInput(_))));
}

#[tokio::test]
async fn test_track_unknown_product_is_not_found() {
    let store = Arc::new(InMemoryStore::new());
    let engine = engine_over(store);

    let result = engine
        .track_interaction(Uuid::new_v4(), Uuid::new_v4(), InteractionType::View, None)
        .await;
    assert!(matches!(result, Err(EngineError::NotFound(_))));
}

#[tokio::test]
async fn test_user_analytics_rollup() {
    let store = Arc::new(InMemoryStore::new());
    let electronics = Uuid::new_v4();
    let books = Uuid::new_v4();
    let phone = seed_product(&store, electronics, "Electronics", None, None, 4.0, 10);
    let novel = seed_product(&store, books, "Books", None, None, 4.5, 20);

    let user = Uuid::new_v4();
    let engine = engine_over(store.clone());
    engine
        .track_interaction(user, phone, InteractionType::View, None)
        .await
        .unwrap();
    engine
        .track_interaction(user, phone, InteractionType::Review, Some(4))
        .await
        .unwrap();
    engine
        .track_interaction(user, novel, InteractionType::Review, Some(2))
        .await
        .unwrap();
    engine
        .track_interaction(user, novel, InteractionType::Purchase, Some(4))
        .await
        .unwrap();

    let analytics = engine.get_user_analytics(user).await.unwrap();
    assert_eq!(analytics.review_count, 2);
    assert_eq!(analytics.interaction_counts[&InteractionType::View], 1);
    assert_eq!(analytics.interaction_counts[&InteractionType::Review], 2);
    assert_eq!(analytics.interaction_counts[&InteractionType::Purchase], 1);
    assert_eq!(analytics.category_counts["Electronics"], 2);
    assert_eq!(analytics.category_counts["Books"], 2);
    assert_eq!(analytics.rating_distribution[&4], 2);
    assert_eq!(analytics.rating_distribution[&2], 1);
    assert!((analytics.average_rating_given.unwrap() - 10.0 / 3.0).abs() < 1e-9);
    assert_eq!(analytics.recent_activity.len(), 4);
    // newest first
    for pair in analytics.recent_activity.windows(2) {
        assert!(pair[0].timestamp >= pair[1].timestamp);
    }
}

#[tokio::test]
async fn test_analytics_for_unknown_user_is_empty() {
    let store = Arc::new(InMemoryStore::new());
    let engine = engine_over(store);

    let analytics = engine.get_user_analytics(Uuid::new_v4()).await.unwrap();
    assert_eq!(analytics.review_count, 0);
    assert!(analytics.recent_activity.is_empty());
}

/// Store stub that fails every call, to exercise outage propagation.
struct FailingStore;

#[async_trait]
impl InteractionStore for FailingStore {
    async fn append_interaction(
        &self,
        _user_id: Uuid,
        _product_id: Uuid,
        _interaction_type: InteractionType,
        _rating: Option<u8>,
    ) -> EngineResult<InteractionEvent> {
        Err(EngineError::store(anyhow::anyhow!("connection refused")))
    }

    async fn get_interactions(&self, _user_id: Uuid) -> EngineResult<Vec<InteractionRecord>> {
        Err(EngineError::store(anyhow::anyhow!("connection refused")))
    }

    async fn get_interactions_since(
        &self,
        _since: DateTime<Utc>,
        _category_id: Option<Uuid>,
    ) -> EngineResult<Vec<InteractionEvent>> {
        Err(EngineError::store(anyhow::anyhow!("connection refused")))
    }

    async fn get_all_user_ids(&self) -> EngineResult<Vec<Uuid>> {
        Err(EngineError::store(anyhow::anyhow!("connection refused")))
    }

    async fn get_product(&self, _product_id: Uuid) -> EngineResult<Option<ProductFeatures>> {
        Err(EngineError::store(anyhow::anyhow!("connection refused")))
    }

    async fn get_active_products_in_category(
        &self,
        _category_id: Uuid,
    ) -> EngineResult<Vec<ProductFeatures>> {
        Err(EngineError::store(anyhow::anyhow!("connection refused")))
    }
}

#[tokio::test]
async fn test_outage_distinguishable_from_empty() {
    let engine = RecommendationEngine::new(
        Arc::new(FailingStore),
        Config::default().recommendation,
    );

    let result = engine.get_user_recommendations(Uuid::new_v4(), 10).await;
    assert!(matches!(result, Err(EngineError::StoreUnavailable(_))));

    let result = engine.get_trending_products(None, 10).await;
    assert!(matches!(result, Err(EngineError::StoreUnavailable(_))));

    assert!(engine.metrics().snapshot().store_errors > 0);
}

/// Delegating store that fails only the collaborative filter's candidate
/// pool, leaving the content-based path healthy.
struct NoNeighborsStore(Arc<InMemoryStore>);

#[async_trait]
impl InteractionStore for NoNeighborsStore {
    async fn append_interaction(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        interaction_type: InteractionType,
        rating: Option<u8>,
    ) -> EngineResult<InteractionEvent> {
        self.0
            .append_interaction(user_id, product_id, interaction_type, rating)
            .await
    }

    async fn get_interactions(&self, user_id: Uuid) -> EngineResult<Vec<InteractionRecord>> {
        self.0.get_interactions(user_id).await
    }

    async fn get_interactions_since(
        &self,
        since: DateTime<Utc>,
        category_id: Option<Uuid>,
    ) -> EngineResult<Vec<InteractionEvent>> {
        self.0.get_interactions_since(since, category_id).await
    }

    async fn get_all_user_ids(&self) -> EngineResult<Vec<Uuid>> {
        Err(EngineError::store(anyhow::anyhow!("neighbor scan timed out")))
    }

    async fn get_product(&self, product_id: Uuid) -> EngineResult<Option<ProductFeatures>> {
        self.0.get_product(product_id).await
    }

    async fn get_active_products_in_category(
        &self,
        category_id: Uuid,
    ) -> EngineResult<Vec<ProductFeatures>> {
        self.0.get_active_products_in_category(category_id).await
    }
}

#[tokio::test]
async fn test_combiner_isolates_failed_signal_source() {
    let inner = Arc::new(InMemoryStore::new());
    let category = Uuid::new_v4();
    let seen = seed_product(&inner, category, "Audio", Some("Acme"), None, 4.0, 5);
    let candidate = seed_product(&inner, category, "Audio", Some("Acme"), None, 4.5, 12);

    let user = Uuid::new_v4();
    let engine = RecommendationEngine::new(
        Arc::new(NoNeighborsStore(inner.clone())),
        Config::default().recommendation,
    );

    engine
        .track_interaction(user, seen, InteractionType::Purchase, Some(5))
        .await
        .unwrap();

    // collaborative side is down, content contribution still flows
    let recommendations = engine.get_user_recommendations(user, 10).await.unwrap();
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0].product_id, candidate);
    assert!(recommendations[0].score > 0.0);
}
