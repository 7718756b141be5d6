use rand::Rng;
use reviewrec::*;
use std::sync::Arc;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing().await;

    println!("reviewrec engine walkthrough");

    // 1. Seed an in-memory catalog
    let store = Arc::new(InMemoryStore::new());
    let mut rng = rand::thread_rng();

    let categories = [
        (Uuid::new_v4(), "Electronics"),
        (Uuid::new_v4(), "Books"),
        (Uuid::new_v4(), "Kitchen"),
    ];
    let brands = ["Acme", "Bolt", "Inkwell"];

    let mut product_ids = Vec::new();
    for i in 0..30 {
        let (category_id, category_name) = categories[i % categories.len()];
        let product_id = Uuid::new_v4();
        let base_price: f64 = rng.gen_range(10.0..500.0);

        store.add_product(
            ProductFeatures::new(product_id, category_id, category_name)
                .with_brand(brands[i % brands.len()])
                .with_price_range(base_price, base_price * 1.2)
                .with_rating(rng.gen_range(2.0..5.0), rng.gen_range(0..50)),
        );
        product_ids.push(product_id);
    }
    println!("seeded {} products across {} categories", product_ids.len(), categories.len());

    // 2. Wire up the engine
    let engine = RecommendationEngine::new(store, Config::default().recommendation);

    // 3. Record some behavior for two users with overlapping tastes
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    for &product in &product_ids[0..5] {
        engine
            .track_interaction(alice, product, InteractionType::View, None)
            .await?;
    }
    engine
        .track_interaction(alice, product_ids[0], InteractionType::Purchase, Some(5))
        .await?;

    for &product in &product_ids[2..8] {
        engine
            .track_interaction(bob, product, InteractionType::Review, Some(4))
            .await?;
    }
    println!("tracked interactions for two users");

    // 4. Personalized recommendations
    let recommendations = engine.get_user_recommendations(alice, 5).await?;
    println!("\ntop recommendations for alice:");
    for (i, item) in recommendations.iter().enumerate() {
        println!("  {}. {} (score {:.3})", i + 1, item.product_id, item.score);
        for reason in &item.reasons {
            println!("       - {}", reason);
        }
    }

    // 5. Similar products
    let similar = engine.get_similar_products(product_ids[0], 3).await?;
    println!("\nproducts similar to {}:", product_ids[0]);
    for entry in &similar {
        println!("  {} (similarity {:.3})", entry.product_id, entry.score);
    }

    // 6. Trending
    let trending = engine.get_trending_products(None, 5).await?;
    println!("\ntrending this week:");
    for entry in &trending {
        println!(
            "  {} (score {:.2}, {} interactions)",
            entry.product_id, entry.trend_score, entry.recent_interactions
        );
    }

    // 7. Analytics
    let analytics = engine.get_user_analytics(alice).await?;
    println!("\nalice's analytics:");
    println!("  interactions: {:?}", analytics.interaction_counts);
    println!("  categories:   {:?}", analytics.category_counts);
    println!("  avg rating:   {:?}", analytics.average_rating_given);

    println!("\nengine counters: {:?}", engine.metrics().snapshot());

    Ok(())
}
