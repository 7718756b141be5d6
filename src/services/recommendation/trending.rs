use crate::config::RecommendationConfig;
use crate::error::EngineResult;
use crate::models::TrendingProduct;
use crate::services::store::InteractionStore;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Default)]
struct WindowStats {
    count: u64,
    rating_sum: f64,
    rating_count: u64,
}

impl WindowStats {
    fn avg_rating(&self) -> f64 {
        if self.rating_count == 0 {
            0.0
        } else {
            self.rating_sum / self.rating_count as f64
        }
    }
}

/// Trend ranking over the trailing window:
/// `score = interaction_count * (avg_rating / 5)`. Products whose window
/// holds only unrated events keep score 0.0 but still surface with their
/// interaction count.
pub async fn trending_products(
    store: &dyn InteractionStore,
    config: &RecommendationConfig,
    category_id: Option<Uuid>,
    limit: usize,
) -> EngineResult<Vec<TrendingProduct>> {
    let cutoff = Utc::now() - Duration::days(config.trending_window_days);
    let events = store.get_interactions_since(cutoff, category_id).await?;

    let mut stats: HashMap<Uuid, WindowStats> = HashMap::new();
    for event in &events {
        let entry = stats.entry(event.product_id).or_default();
        entry.count += 1;
        if let Some(rating) = event.rating {
            entry.rating_sum += rating as f64;
            entry.rating_count += 1;
        }
    }

    let mut trending: Vec<TrendingProduct> = stats
        .into_iter()
        .map(|(product_id, stats)| TrendingProduct {
            product_id,
            trend_score: stats.count as f64 * (stats.avg_rating() / 5.0),
            recent_interactions: stats.count,
        })
        .collect();

    trending.sort_by(|a, b| {
        b.trend_score
            .partial_cmp(&a.trend_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    trending.truncate(limit);

    Ok(trending)
}
