use crate::error::EngineResult;
use crate::models::*;
use crate::services::store::InteractionStore;
use crate::utils::mean;
use uuid::Uuid;

/// Read-only rollup of one user's interaction history. Call-time
/// aggregation, no caching: per-user histories are small.
pub async fn user_analytics(
    store: &dyn InteractionStore,
    user_id: Uuid,
) -> EngineResult<UserAnalytics> {
    let records = store.get_interactions(user_id).await?;
    if records.is_empty() {
        return Ok(UserAnalytics::empty(user_id));
    }

    let mut analytics = UserAnalytics::empty(user_id);
    let mut ratings = Vec::new();

    for record in &records {
        let event = &record.event;

        *analytics
            .interaction_counts
            .entry(event.interaction_type)
            .or_insert(0) += 1;

        *analytics
            .category_counts
            .entry(record.product.category_name.clone())
            .or_insert(0) += 1;

        if event.interaction_type == InteractionType::Review {
            analytics.review_count += 1;
        }

        if let Some(rating) = event.rating {
            *analytics.rating_distribution.entry(rating).or_insert(0) += 1;
            ratings.push(rating as f64);
        }
    }

    analytics.average_rating_given = mean(&ratings);

    let mut events: Vec<&InteractionEvent> = records.iter().map(|r| &r.event).collect();
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    analytics.recent_activity = events
        .into_iter()
        .take(10)
        .map(|event| RecentActivity {
            interaction_type: event.interaction_type,
            product_id: event.product_id,
            timestamp: event.timestamp,
            rating: event.rating,
        })
        .collect();

    Ok(analytics)
}
