use crate::error::EngineResult;
use crate::models::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

/// Narrow repository interface over the interaction log and the product
/// catalog. The engine's algorithms depend only on this trait and the
/// plain records it returns, never on a live database session.
#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// Append one interaction event to the durable log.
    async fn append_interaction(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        interaction_type: InteractionType,
        rating: Option<u8>,
    ) -> EngineResult<InteractionEvent>;

    /// All interactions of one user, joined with each referenced
    /// product's catalog features.
    async fn get_interactions(&self, user_id: Uuid) -> EngineResult<Vec<InteractionRecord>>;

    /// Interactions newer than `since`, optionally scoped to a category.
    async fn get_interactions_since(
        &self,
        since: DateTime<Utc>,
        category_id: Option<Uuid>,
    ) -> EngineResult<Vec<InteractionEvent>>;

    /// Every user id that has at least one interaction on record.
    async fn get_all_user_ids(&self) -> EngineResult<Vec<Uuid>>;

    async fn get_product(&self, product_id: Uuid) -> EngineResult<Option<ProductFeatures>>;

    async fn get_active_products_in_category(
        &self,
        category_id: Uuid,
    ) -> EngineResult<Vec<ProductFeatures>>;
}
