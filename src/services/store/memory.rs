use crate::error::{EngineError, EngineResult};
use crate::models::*;
use crate::services::store::InteractionStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory interaction store backed by a `parking_lot` lock. Used by
/// tests, benches, and the demo; behaves like the Postgres store minus
/// durability.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    products: HashMap<Uuid, ProductFeatures>,
    interactions: Vec<InteractionEvent>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_product(&self, product: ProductFeatures) {
        self.inner.write().products.insert(product.product_id, product);
    }

    /// Insert an event directly, bypassing append validation. Test helper
    /// for backdated histories.
    pub fn insert_event(&self, event: InteractionEvent) {
        self.inner.write().interactions.push(event);
    }

    pub fn interaction_count(&self) -> usize {
        self.inner.read().interactions.len()
    }
}

#[async_trait]
impl InteractionStore for InMemoryStore {
    async fn append_interaction(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        interaction_type: InteractionType,
        rating: Option<u8>,
    ) -> EngineResult<InteractionEvent> {
        let mut inner = self.inner.write();

        if !inner.products.contains_key(&product_id) {
            return Err(EngineError::NotFound("product"));
        }

        let event = InteractionEvent {
            id: Uuid::new_v4(),
            user_id,
            product_id,
            interaction_type,
            rating,
            timestamp: Utc::now(),
        };

        inner.interactions.push(event.clone());
        Ok(event)
    }

    async fn get_interactions(&self, user_id: Uuid) -> EngineResult<Vec<InteractionRecord>> {
        let inner = self.inner.read();

        let records = inner
            .interactions
            .iter()
            .filter(|event| event.user_id == user_id)
            .filter_map(|event| {
                inner.products.get(&event.product_id).map(|product| InteractionRecord {
                    event: event.clone(),
                    product: product.clone(),
                })
            })
            .collect();

        Ok(records)
    }

    async fn get_interactions_since(
        &self,
        since: DateTime<Utc>,
        category_id: Option<Uuid>,
    ) -> EngineResult<Vec<InteractionEvent>> {
        let inner = self.inner.read();

        let events = inner
            .interactions
            .iter()
            .filter(|event| event.timestamp >= since)
            .filter(|event| match category_id {
                Some(category) => inner
                    .products
                    .get(&event.product_id)
                    .map(|p| p.category_id == category)
                    .unwrap_or(false),
                None => true,
            })
            .cloned()
            .collect();

        Ok(events)
    }

    async fn get_all_user_ids(&self) -> EngineResult<Vec<Uuid>> {
        let inner = self.inner.read();

        let mut user_ids: Vec<Uuid> = inner
            .interactions
            .iter()
            .map(|event| event.user_id)
            .collect();
        user_ids.sort();
        user_ids.dedup();

        Ok(user_ids)
    }

    async fn get_product(&self, product_id: Uuid) -> EngineResult<Option<ProductFeatures>> {
        Ok(self.inner.read().products.get(&product_id).cloned())
    }

    async fn get_active_products_in_category(
        &self,
        category_id: Uuid,
    ) -> EngineResult<Vec<ProductFeatures>> {
        let inner = self.inner.read();

        let mut products: Vec<ProductFeatures> = inner
            .products
            .values()
            .filter(|p| p.category_id == category_id && p.is_active)
            .cloned()
            .collect();
        products.sort_by_key(|p| p.product_id);

        Ok(products)
    }
}
