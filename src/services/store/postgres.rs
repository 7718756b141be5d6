use crate::config::DatabaseConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::*;
use crate::services::store::InteractionStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::str::FromStr;
use uuid::Uuid;

/// Postgres-backed interaction store. Expects the ReviewHub schema:
/// `user_interactions`, `products`, and `categories` tables.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(config: &DatabaseConfig) -> EngineResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn event_from_row(row: &PgRow) -> EngineResult<InteractionEvent> {
    let type_str: String = row.try_get("interaction_type")?;
    let interaction_type = InteractionType::from_str(&type_str)
        .map_err(|e| EngineError::store(anyhow::anyhow!(e)))?;

    Ok(InteractionEvent {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        product_id: row.try_get("product_id")?,
        interaction_type,
        rating: row.try_get::<Option<i16>, _>("rating")?.map(|r| r as u8),
        timestamp: row.try_get("created_at")?,
    })
}

fn product_from_row(row: &PgRow) -> EngineResult<ProductFeatures> {
    Ok(ProductFeatures {
        product_id: row.try_get("p_id")?,
        category_id: row.try_get("category_id")?,
        category_name: row.try_get("category_name")?,
        brand: row.try_get("brand")?,
        price_min: row.try_get("price_min")?,
        price_max: row.try_get("price_max")?,
        average_rating: row.try_get("average_rating")?,
        review_count: row.try_get::<i32, _>("review_count")? as u32,
        is_active: row.try_get("is_active")?,
    })
}

const PRODUCT_COLUMNS: &str = "p.id AS p_id, p.category_id, c.name AS category_name, p.brand, \
     p.price_min, p.price_max, p.average_rating, p.review_count, p.is_active";

#[async_trait]
impl InteractionStore for PostgresStore {
    async fn append_interaction(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        interaction_type: InteractionType,
        rating: Option<u8>,
    ) -> EngineResult<InteractionEvent> {
        let event = InteractionEvent {
            id: Uuid::new_v4(),
            user_id,
            product_id,
            interaction_type,
            rating,
            timestamp: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO user_interactions \
                 (id, user_id, product_id, interaction_type, rating, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(event.id)
        .bind(event.user_id)
        .bind(event.product_id)
        .bind(event.interaction_type.as_str())
        .bind(event.rating.map(|r| r as i16))
        .bind(event.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(event)
    }

    async fn get_interactions(&self, user_id: Uuid) -> EngineResult<Vec<InteractionRecord>> {
        let sql = format!(
            "SELECT i.id, i.user_id, i.product_id, i.interaction_type, i.rating, i.created_at, \
                    {PRODUCT_COLUMNS} \
             FROM user_interactions i \
             JOIN products p ON p.id = i.product_id \
             JOIN categories c ON c.id = p.category_id \
             WHERE i.user_id = $1 \
             ORDER BY i.created_at"
        );

        let rows = sqlx::query(&sql).bind(user_id).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| {
                Ok(InteractionRecord {
                    event: event_from_row(row)?,
                    product: product_from_row(row)?,
                })
            })
            .collect()
    }

    async fn get_interactions_since(
        &self,
        since: DateTime<Utc>,
        category_id: Option<Uuid>,
    ) -> EngineResult<Vec<InteractionEvent>> {
        let rows = match category_id {
            Some(category) => {
                sqlx::query(
                    "SELECT i.id, i.user_id, i.product_id, i.interaction_type, i.rating, \
                            i.created_at \
                     FROM user_interactions i \
                     JOIN products p ON p.id = i.product_id \
                     WHERE i.created_at >= $1 AND p.category_id = $2",
                )
                .bind(since)
                .bind(category)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT id, user_id, product_id, interaction_type, rating, created_at \
                     FROM user_interactions \
                     WHERE created_at >= $1",
                )
                .bind(since)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(event_from_row).collect()
    }

    async fn get_all_user_ids(&self) -> EngineResult<Vec<Uuid>> {
        let rows = sqlx::query("SELECT DISTINCT user_id FROM user_interactions")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| row.try_get("user_id").map_err(EngineError::from))
            .collect()
    }

    async fn get_product(&self, product_id: Uuid) -> EngineResult<Option<ProductFeatures>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} \
             FROM products p \
             JOIN categories c ON c.id = p.category_id \
             WHERE p.id = $1"
        );

        let row = sqlx::query(&sql)
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(product_from_row).transpose()
    }

    async fn get_active_products_in_category(
        &self,
        category_id: Uuid,
    ) -> EngineResult<Vec<ProductFeatures>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} \
             FROM products p \
             JOIN categories c ON c.id = p.category_id \
             WHERE p.category_id = $1 AND p.is_active \
             ORDER BY p.id"
        );

        let rows = sqlx::query(&sql)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(product_from_row).collect()
    }
}
