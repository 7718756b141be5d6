use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A single user-product interaction. Append-only: created once, never
/// mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub interaction_type: InteractionType,
    /// Explicit rating (1..=5) attached to review/purchase interactions.
    pub rating: Option<u8>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
    View,
    Search,
    Review,
    Purchase,
}

impl InteractionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::View => "view",
            InteractionType::Search => "search",
            InteractionType::Review => "review",
            InteractionType::Purchase => "purchase",
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(InteractionType::View),
            "search" => Ok(InteractionType::Search),
            "review" => Ok(InteractionType::Review),
            "purchase" => Ok(InteractionType::Purchase),
            other => Err(format!("unknown interaction type: {}", other)),
        }
    }
}

/// Catalog features of a product, as the algorithms see them. Drawn from
/// the product record joined with its category; recomputed per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductFeatures {
    pub product_id: Uuid,
    pub category_id: Uuid,
    pub category_name: String,
    pub brand: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub average_rating: f64,
    pub review_count: u32,
    pub is_active: bool,
}

impl ProductFeatures {
    pub fn new(product_id: Uuid, category_id: Uuid, category_name: impl Into<String>) -> Self {
        Self {
            product_id,
            category_id,
            category_name: category_name.into(),
            brand: None,
            price_min: None,
            price_max: None,
            average_rating: 0.0,
            review_count: 0,
            is_active: true,
        }
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_price_range(mut self, min: f64, max: f64) -> Self {
        self.price_min = Some(min);
        self.price_max = Some(max);
        self
    }

    pub fn with_rating(mut self, average_rating: f64, review_count: u32) -> Self {
        self.average_rating = average_rating;
        self.review_count = review_count;
        self
    }

    /// Midpoint of the price range, if both bounds are set.
    pub fn avg_price(&self) -> Option<f64> {
        match (self.price_min, self.price_max) {
            (Some(min), Some(max)) => Some((min + max) / 2.0),
            _ => None,
        }
    }
}

/// An interaction event joined with the referenced product's catalog
/// features, as returned by the store for preference computation.
#[derive(Debug, Clone)]
pub struct InteractionRecord {
    pub event: InteractionEvent,
    pub product: ProductFeatures,
}

/// Per-user preference summary derived from weighted interaction history.
/// Category and brand weights are normalized to sum to 1.0 when non-empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreferenceModel {
    pub category_weights: HashMap<Uuid, f64>,
    /// Display names for the categories in `category_weights`.
    pub category_names: HashMap<Uuid, String>,
    pub brand_weights: HashMap<String, f64>,
    pub avg_price_preference: Option<f64>,
    pub avg_rating_given: Option<f64>,
    pub interaction_count: usize,
}

/// A product id paired with a raw algorithm score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredProduct {
    pub product_id: Uuid,
    pub score: f64,
}

/// One entry of a combined recommendation list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub product_id: Uuid,
    pub score: f64,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingProduct {
    pub product_id: Uuid,
    pub trend_score: f64,
    /// Interaction volume inside the trailing window.
    pub recent_interactions: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentActivity {
    #[serde(rename = "type")]
    pub interaction_type: InteractionType,
    pub product_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub rating: Option<u8>,
}

/// Read-only rollup of a single user's interaction history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAnalytics {
    pub user_id: Uuid,
    pub review_count: u64,
    pub interaction_counts: HashMap<InteractionType, u64>,
    pub category_counts: HashMap<String, u64>,
    pub rating_distribution: BTreeMap<u8, u64>,
    pub average_rating_given: Option<f64>,
    pub recent_activity: Vec<RecentActivity>,
}

impl UserAnalytics {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            review_count: 0,
            interaction_counts: HashMap::new(),
            category_counts: HashMap::new(),
            rating_distribution: BTreeMap::new(),
            average_rating_given: None,
            recent_activity: Vec::new(),
        }
    }
}
