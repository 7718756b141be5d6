use crate::models::InteractionType;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub recommendation: RecommendationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port).parse().unwrap()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Tuning knobs for the recommendation algorithms. Defaults match the
/// production values; every constant the scoring formulas use lives here
/// so experiments don't require code changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    /// Per-interaction-type weights used by the preference model and the
    /// collaborative filter.
    pub view_weight: f64,
    pub search_weight: f64,
    pub review_weight: f64,
    pub purchase_weight: f64,

    /// Minimum Jaccard similarity for a user to count as a neighbor.
    pub similarity_floor: f64,
    /// How many of the most similar users propagate signal.
    pub neighbor_limit: usize,
    /// Candidate pool size requested from each filter, as a multiple of
    /// the final limit.
    pub candidate_multiplier: usize,

    /// Combiner split between the two signal sources.
    pub collaborative_weight: f64,
    pub content_weight: f64,

    /// Term weights of the pairwise product similarity score.
    pub category_similarity_weight: f64,
    pub brand_similarity_weight: f64,
    pub price_similarity_weight: f64,
    pub rating_similarity_weight: f64,

    /// Trailing window for trend scoring, in days.
    pub trending_window_days: i64,

    /// Thresholds for recommendation reason strings.
    pub highly_rated_threshold: f64,
    pub popular_review_count: u32,

    /// Upper bound on any requested result size.
    pub max_limit: usize,
}

impl RecommendationConfig {
    pub fn interaction_weight(&self, interaction_type: InteractionType) -> f64 {
        match interaction_type {
            InteractionType::View => self.view_weight,
            InteractionType::Search => self.search_weight,
            InteractionType::Review => self.review_weight,
            InteractionType::Purchase => self.purchase_weight,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                workers: num_cpus::get(),
            },
            database: DatabaseConfig {
                url: "postgresql://localhost:5432/reviewrec".to_string(),
                max_connections: 10,
            },
            recommendation: RecommendationConfig::default(),
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            view_weight: 1.0,
            search_weight: 1.5,
            review_weight: 3.0,
            purchase_weight: 5.0,
            similarity_floor: 0.1,
            neighbor_limit: 10,
            candidate_multiplier: 2,
            collaborative_weight: 0.6,
            content_weight: 0.4,
            category_similarity_weight: 0.4,
            brand_similarity_weight: 0.3,
            price_similarity_weight: 0.2,
            rating_similarity_weight: 0.1,
            trending_window_days: 7,
            highly_rated_threshold: 4.0,
            popular_review_count: 10,
            max_limit: 100,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("REVIEWREC"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let config = RecommendationConfig::default();
        assert_eq!(config.interaction_weight(InteractionType::View), 1.0);
        assert_eq!(config.interaction_weight(InteractionType::Search), 1.5);
        assert_eq!(config.interaction_weight(InteractionType::Review), 3.0);
        assert_eq!(config.interaction_weight(InteractionType::Purchase), 5.0);
        assert_eq!(config.collaborative_weight + config.content_weight, 1.0);
    }
}
