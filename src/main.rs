use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use clap::Parser;
use reviewrec::utils::metrics::MetricsSnapshot;
use reviewrec::{init_tracing, AppState, Config, EngineError, InteractionType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct TrendingQuery {
    category_id: Option<Uuid>,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct TrackInteractionRequest {
    user_id: Uuid,
    product_id: Uuid,
    interaction_type: InteractionType,
    rating: Option<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    message: String,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: "Success".to_string(),
        }
    }
}

fn status_for(error: &EngineError) -> StatusCode {
    match error {
        EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

async fn health_check() -> Json<ApiResponse<HashMap<String, String>>> {
    let mut status = HashMap::new();
    status.insert("status".to_string(), "healthy".to_string());
    status.insert("service".to_string(), "reviewrec".to_string());
    status.insert("version".to_string(), env!("CARGO_PKG_VERSION").to_string());

    Json(ApiResponse::success(status))
}

async fn get_metrics(State(state): State<AppState>) -> Json<ApiResponse<MetricsSnapshot>> {
    Json(ApiResponse::success(state.engine.metrics().snapshot()))
}

async fn track_interaction(
    State(state): State<AppState>,
    Json(request): Json<TrackInteractionRequest>,
) -> Result<Json<ApiResponse<String>>, StatusCode> {
    match state
        .engine
        .track_interaction(
            request.user_id,
            request.product_id,
            request.interaction_type,
            request.rating,
        )
        .await
    {
        Ok(()) => Ok(Json(ApiResponse::success(
            "Interaction recorded".to_string(),
        ))),
        Err(e) => {
            tracing::error!("Failed to track interaction: {}", e);
            Err(status_for(&e))
        }
    }
}

async fn get_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<reviewrec::RecommendationItem>>>, StatusCode> {
    match state
        .engine
        .get_user_recommendations(user_id, params.limit.unwrap_or(10))
        .await
    {
        Ok(recommendations) => Ok(Json(ApiResponse::success(recommendations))),
        Err(e) => {
            tracing::error!("Failed to get recommendations: {}", e);
            Err(status_for(&e))
        }
    }
}

async fn get_similar_products(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<reviewrec::ScoredProduct>>>, StatusCode> {
    match state
        .engine
        .get_similar_products(product_id, params.limit.unwrap_or(5))
        .await
    {
        Ok(similar) => Ok(Json(ApiResponse::success(similar))),
        Err(e) => {
            tracing::error!("Failed to get similar products: {}", e);
            Err(status_for(&e))
        }
    }
}

async fn get_trending_products(
    State(state): State<AppState>,
    Query(params): Query<TrendingQuery>,
) -> Result<Json<ApiResponse<Vec<reviewrec::TrendingProduct>>>, StatusCode> {
    match state
        .engine
        .get_trending_products(params.category_id, params.limit.unwrap_or(10))
        .await
    {
        Ok(trending) => Ok(Json(ApiResponse::success(trending))),
        Err(e) => {
            tracing::error!("Failed to get trending products: {}", e);
            Err(status_for(&e))
        }
    }
}

async fn get_user_analytics(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<reviewrec::UserAnalytics>>, StatusCode> {
    match state.engine.get_user_analytics(user_id).await {
        Ok(analytics) => Ok(Json(ApiResponse::success(analytics))),
        Err(e) => {
            tracing::error!("Failed to get user analytics: {}", e);
            Err(status_for(&e))
        }
    }
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(get_metrics))
        .route("/interactions", post(track_interaction))
        .route("/recommendations/:user_id", get(get_recommendations))
        .route("/products/:product_id/similar", get(get_similar_products))
        .route("/trending", get(get_trending_products))
        .route("/users/:user_id/analytics", get(get_user_analytics))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    std::env::set_var("RUST_LOG", &args.log_level);
    init_tracing().await;

    let config = if std::path::Path::new(&args.config).exists() {
        Config::from_file(&args.config)?
    } else {
        info!("Config file not found, using default configuration");
        Config::default()
    };

    info!("Starting reviewrec server with config: {:?}", config.server);

    let state = AppState::new(config.clone()).await?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.server.socket_addr()).await?;
    info!("Server listening on {}", config.server.socket_addr());

    axum::serve(listener, app).await?;

    Ok(())
}
