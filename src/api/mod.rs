use crate::service::IntelligenceService;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

pub mod handlers;
pub mod responses;

pub fn router(service: Arc<IntelligenceService>) -> Router {
    Router::new()
        .route("/spot-intelligence", get(handlers::get_spot_intelligence))
        .route("/api/health", get(handlers::get_health))
        .with_state(service)
}
