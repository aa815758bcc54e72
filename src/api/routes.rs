use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::config::CorsConfig;
use crate::counter::Counter;

use super::cors::cors_layer;
use super::handlers::{get_visits, health_check, register_visit, AppState};

pub fn create_api_router(counter: Arc<dyn Counter>, cors: &CorsConfig) -> Router {
    let state = Arc::new(AppState { counter });

    let router = Router::new()
        .route("/health", get(health_check))
        .route("/visits/new", post(register_visit))
        .route("/visits/stats", get(get_visits))
        .with_state(state);

    if cors.enabled {
        router.layer(cors_layer())
    } else {
        router
    }
}
