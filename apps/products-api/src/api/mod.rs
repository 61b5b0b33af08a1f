//! API routes module

pub mod health;
pub mod products;

use axum::Router;
use axum_helpers::server::{create_router_with_cors, health_router};
use tower_http::cors::CorsLayer;

use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Routes nested under `/api`
pub fn routes(state: &AppState) -> Router {
    Router::new().nest("/products", products::router(state))
}

/// Full application: API, docs, middleware, `/health` and `/ready`
pub fn app(state: &AppState, cors: CorsLayer) -> Router {
    let root_routes = health_router(state.config.app).merge(health::router(state.clone()));
    create_router_with_cors::<ApiDoc>(routes(state), root_routes, cors)
}
