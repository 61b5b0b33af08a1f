//! Readiness endpoint

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use database::postgres::check_health;

use crate::state::{AppState, Storage};

async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let check: HealthCheckFuture = match &state.storage {
        Storage::Postgres(db) => {
            let db = db.clone();
            Box::pin(async move { check_health(&db).await.map_err(|e| e.to_string()) })
        }
        Storage::Memory(_) => Box::pin(async { Ok(()) }),
    };

    run_health_checks(vec![("storage", check)]).await
}

/// Router exposing `GET /ready`
pub fn router(state: AppState) -> Router {
    Router::new().route("/ready", get(ready)).with_state(state)
}
