pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::clients::handlers;
use crate::dashboard;
use crate::state::AppState;

/// CV uploads carry whole documents; the axum default (2 MB) is too small.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Clients API
        .route(
            "/api/v1/clients",
            get(handlers::handle_list_clients).post(handlers::handle_create_client),
        )
        .route(
            "/api/v1/clients/:id",
            get(handlers::handle_get_client)
                .put(handlers::handle_update_client)
                .delete(handlers::handle_delete_client),
        )
        .route(
            "/api/v1/clients/:id/interactions",
            post(handlers::handle_add_interaction),
        )
        .route(
            "/api/v1/clients/:id/analyze",
            post(handlers::handle_analyze_client),
        )
        .route("/api/v1/clients/:id/cv", post(handlers::handle_upload_cv))
        // Dashboard API
        .route("/api/v1/dashboard/summary", get(dashboard::handle_summary))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
