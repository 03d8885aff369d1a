use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_item, get_item, get_user, list_items, list_loans, refresh, update_item,
    update_item_image, update_status,
};

/// Creates the API router with all admin dashboard endpoints
///
/// Loan endpoints:
/// - GET /loans - List loans with filters and pagination
/// - POST /loans/refresh - Refetch the loan snapshot from the backend
/// - PUT /loans/:id/status - Update a loan status
///
/// Item endpoints:
/// - GET /items, POST /items
/// - GET /items/:id, PUT /items/:id, PUT /items/:id/image
///
/// User endpoints:
/// - GET /users/:id - User profile with loan history
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Loan endpoints
        .route("/loans", get(list_loans))
        .route("/loans/refresh", post(refresh))
        .route("/loans/:id/status", put(update_status))
        // Item endpoints
        .route("/items", get(list_items).post(create_item))
        .route("/items/:id", get(get_item).put(update_item))
        .route("/items/:id/image", put(update_item_image))
        // User endpoints
        .route("/users/:id", get(get_user))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
