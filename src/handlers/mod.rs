pub mod bookings;
pub mod crud;
pub mod reviews;
pub mod tours;
pub mod users;

use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::error::ApiError;

/// Assemble the full application router.
pub fn app() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(tours::routes())
        .merge(users::routes())
        .merge(reviews::routes())
        .merge(bookings::routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Path identifiers are parsed by hand so a malformed id renders the
/// regular error envelope instead of a framework rejection.
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("Invalid ID: {}", raw)))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "status": "success",
        "data": {
            "name": "Wayfarer API",
            "version": version,
            "description": "Tour booking platform REST API",
            "endpoints": {
                "home": "/",
                "health": "/health",
                "tours": "/api/tours[/:id]",
                "tour_aliases": "/api/tours/top-5-cheap, /api/tours/stats, /api/tours/monthly-plan/:year",
                "tour_geo": "/api/tours/within/:distance/center/:latlng/unit/:unit, /api/tours/distances/:latlng/unit/:unit",
                "tour_reviews": "/api/tours/:tour_id/reviews",
                "users": "/api/users[/:id]",
                "reviews": "/api/reviews[/:id]",
                "bookings": "/api/bookings[/:id]",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "success",
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "error",
                "message": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
