use axum::{
    extract::{Path, Query},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use std::collections::HashMap;

use super::crud;
use crate::api::ApiResult;
use crate::models::Review;
use crate::query::{CompareOp, Condition, ScalarValue};

pub fn routes() -> Router {
    Router::new()
        .route("/api/reviews", get(list_reviews).post(create_review))
        .route(
            "/api/reviews/:id",
            get(get_review).patch(update_review).delete(delete_review),
        )
        // Nested resource: reviews of one tour. The segment is named :id to
        // line up with the tour routes; routers conflict otherwise.
        .route(
            "/api/tours/:id/reviews",
            get(list_tour_reviews).post(create_tour_review),
        )
}

pub async fn list_reviews(Query(params): Query<HashMap<String, String>>) -> ApiResult {
    crud::list::<Review>(params, vec![]).await
}

pub async fn get_review(Path(id): Path<String>) -> ApiResult {
    crud::get_one::<Review>(super::parse_id(&id)?, None).await
}

pub async fn create_review(Json(payload): Json<Value>) -> ApiResult {
    crud::create::<Review>(payload).await
}

pub async fn update_review(Path(id): Path<String>, Json(payload): Json<Value>) -> ApiResult {
    crud::update::<Review>(super::parse_id(&id)?, payload).await
}

pub async fn delete_review(Path(id): Path<String>) -> ApiResult {
    crud::delete::<Review>(super::parse_id(&id)?).await
}

/// Nested list: scope-filtered to the tour in the path, merged before the
/// client's own filters.
pub async fn list_tour_reviews(
    Path(tour_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let tour_id = super::parse_id(&tour_id)?;
    let scope = Condition {
        field: "tour_id".to_string(),
        op: CompareOp::Eq,
        value: ScalarValue::Uuid(tour_id),
    };
    crud::list::<Review>(params, vec![scope]).await
}

/// Nested create: the tour reference comes from the path when the payload
/// does not carry one.
pub async fn create_tour_review(
    Path(tour_id): Path<String>,
    Json(mut payload): Json<Value>,
) -> ApiResult {
    let tour_id = super::parse_id(&tour_id)?;
    if let Some(fields) = payload.as_object_mut() {
        fields
            .entry("tour_id".to_string())
            .or_insert_with(|| Value::String(tour_id.to_string()));
    }
    crud::create::<Review>(payload).await
}
