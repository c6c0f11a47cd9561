use axum::{
    extract::{Path, Query},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use std::collections::HashMap;

use super::crud;
use crate::api::ApiResult;
use crate::models::Booking;

pub fn routes() -> Router {
    Router::new()
        .route("/api/bookings", get(list_bookings).post(create_booking))
        .route(
            "/api/bookings/:id",
            get(get_booking).patch(update_booking).delete(delete_booking),
        )
}

pub async fn list_bookings(Query(params): Query<HashMap<String, String>>) -> ApiResult {
    crud::list::<Booking>(params, vec![]).await
}

pub async fn get_booking(Path(id): Path<String>) -> ApiResult {
    crud::get_one::<Booking>(super::parse_id(&id)?, None).await
}

pub async fn create_booking(Json(payload): Json<Value>) -> ApiResult {
    crud::create::<Booking>(payload).await
}

pub async fn update_booking(Path(id): Path<String>, Json(payload): Json<Value>) -> ApiResult {
    crud::update::<Booking>(super::parse_id(&id)?, payload).await
}

pub async fn delete_booking(Path(id): Path<String>) -> ApiResult {
    crud::delete::<Booking>(super::parse_id(&id)?).await
}
