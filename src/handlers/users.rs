use axum::{
    extract::{Path, Query},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use std::collections::HashMap;

use super::crud;
use crate::api::ApiResult;
use crate::models::User;

pub fn routes() -> Router {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/:id", get(get_user).patch(update_user).delete(delete_user))
}

pub async fn list_users(Query(params): Query<HashMap<String, String>>) -> ApiResult {
    crud::list::<User>(params, vec![]).await
}

pub async fn get_user(Path(id): Path<String>) -> ApiResult {
    crud::get_one::<User>(super::parse_id(&id)?, None).await
}

pub async fn create_user(Json(payload): Json<Value>) -> ApiResult {
    crud::create::<User>(payload).await
}

pub async fn update_user(Path(id): Path<String>, Json(payload): Json<Value>) -> ApiResult {
    crud::update::<User>(super::parse_id(&id)?, payload).await
}

pub async fn delete_user(Path(id): Path<String>) -> ApiResult {
    crud::delete::<User>(super::parse_id(&id)?).await
}
