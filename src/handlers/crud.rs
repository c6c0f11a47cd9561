use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use crate::api::{ApiResult, Envelope};
use crate::config::config;
use crate::database::Repository;
use crate::error::ApiError;
use crate::models::{writable_subset, Expansion, Resource, ValidationMode};
use crate::query::{Condition, QuerySpec};

// Generic implementations of the five standard operations. The per-entity
// handler modules bind these to routes; everything here is parameterized
// only by the Resource contract.

/// List records: translate the query string, merge any scope conditions
/// ahead of it, execute, envelope with a result count.
pub async fn list<T: Resource>(
    params: HashMap<String, String>,
    scope: Vec<Condition>,
) -> ApiResult {
    let spec = QuerySpec::from_params(&params, T::COLUMNS, &config().query)?;
    let repo = Repository::<T>::connect().await?;
    let records = repo.find(scope, spec).await?;
    Ok(Envelope::list(records))
}

/// Fetch one record by id, optionally inlining related records.
pub async fn get_one<T: Resource>(id: Uuid, expansion: Option<Expansion>) -> ApiResult {
    let repo = Repository::<T>::connect().await?;
    match repo.find_by_id(id, expansion.as_ref()).await? {
        Some(record) => Ok(Envelope::record(record)),
        None => Err(not_found()),
    }
}

/// Create a record from the request payload: reduce to writable columns,
/// validate, insert, return the stored record.
pub async fn create<T: Resource>(payload: Value) -> ApiResult {
    let fields = payload
        .as_object()
        .map(writable_subset::<T>)
        .ok_or_else(|| ApiError::bad_request("request body must be a JSON object"))?;
    T::validate(&fields, ValidationMode::Create)?;
    let repo = Repository::<T>::connect().await?;
    let record = repo.insert(fields).await?;
    Ok(Envelope::created(record))
}

/// Partial update by id; validation rules re-run on the supplied fields.
pub async fn update<T: Resource>(id: Uuid, payload: Value) -> ApiResult {
    let fields = payload
        .as_object()
        .map(writable_subset::<T>)
        .ok_or_else(|| ApiError::bad_request("request body must be a JSON object"))?;
    if fields.is_empty() {
        return Err(ApiError::bad_request("no updatable fields in request body"));
    }
    T::validate(&fields, ValidationMode::Update)?;
    let repo = Repository::<T>::connect().await?;
    match repo.update_by_id(id, fields).await? {
        Some(record) => Ok(Envelope::record(record)),
        None => Err(not_found()),
    }
}

/// Delete by id; success is an empty 204.
pub async fn delete<T: Resource>(id: Uuid) -> ApiResult {
    let repo = Repository::<T>::connect().await?;
    if repo.delete_by_id(id).await? {
        Ok(Envelope::no_content())
    } else {
        Err(not_found())
    }
}

fn not_found() -> ApiError {
    ApiError::not_found("No record found with that ID")
}
