use axum::{
    extract::{Path, Query},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use sqlx::Row;
use std::collections::HashMap;

use super::crud;
use crate::api::{ApiResult, Envelope};
use crate::database::{DatabaseError, DatabaseManager};
use crate::error::ApiError;
use crate::models::{Resource, Tour};
use crate::query::{CompareOp, Condition, Projection, ScalarValue};

// Earth radii for haversine math, in the two supported units.
const EARTH_RADIUS_MI: f64 = 3963.2;
const EARTH_RADIUS_KM: f64 = 6378.1;

pub fn routes() -> Router {
    Router::new()
        .route("/api/tours", get(list_tours).post(create_tour))
        .route("/api/tours/top-5-cheap", get(top_5_cheap))
        .route("/api/tours/stats", get(tour_stats))
        .route("/api/tours/monthly-plan/:year", get(monthly_plan))
        .route("/api/tours/within/:distance/center/:latlng/unit/:unit", get(tours_within))
        .route("/api/tours/distances/:latlng/unit/:unit", get(tour_distances))
        .route("/api/tours/:id", get(get_tour).patch(update_tour).delete(delete_tour))
}

/// Secret tours stay out of every list surface.
fn public_scope() -> Condition {
    Condition {
        field: "secret_tour".to_string(),
        op: CompareOp::Eq,
        value: ScalarValue::Bool(false),
    }
}

pub async fn list_tours(Query(params): Query<HashMap<String, String>>) -> ApiResult {
    crud::list::<Tour>(params, vec![public_scope()]).await
}

pub async fn get_tour(Path(id): Path<String>) -> ApiResult {
    crud::get_one::<Tour>(super::parse_id(&id)?, Tour::expansion()).await
}

pub async fn create_tour(Json(payload): Json<Value>) -> ApiResult {
    crud::create::<Tour>(payload).await
}

pub async fn update_tour(Path(id): Path<String>, Json(payload): Json<Value>) -> ApiResult {
    crud::update::<Tour>(super::parse_id(&id)?, payload).await
}

pub async fn delete_tour(Path(id): Path<String>) -> ApiResult {
    crud::delete::<Tour>(super::parse_id(&id)?).await
}

/// Alias route: the five best-rated cheap tours, trimmed to card fields.
pub async fn top_5_cheap() -> ApiResult {
    let params = HashMap::from([
        ("limit".to_string(), "5".to_string()),
        ("sort".to_string(), "-ratings_average,price".to_string()),
        (
            "fields".to_string(),
            "name,price,ratings_average,summary,difficulty".to_string(),
        ),
    ]);
    crud::list::<Tour>(params, vec![public_scope()]).await
}

/// Per-difficulty aggregates over well-rated tours.
pub async fn tour_stats() -> ApiResult {
    let pool = DatabaseManager::pool().await?;
    let sql = "SELECT row_to_json(t) AS row FROM ( \
        SELECT upper(\"difficulty\") AS difficulty, \
               COUNT(*)::int AS num_tours, \
               SUM(\"ratings_quantity\")::int AS num_ratings, \
               ROUND(AVG(\"ratings_average\")::numeric, 2)::double precision AS avg_rating, \
               ROUND(AVG(\"price\")::numeric, 2)::double precision AS avg_price, \
               MIN(\"price\") AS min_price, \
               MAX(\"price\") AS max_price \
        FROM \"tours\" \
        WHERE \"ratings_average\" >= 4.5 \
        GROUP BY \"difficulty\" \
        ORDER BY avg_price ASC \
    ) t";
    let rows = sqlx::query(sql).fetch_all(&pool).await.map_err(DatabaseError::from)?;
    Ok(Envelope::keyed("stats", Value::Array(json_rows(rows)?)))
}

/// Tour starts per month of a year, busiest months first.
pub async fn monthly_plan(Path(year): Path<i32>) -> ApiResult {
    if !(1900..=2100).contains(&year) {
        return Err(ApiError::bad_request("year must be between 1900 and 2100"));
    }
    let pool = DatabaseManager::pool().await?;
    let sql = "SELECT row_to_json(t) AS row FROM ( \
        SELECT EXTRACT(MONTH FROM (sd.start_date)::timestamptz)::int AS month, \
               COUNT(*)::int AS num_tour_starts, \
               array_agg(\"name\") AS tours \
        FROM \"tours\" \
        CROSS JOIN LATERAL jsonb_array_elements_text(\"start_dates\") AS sd(start_date) \
        WHERE (sd.start_date)::timestamptz >= make_timestamptz($1, 1, 1, 0, 0, 0) \
          AND (sd.start_date)::timestamptz < make_timestamptz($1 + 1, 1, 1, 0, 0, 0) \
        GROUP BY month \
        ORDER BY num_tour_starts DESC, month ASC \
    ) t";
    let rows = sqlx::query(sql)
        .bind(year)
        .fetch_all(&pool)
        .await
        .map_err(DatabaseError::from)?;
    Ok(Envelope::keyed("plan", Value::Array(json_rows(rows)?)))
}

/// Tours whose start point lies within `distance` of the center.
pub async fn tours_within(
    Path((distance, latlng, unit)): Path<(f64, String, String)>,
) -> ApiResult {
    let (lat, lng) = parse_latlng(&latlng)?;
    let radius = earth_radius(&unit)?;
    if distance < 0.0 {
        return Err(ApiError::bad_request("distance must not be negative"));
    }

    let columns = Projection::Default
        .resolve(Tour::COLUMNS)
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "SELECT row_to_json(t) AS row FROM ( \
            SELECT {columns} FROM \"tours\" \
            WHERE \"start_lat\" IS NOT NULL AND \"start_lng\" IS NOT NULL \
              AND \"secret_tour\" = false \
              AND {expr} <= $4 \
        ) t",
        columns = columns,
        expr = haversine_expr(),
    );
    let pool = DatabaseManager::pool().await?;
    let rows = sqlx::query(&sql)
        .bind(lat)
        .bind(lng)
        .bind(radius)
        .bind(distance)
        .fetch_all(&pool)
        .await
        .map_err(DatabaseError::from)?;
    Ok(Envelope::list(json_rows(rows)?))
}

/// Distance from the center to every tour's start point, nearest first.
pub async fn tour_distances(Path((latlng, unit)): Path<(String, String)>) -> ApiResult {
    let (lat, lng) = parse_latlng(&latlng)?;
    let radius = earth_radius(&unit)?;

    let sql = format!(
        "SELECT row_to_json(t) AS row FROM ( \
            SELECT \"id\", \"name\", \
                   ROUND(({expr})::numeric, 2)::double precision AS distance \
            FROM \"tours\" \
            WHERE \"start_lat\" IS NOT NULL AND \"start_lng\" IS NOT NULL \
              AND \"secret_tour\" = false \
            ORDER BY distance ASC \
        ) t",
        expr = haversine_expr(),
    );
    let pool = DatabaseManager::pool().await?;
    let rows = sqlx::query(&sql)
        .bind(lat)
        .bind(lng)
        .bind(radius)
        .fetch_all(&pool)
        .await
        .map_err(DatabaseError::from)?;
    Ok(Envelope::keyed("data", Value::Array(json_rows(rows)?)))
}

/// Great-circle distance from ($1, $2) to a tour's start point, on a
/// sphere of radius $3. Clamped against acos domain drift.
fn haversine_expr() -> &'static str {
    "($3 * acos(LEAST(1.0, GREATEST(-1.0, \
        cos(radians($1)) * cos(radians(\"start_lat\")) \
        * cos(radians(\"start_lng\") - radians($2)) \
        + sin(radians($1)) * sin(radians(\"start_lat\"))))))"
}

fn earth_radius(unit: &str) -> Result<f64, ApiError> {
    match unit {
        "mi" => Ok(EARTH_RADIUS_MI),
        "km" => Ok(EARTH_RADIUS_KM),
        other => Err(ApiError::bad_request(format!("unknown unit '{}', use mi or km", other))),
    }
}

fn parse_latlng(latlng: &str) -> Result<(f64, f64), ApiError> {
    let invalid =
        || ApiError::bad_request("please provide latitude and longitude in the format lat,lng");
    let (lat, lng) = latlng.split_once(',').ok_or_else(invalid)?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lng: f64 = lng.trim().parse().map_err(|_| invalid())?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(invalid());
    }
    Ok((lat, lng))
}

fn json_rows(rows: Vec<sqlx::postgres::PgRow>) -> Result<Vec<Value>, ApiError> {
    rows.iter()
        .map(|row| {
            row.try_get::<Value, _>("row")
                .map_err(|e| DatabaseError::from(e).into())
        })
        .collect()
}
