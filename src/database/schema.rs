use sqlx::PgPool;
use tracing::info;

use crate::database::manager::DatabaseError;

/// Idempotent DDL bootstrap for the four entity tables. Ordering matters:
/// referenced tables first.
const STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS \"users\" (
        \"id\" uuid PRIMARY KEY DEFAULT gen_random_uuid(),
        \"name\" text NOT NULL,
        \"email\" text NOT NULL UNIQUE,
        \"photo\" text,
        \"role\" text NOT NULL DEFAULT 'user',
        \"active\" boolean NOT NULL DEFAULT true,
        \"version\" integer NOT NULL DEFAULT 0,
        \"created_at\" timestamptz NOT NULL DEFAULT now(),
        \"updated_at\" timestamptz NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS \"tours\" (
        \"id\" uuid PRIMARY KEY DEFAULT gen_random_uuid(),
        \"name\" text NOT NULL UNIQUE,
        \"slug\" text,
        \"duration\" integer NOT NULL,
        \"max_group_size\" integer NOT NULL,
        \"difficulty\" text NOT NULL,
        \"ratings_average\" double precision NOT NULL DEFAULT 4.5,
        \"ratings_quantity\" integer NOT NULL DEFAULT 0,
        \"price\" double precision NOT NULL,
        \"price_discount\" double precision,
        \"summary\" text NOT NULL,
        \"description\" text,
        \"image_cover\" text NOT NULL,
        \"images\" jsonb NOT NULL DEFAULT '[]'::jsonb,
        \"start_dates\" jsonb NOT NULL DEFAULT '[]'::jsonb,
        \"secret_tour\" boolean NOT NULL DEFAULT false,
        \"start_location\" text,
        \"start_lat\" double precision,
        \"start_lng\" double precision,
        \"version\" integer NOT NULL DEFAULT 0,
        \"created_at\" timestamptz NOT NULL DEFAULT now(),
        \"updated_at\" timestamptz NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS \"reviews\" (
        \"id\" uuid PRIMARY KEY DEFAULT gen_random_uuid(),
        \"review\" text NOT NULL,
        \"rating\" double precision NOT NULL,
        \"tour_id\" uuid NOT NULL REFERENCES \"tours\" (\"id\") ON DELETE CASCADE,
        \"user_id\" uuid NOT NULL REFERENCES \"users\" (\"id\") ON DELETE CASCADE,
        \"version\" integer NOT NULL DEFAULT 0,
        \"created_at\" timestamptz NOT NULL DEFAULT now(),
        \"updated_at\" timestamptz NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS \"bookings\" (
        \"id\" uuid PRIMARY KEY DEFAULT gen_random_uuid(),
        \"tour_id\" uuid NOT NULL REFERENCES \"tours\" (\"id\") ON DELETE CASCADE,
        \"user_id\" uuid NOT NULL REFERENCES \"users\" (\"id\") ON DELETE CASCADE,
        \"price\" double precision NOT NULL,
        \"paid\" boolean NOT NULL DEFAULT true,
        \"version\" integer NOT NULL DEFAULT 0,
        \"created_at\" timestamptz NOT NULL DEFAULT now(),
        \"updated_at\" timestamptz NOT NULL DEFAULT now()
    )",
    "CREATE INDEX IF NOT EXISTS \"idx_tours_price\" ON \"tours\" (\"price\")",
    "CREATE INDEX IF NOT EXISTS \"idx_tours_slug\" ON \"tours\" (\"slug\")",
    "CREATE UNIQUE INDEX IF NOT EXISTS \"idx_reviews_tour_user\" ON \"reviews\" (\"tour_id\", \"user_id\")",
    "CREATE INDEX IF NOT EXISTS \"idx_bookings_user\" ON \"bookings\" (\"user_id\")",
];

pub async fn ensure(pool: &PgPool) -> Result<(), DatabaseError> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("database schema verified");
    Ok(())
}
