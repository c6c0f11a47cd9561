use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::{DomainHook, HookError, WriteOp};

/// Recomputes a tour's rating aggregates from its reviews after every
/// review mutation. The average is rounded to one decimal; a tour with no
/// reviews resets to the 4.5 default and a quantity of zero.
pub struct RatingsHook;

const RECOMPUTE_SQL: &str = "\
UPDATE \"tours\" SET \
    \"ratings_quantity\" = agg.review_count, \
    \"ratings_average\" = COALESCE(agg.avg_rating, 4.5) \
FROM ( \
    SELECT COUNT(*)::int AS review_count, \
           ROUND(AVG(\"rating\")::numeric, 1)::double precision AS avg_rating \
    FROM \"reviews\" WHERE \"tour_id\" = $1 \
) agg \
WHERE \"id\" = $1";

#[async_trait]
impl DomainHook for RatingsHook {
    fn name(&self) -> &'static str {
        "review-ratings"
    }

    fn table(&self) -> &'static str {
        "reviews"
    }

    async fn after_write(
        &self,
        _op: WriteOp,
        record: &Value,
        pool: &PgPool,
    ) -> Result<(), HookError> {
        let tour_id = record
            .get("tour_id")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| HookError::Failed("review record has no tour_id".to_string()))?;

        sqlx::query(RECOMPUTE_SQL).bind(tour_id).execute(pool).await?;
        tracing::debug!(%tour_id, "recomputed tour rating aggregates");
        Ok(())
    }
}
