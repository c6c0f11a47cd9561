use serde_json::{Map, Value};

use super::{uuid_field, FieldErrors, Resource, ValidationMode};
use crate::error::ApiError;

/// A user's review of a tour. One review per user per tour, enforced by a
/// unique index; the parent tour's rating aggregates are recomputed by the
/// ratings hook after every review mutation.
pub struct Review;

impl Resource for Review {
    const TABLE: &'static str = "reviews";

    const COLUMNS: &'static [&'static str] = &[
        "id",
        "review",
        "rating",
        "tour_id",
        "user_id",
        "version",
        "created_at",
        "updated_at",
    ];

    const WRITABLE: &'static [&'static str] = &["review", "rating", "tour_id", "user_id"];

    const REQUIRED: &'static [&'static str] = &["review", "rating", "tour_id", "user_id"];

    fn validate(fields: &Map<String, Value>, mode: ValidationMode) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.require_all(fields, Self::REQUIRED, mode);

        if let Some(review) = fields.get("review") {
            match review.as_str() {
                Some(s) if !s.trim().is_empty() => {}
                _ => errors.push("review", "must be a non-empty string"),
            }
        }

        if let Some(rating) = fields.get("rating") {
            match rating.as_f64() {
                Some(r) if (1.0..=5.0).contains(&r) => {}
                _ => errors.push("rating", "must be between 1 and 5"),
            }
        }

        uuid_field(fields, "tour_id", &mut errors);
        uuid_field(fields, "user_id", &mut errors);

        errors.into_result()
    }
}
