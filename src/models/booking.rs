use serde_json::{Map, Value};

use super::{uuid_field, FieldErrors, Resource, ValidationMode};
use crate::error::ApiError;

/// A paid (or pending) booking of a tour by a user. Checkout itself is an
/// external concern; this records the outcome.
pub struct Booking;

impl Resource for Booking {
    const TABLE: &'static str = "bookings";

    const COLUMNS: &'static [&'static str] =
        &["id", "tour_id", "user_id", "price", "paid", "version", "created_at", "updated_at"];

    const WRITABLE: &'static [&'static str] = &["tour_id", "user_id", "price", "paid"];

    const REQUIRED: &'static [&'static str] = &["tour_id", "user_id", "price"];

    fn validate(fields: &Map<String, Value>, mode: ValidationMode) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.require_all(fields, Self::REQUIRED, mode);

        uuid_field(fields, "tour_id", &mut errors);
        uuid_field(fields, "user_id", &mut errors);

        if let Some(price) = fields.get("price") {
            match price.as_f64() {
                Some(p) if p > 0.0 => {}
                _ => errors.push("price", "must be a positive number"),
            }
        }

        if let Some(paid) = fields.get("paid") {
            if !paid.is_boolean() {
                errors.push("paid", "must be a boolean");
            }
        }

        errors.into_result()
    }
}
