use serde_json::{Map, Value};

use super::{Expansion, FieldErrors, Resource, ValidationMode};
use crate::error::ApiError;

pub const DIFFICULTIES: [&str; 3] = ["easy", "medium", "difficult"];

/// A guided tour. Ratings columns are derived from reviews and the slug
/// from the name, so none of them are writable through the API.
pub struct Tour;

impl Resource for Tour {
    const TABLE: &'static str = "tours";

    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "slug",
        "duration",
        "max_group_size",
        "difficulty",
        "ratings_average",
        "ratings_quantity",
        "price",
        "price_discount",
        "summary",
        "description",
        "image_cover",
        "images",
        "start_dates",
        "secret_tour",
        "start_location",
        "start_lat",
        "start_lng",
        "version",
        "created_at",
        "updated_at",
    ];

    const WRITABLE: &'static [&'static str] = &[
        "name",
        "duration",
        "max_group_size",
        "difficulty",
        "price",
        "price_discount",
        "summary",
        "description",
        "image_cover",
        "images",
        "start_dates",
        "secret_tour",
        "start_location",
        "start_lat",
        "start_lng",
    ];

    const REQUIRED: &'static [&'static str] =
        &["name", "duration", "max_group_size", "difficulty", "price", "summary", "image_cover"];

    fn validate(fields: &Map<String, Value>, mode: ValidationMode) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.require_all(fields, Self::REQUIRED, mode);

        if let Some(name) = fields.get("name") {
            match name.as_str() {
                Some(s) if (10..=40).contains(&s.trim().len()) => {}
                Some(_) => errors.push("name", "must be between 10 and 40 characters"),
                None => errors.push("name", "must be a string"),
            }
        }

        for field in ["duration", "max_group_size"] {
            if let Some(value) = fields.get(field) {
                match value.as_i64() {
                    Some(n) if n > 0 => {}
                    _ => errors.push(field, "must be a positive integer"),
                }
            }
        }

        if let Some(difficulty) = fields.get("difficulty") {
            let ok = difficulty.as_str().map(|s| DIFFICULTIES.contains(&s)).unwrap_or(false);
            if !ok {
                errors.push("difficulty", "must be one of: easy, medium, difficult");
            }
        }

        if let Some(price) = fields.get("price") {
            match price.as_f64() {
                Some(p) if p > 0.0 => {}
                _ => errors.push("price", "must be a positive number"),
            }
        }

        // Discount must stay below price; the cross-check only fires when
        // both values travel in the same payload.
        if let Some(discount) = fields.get("price_discount") {
            match discount.as_f64() {
                Some(d) => {
                    if let Some(p) = fields.get("price").and_then(Value::as_f64) {
                        if d >= p {
                            errors.push("price_discount", "must be below the regular price");
                        }
                    }
                    if d < 0.0 {
                        errors.push("price_discount", "must not be negative");
                    }
                }
                None => errors.push("price_discount", "must be a number"),
            }
        }

        for field in ["summary", "image_cover", "start_location", "description"] {
            if let Some(value) = fields.get(field) {
                if !value.is_string() {
                    errors.push(field, "must be a string");
                }
            }
        }

        for field in ["images", "start_dates"] {
            if let Some(value) = fields.get(field) {
                let ok = value
                    .as_array()
                    .map(|items| items.iter().all(Value::is_string))
                    .unwrap_or(false);
                if !ok {
                    errors.push(field, "must be an array of strings");
                }
            }
        }

        if let Some(lat) = fields.get("start_lat") {
            match lat.as_f64() {
                Some(v) if (-90.0..=90.0).contains(&v) => {}
                _ => errors.push("start_lat", "must be a latitude between -90 and 90"),
            }
        }
        if let Some(lng) = fields.get("start_lng") {
            match lng.as_f64() {
                Some(v) if (-180.0..=180.0).contains(&v) => {}
                _ => errors.push("start_lng", "must be a longitude between -180 and 180"),
            }
        }

        if let Some(secret) = fields.get("secret_tour") {
            if !secret.is_boolean() {
                errors.push("secret_tour", "must be a boolean");
            }
        }

        errors.into_result()
    }

    fn expansion() -> Option<Expansion> {
        Some(Expansion { attach_as: "reviews", table: "reviews", foreign_key: "tour_id" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_payload() -> Map<String, Value> {
        json!({
            "name": "The Forest Hiker",
            "duration": 5,
            "max_group_size": 25,
            "difficulty": "easy",
            "price": 397.0,
            "summary": "Breathtaking hike through the Canadian Banff National Park",
            "image_cover": "tour-1-cover.jpg"
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn accepts_complete_payload() {
        assert!(Tour::validate(&valid_payload(), ValidationMode::Create).is_ok());
    }

    #[test]
    fn create_requires_core_fields() {
        let err = Tour::validate(&Map::new(), ValidationMode::Create).unwrap_err();
        match err {
            ApiError::Validation { field_errors, .. } => {
                assert!(field_errors.contains_key("name"));
                assert!(field_errors.contains_key("price"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn update_skips_required_check() {
        let mut fields = Map::new();
        fields.insert("price".to_string(), json!(250.0));
        assert!(Tour::validate(&fields, ValidationMode::Update).is_ok());
    }

    #[test]
    fn name_length_bounds() {
        let mut payload = valid_payload();
        payload.insert("name".to_string(), json!("Too short"));
        assert!(Tour::validate(&payload, ValidationMode::Create).is_err());
    }

    #[test]
    fn discount_must_stay_below_price() {
        let mut payload = valid_payload();
        payload.insert("price_discount".to_string(), json!(400.0));
        let err = Tour::validate(&payload, ValidationMode::Create).unwrap_err();
        match err {
            ApiError::Validation { field_errors, .. } => {
                assert!(field_errors.contains_key("price_discount"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn difficulty_is_an_enum() {
        let mut payload = valid_payload();
        payload.insert("difficulty".to_string(), json!("extreme"));
        assert!(Tour::validate(&payload, ValidationMode::Create).is_err());
    }
}
