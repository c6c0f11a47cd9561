pub mod booking;
pub mod review;
pub mod tour;
pub mod user;

pub use booking::Booking;
pub use review::Review;
pub use tour::Tour;
pub use user::User;

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::ApiError;

/// Whether validation runs for a fresh record or a partial update.
/// Required-field checks only apply on create; range and format rules
/// re-run on whatever fields an update supplies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Create,
    Update,
}

/// Related-data expansion directive for single-item retrieval: inline the
/// rows of `table` whose `foreign_key` references the fetched record,
/// attached under `attach_as`.
#[derive(Debug, Clone, Copy)]
pub struct Expansion {
    pub attach_as: &'static str,
    pub table: &'static str,
    pub foreign_key: &'static str,
}

/// Capability contract every stored entity implements. The generic
/// resource handlers and the repository are parameterized over this and
/// nothing else.
pub trait Resource: Send + Sync + 'static {
    const TABLE: &'static str;

    /// Every column of the backing table.
    const COLUMNS: &'static [&'static str];

    /// Columns the API may set. Anything else in a payload is dropped.
    const WRITABLE: &'static [&'static str];

    /// Columns that must be present when creating a record.
    const REQUIRED: &'static [&'static str];

    /// Entity validation rules. Storage re-runs these on update payloads.
    fn validate(fields: &Map<String, Value>, mode: ValidationMode) -> Result<(), ApiError>;

    /// Expansion applied on single-item retrieval, if any.
    fn expansion() -> Option<Expansion> {
        None
    }
}

/// Reduce an API payload to the entity's writable columns.
pub fn writable_subset<T: Resource>(payload: &Map<String, Value>) -> Map<String, Value> {
    payload
        .iter()
        .filter(|(key, _)| T::WRITABLE.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Collector for per-field validation messages.
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: HashMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn require_all(
        &mut self,
        fields: &Map<String, Value>,
        required: &[&str],
        mode: ValidationMode,
    ) {
        if mode != ValidationMode::Create {
            return;
        }
        for field in required {
            match fields.get(*field) {
                None | Some(Value::Null) => self.push(field, "this field is required"),
                _ => {}
            }
        }
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation("Invalid input data", self.errors))
        }
    }
}

pub(crate) fn uuid_field(fields: &Map<String, Value>, field: &str, errors: &mut FieldErrors) {
    if let Some(value) = fields.get(field) {
        let ok = value.as_str().map(|s| uuid::Uuid::parse_str(s).is_ok()).unwrap_or(false);
        if !ok {
            errors.push(field, "must be a UUID");
        }
    }
}
