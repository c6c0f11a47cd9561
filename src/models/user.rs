use serde_json::{Map, Value};

use super::{FieldErrors, Resource, ValidationMode};
use crate::error::ApiError;

pub const ROLES: [&str; 4] = ["user", "guide", "lead-guide", "admin"];

pub struct User;

impl Resource for User {
    const TABLE: &'static str = "users";

    const COLUMNS: &'static [&'static str] =
        &["id", "name", "email", "photo", "role", "active", "version", "created_at", "updated_at"];

    const WRITABLE: &'static [&'static str] = &["name", "email", "photo", "role", "active"];

    const REQUIRED: &'static [&'static str] = &["name", "email"];

    fn validate(fields: &Map<String, Value>, mode: ValidationMode) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.require_all(fields, Self::REQUIRED, mode);

        if let Some(name) = fields.get("name") {
            match name.as_str() {
                Some(s) if !s.trim().is_empty() => {}
                _ => errors.push("name", "must be a non-empty string"),
            }
        }

        if let Some(email) = fields.get("email") {
            let ok = email.as_str().map(is_plausible_email).unwrap_or(false);
            if !ok {
                errors.push("email", "must be a valid email address");
            }
        }

        if let Some(role) = fields.get("role") {
            let ok = role.as_str().map(|s| ROLES.contains(&s)).unwrap_or(false);
            if !ok {
                errors.push("role", "must be one of: user, guide, lead-guide, admin");
            }
        }

        if let Some(active) = fields.get("active") {
            if !active.is_boolean() {
                errors.push("active", "must be a boolean");
            }
        }

        errors.into_result()
    }
}

fn is_plausible_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn email_shape_is_checked() {
        for (email, ok) in [
            ("ada@example.com", true),
            ("no-at-sign", false),
            ("@example.com", false),
            ("ada@nodot", false),
        ] {
            let payload = json!({ "name": "Ada", "email": email })
                .as_object()
                .cloned()
                .unwrap();
            assert_eq!(User::validate(&payload, ValidationMode::Create).is_ok(), ok, "{}", email);
        }
    }
}
