use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;

use super::{DomainHook, HookError, WriteOp};

/// Derives a tour's URL slug from its name whenever the name is written.
pub struct SlugHook;

#[async_trait]
impl DomainHook for SlugHook {
    fn name(&self) -> &'static str {
        "tour-slug"
    }

    fn table(&self) -> &'static str {
        "tours"
    }

    async fn before_write(
        &self,
        op: WriteOp,
        fields: &mut Map<String, Value>,
        _pool: &PgPool,
    ) -> Result<(), HookError> {
        if op == WriteOp::Delete {
            return Ok(());
        }
        if let Some(name) = fields.get("name").and_then(Value::as_str) {
            let slug = slugify(name);
            fields.insert("slug".to_string(), Value::String(slug));
        }
        Ok(())
    }
}

pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_dash = true; // suppress a leading dash
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
