// Domain-level consistency hooks, dispatched by the storage layer around
// record mutations. Synchronous with the request: a failing hook fails
// the operation.

pub mod ratings;
pub mod slug;

use async_trait::async_trait;
use futures::future::try_join_all;
use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use sqlx::PgPool;
use thiserror::Error;

pub use ratings::RatingsHook;
pub use slug::SlugHook;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Error)]
pub enum HookError {
    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// A hook owns one table and runs at one or both stages: `before_write`
/// may rewrite the outgoing field set (create/update only), `after_write`
/// reacts to the stored record (all three operations).
#[async_trait]
pub trait DomainHook: Send + Sync {
    fn name(&self) -> &'static str;

    fn table(&self) -> &'static str;

    async fn before_write(
        &self,
        _op: WriteOp,
        _fields: &mut Map<String, Value>,
        _pool: &PgPool,
    ) -> Result<(), HookError> {
        Ok(())
    }

    async fn after_write(
        &self,
        _op: WriteOp,
        _record: &Value,
        _pool: &PgPool,
    ) -> Result<(), HookError> {
        Ok(())
    }
}

static HOOKS: Lazy<Vec<Box<dyn DomainHook>>> =
    Lazy::new(|| vec![Box::new(SlugHook), Box::new(RatingsHook)]);

/// Run before-write hooks for a table, in registration order. Sequential
/// because each hook may rewrite the field set the next one sees.
pub async fn run_before_write(
    table: &str,
    op: WriteOp,
    fields: &mut Map<String, Value>,
    pool: &PgPool,
) -> Result<(), HookError> {
    for hook in HOOKS.iter().filter(|h| h.table() == table) {
        tracing::debug!(hook = hook.name(), "running before_write");
        hook.before_write(op, fields, pool).await?;
    }
    Ok(())
}

/// Run after-write hooks for a table concurrently; they only observe the
/// stored record.
pub async fn run_after_write(
    table: &str,
    op: WriteOp,
    record: &Value,
    pool: &PgPool,
) -> Result<(), HookError> {
    let pending: Vec<_> = HOOKS
        .iter()
        .filter(|h| h.table() == table)
        .map(|h| h.after_write(op, record, pool))
        .collect();
    try_join_all(pending).await?;
    Ok(())
}
