use serde_json::{Map, Value};
use sqlx::postgres::PgArguments;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::config::config;
use crate::database::manager::{classify, DatabaseError, DatabaseManager};
use crate::database::query_builder::QueryBuilder;
use crate::hooks::{self, HookError, WriteOp};
use crate::models::{Expansion, Resource};
use crate::query::{Condition, QuerySpec};

/// Storage capabilities for one entity: find, find-by-id, insert,
/// update-by-id, delete-by-id. Each call is an independent round trip;
/// single-statement atomicity is the engine's. Mutations dispatch the
/// table's domain hooks before and after the write.
pub struct Repository<T> {
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Resource> Repository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, _phantom: std::marker::PhantomData }
    }

    pub async fn connect() -> Result<Self, DatabaseError> {
        Ok(Self::new(DatabaseManager::pool().await?))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Execute a translated query; scope conditions are merged ahead of
    /// the client's own filter.
    pub async fn find(
        &self,
        scope: Vec<Condition>,
        spec: QuerySpec,
    ) -> Result<Vec<Value>, DatabaseError> {
        let mut builder = QueryBuilder::<T>::new(spec);
        for condition in scope {
            builder = builder.scope(condition);
        }
        builder.fetch_all(&self.pool).await
    }

    pub async fn find_by_id(
        &self,
        id: Uuid,
        expansion: Option<&Expansion>,
    ) -> Result<Option<Value>, DatabaseError> {
        let sql = format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM \"{}\" WHERE \"id\" = $1) t",
            T::TABLE
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut record: Value = row.try_get("row")?;

        if let Some(expansion) = expansion {
            let related = self.fetch_related(expansion, id).await?;
            if let Value::Object(map) = &mut record {
                map.insert(expansion.attach_as.to_string(), Value::Array(related));
            }
        }
        Ok(Some(record))
    }

    async fn fetch_related(
        &self,
        expansion: &Expansion,
        id: Uuid,
    ) -> Result<Vec<Value>, DatabaseError> {
        let sql = format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM \"{}\" WHERE \"{}\" = $1 ORDER BY \"created_at\" DESC) t",
            expansion.table, expansion.foreign_key
        );
        let rows = sqlx::query(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;
        rows.iter()
            .map(|row| row.try_get::<Value, _>("row").map_err(DatabaseError::from))
            .collect()
    }

    /// Insert a validated field set; null values are omitted so column
    /// defaults apply. Returns the stored record with all server-assigned
    /// fields.
    pub async fn insert(&self, mut fields: Map<String, Value>) -> Result<Value, DatabaseError> {
        hooks::run_before_write(T::TABLE, WriteOp::Create, &mut fields, &self.pool)
            .await
            .map_err(hook_failure)?;

        let entries: Vec<(&String, &Value)> =
            fields.iter().filter(|(_, value)| !value.is_null()).collect();
        if entries.is_empty() {
            return Err(DatabaseError::QueryError("nothing to insert".to_string()));
        }

        let columns: Vec<String> = entries.iter().map(|(k, _)| format!("\"{}\"", k)).collect();
        let placeholders: Vec<String> =
            (1..=entries.len()).map(|i| format!("${}", i)).collect();
        let sql = format!(
            "INSERT INTO \"{table}\" ({}) VALUES ({}) RETURNING row_to_json(\"{table}\") AS row",
            columns.join(", "),
            placeholders.join(", "),
            table = T::TABLE,
        );

        if config().database.enable_query_logging {
            tracing::debug!(sql = %sql, "executing insert");
        }
        let mut query = sqlx::query(&sql);
        for &(_, value) in &entries {
            query = bind_field(query, value);
        }
        let row = query.fetch_one(&self.pool).await.map_err(classify)?;
        let record: Value = row.try_get("row")?;

        hooks::run_after_write(T::TABLE, WriteOp::Create, &record, &self.pool)
            .await
            .map_err(hook_failure)?;
        Ok(record)
    }

    /// Partial update. Explicit nulls clear the column; the row version is
    /// bumped on every successful write.
    pub async fn update_by_id(
        &self,
        id: Uuid,
        mut fields: Map<String, Value>,
    ) -> Result<Option<Value>, DatabaseError> {
        hooks::run_before_write(T::TABLE, WriteOp::Update, &mut fields, &self.pool)
            .await
            .map_err(hook_failure)?;

        let mut assignments = Vec::new();
        let mut binds: Vec<&Value> = Vec::new();
        for (key, value) in &fields {
            if value.is_null() {
                assignments.push(format!("\"{}\" = NULL", key));
            } else {
                binds.push(value);
                assignments.push(format!("\"{}\" = ${}", key, binds.len()));
            }
        }
        assignments.push("\"version\" = \"version\" + 1".to_string());
        assignments.push("\"updated_at\" = now()".to_string());

        let sql = format!(
            "UPDATE \"{table}\" SET {} WHERE \"id\" = ${} RETURNING row_to_json(\"{table}\") AS row",
            assignments.join(", "),
            binds.len() + 1,
            table = T::TABLE,
        );

        if config().database.enable_query_logging {
            tracing::debug!(sql = %sql, "executing update");
        }
        let mut query = sqlx::query(&sql);
        for &value in &binds {
            query = bind_field(query, value);
        }
        let row = query
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let record: Value = row.try_get("row")?;

        hooks::run_after_write(T::TABLE, WriteOp::Update, &record, &self.pool)
            .await
            .map_err(hook_failure)?;
        Ok(Some(record))
    }

    /// Remove by id. Returns whether a record was actually deleted.
    pub async fn delete_by_id(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let sql = format!(
            "DELETE FROM \"{table}\" WHERE \"id\" = $1 RETURNING row_to_json(\"{table}\") AS row",
            table = T::TABLE,
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?;
        let Some(row) = row else {
            return Ok(false);
        };
        let record: Value = row.try_get("row")?;

        hooks::run_after_write(T::TABLE, WriteOp::Delete, &record, &self.pool)
            .await
            .map_err(hook_failure)?;
        Ok(true)
    }
}

fn hook_failure(err: HookError) -> DatabaseError {
    DatabaseError::Hook(err.to_string())
}

/// Bind one JSON payload value with the engine type its column expects.
/// Strings that parse as UUIDs bind as such (reference columns arrive as
/// JSON strings); arrays and objects bind as jsonb.
fn bind_field<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    value: &Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match value {
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                query.bind(i)
            } else if let Some(f) = n.as_f64() {
                query.bind(f)
            } else {
                query.bind(n.to_string())
            }
        }
        Value::String(s) => match Uuid::parse_str(s) {
            Ok(id) => query.bind(id),
            Err(_) => query.bind(s.clone()),
        },
        Value::Array(_) | Value::Object(_) => query.bind(value.clone()),
        // Nulls are filtered out (insert) or rendered as literals (update)
        Value::Null => query,
    }
}
