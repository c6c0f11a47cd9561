use serde_json::Value;
use sqlx::postgres::PgArguments;
use sqlx::{PgPool, Row};

use crate::config::config;
use crate::database::manager::{classify, DatabaseError};
use crate::models::Resource;
use crate::query::{Condition, QuerySpec, ScalarValue};

/// One renderable statement: SQL text plus its positional binds.
#[derive(Debug, Clone)]
pub struct SqlQuery {
    pub text: String,
    pub binds: Vec<ScalarValue>,
}

/// Renders a `QuerySpec` into a single SELECT for an entity's table and
/// executes it. Stages apply in the translator's fixed order: filter
/// (scope conditions ahead of client conditions), sort, projection,
/// pagination. Rows come back engine-serialized via `row_to_json`, so the
/// projection decides exactly which fields the caller sees.
pub struct QueryBuilder<T> {
    scope: Vec<Condition>,
    spec: QuerySpec,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Resource> QueryBuilder<T> {
    pub fn new(spec: QuerySpec) -> Self {
        Self { scope: vec![], spec, _phantom: std::marker::PhantomData }
    }

    /// Externally supplied base constraint, merged ahead of client filters.
    pub fn scope(mut self, condition: Condition) -> Self {
        self.scope.push(condition);
        self
    }

    pub fn to_sql(&self) -> SqlQuery {
        let mut binds: Vec<ScalarValue> = Vec::new();

        // 1. filter
        let mut predicates = Vec::new();
        for condition in self.scope.iter().chain(self.spec.conditions.iter()) {
            binds.push(condition.value.clone());
            predicates.push(format!(
                "\"{}\" {} ${}",
                condition.field,
                condition.op.to_sql(),
                binds.len()
            ));
        }
        let where_clause = if predicates.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", predicates.join(" AND "))
        };

        // 2. sort
        let order_clause = if self.spec.sort.is_empty() {
            String::new()
        } else {
            let keys: Vec<String> = self
                .spec
                .sort
                .iter()
                .map(|key| format!("\"{}\" {}", key.field, key.direction.to_sql()))
                .collect();
            format!(" ORDER BY {}", keys.join(", "))
        };

        // 3. projection
        let columns: Vec<String> = self
            .spec
            .projection
            .resolve(T::COLUMNS)
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect();

        // 4. pagination
        binds.push(ScalarValue::Int(self.spec.page.limit));
        let limit_param = binds.len();
        binds.push(ScalarValue::Int(self.spec.page.skip()));
        let skip_param = binds.len();

        let text = format!(
            "SELECT row_to_json(t) AS row FROM (SELECT {} FROM \"{}\"{}{} LIMIT ${} OFFSET ${}) t",
            columns.join(", "),
            T::TABLE,
            where_clause,
            order_clause,
            limit_param,
            skip_param,
        );

        SqlQuery { text, binds }
    }

    pub async fn fetch_all(self, pool: &PgPool) -> Result<Vec<Value>, DatabaseError> {
        let sql = self.to_sql();
        if config().query.debug_logging {
            tracing::debug!(sql = %sql.text, "executing list query");
        }
        let mut query = sqlx::query(&sql.text);
        for value in &sql.binds {
            query = bind_scalar(query, value);
        }
        let rows = query.fetch_all(pool).await.map_err(classify)?;
        rows.iter()
            .map(|row| row.try_get::<Value, _>("row").map_err(DatabaseError::from))
            .collect()
    }
}

pub(crate) fn bind_scalar<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    value: &ScalarValue,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match value {
        ScalarValue::Bool(b) => query.bind(*b),
        ScalarValue::Int(i) => query.bind(*i),
        ScalarValue::Float(f) => query.bind(*f),
        ScalarValue::Uuid(id) => query.bind(*id),
        ScalarValue::Timestamp(ts) => query.bind(*ts),
        ScalarValue::Text(s) => query.bind(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueryConfig;
    use crate::error::ApiError;
    use crate::models::ValidationMode;
    use serde_json::Map;
    use std::collections::HashMap;

    struct Trail;

    impl Resource for Trail {
        const TABLE: &'static str = "trails";
        const COLUMNS: &'static [&'static str] =
            &["id", "name", "price", "created_at", "version"];
        const WRITABLE: &'static [&'static str] = &["name", "price"];
        const REQUIRED: &'static [&'static str] = &["name"];

        fn validate(_: &Map<String, serde_json::Value>, _: ValidationMode) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn spec_for(pairs: &[(&str, &str)]) -> QuerySpec {
        let params: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        let config =
            QueryConfig { default_page_size: 100, max_page_size: Some(1000), debug_logging: false };
        QuerySpec::from_params(&params, Trail::COLUMNS, &config).unwrap()
    }

    #[test]
    fn comparison_filter_renders_and_binds() {
        let sql = QueryBuilder::<Trail>::new(spec_for(&[("price[gte]", "500")])).to_sql();
        assert!(sql.text.contains("WHERE \"price\" >= $1"), "{}", sql.text);
        assert_eq!(sql.binds[0], ScalarValue::Int(500));
    }

    #[test]
    fn scope_conditions_come_before_client_conditions() {
        let builder = QueryBuilder::<Trail>::new(spec_for(&[("price[lt]", "100")])).scope(
            Condition {
                field: "name".to_string(),
                op: crate::query::CompareOp::Eq,
                value: ScalarValue::Text("x".to_string()),
            },
        );
        let sql = builder.to_sql();
        assert!(
            sql.text.contains("WHERE \"name\" = $1 AND \"price\" < $2"),
            "{}",
            sql.text
        );
    }

    #[test]
    fn sort_projection_and_pagination_render_in_one_statement() {
        let sql = QueryBuilder::<Trail>::new(spec_for(&[
            ("sort", "-price,name"),
            ("fields", "name,price"),
            ("page", "3"),
            ("limit", "20"),
        ]))
        .to_sql();
        assert!(sql.text.contains("ORDER BY \"price\" DESC, \"name\" ASC"), "{}", sql.text);
        assert!(sql.text.contains("SELECT \"id\", \"name\", \"price\" FROM"), "{}", sql.text);
        assert!(sql.text.contains("LIMIT $1 OFFSET $2"), "{}", sql.text);
        assert_eq!(sql.binds, vec![ScalarValue::Int(20), ScalarValue::Int(40)]);
    }

    #[test]
    fn default_spec_excludes_version_and_sorts_by_created_at() {
        let sql = QueryBuilder::<Trail>::new(spec_for(&[])).to_sql();
        assert!(!sql.text.contains("\"version\""), "{}", sql.text);
        assert!(sql.text.contains("ORDER BY \"created_at\" DESC"), "{}", sql.text);
        assert_eq!(sql.binds, vec![ScalarValue::Int(100), ScalarValue::Int(0)]);
    }
}
