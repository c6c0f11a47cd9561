use std::collections::HashMap;

use super::error::QueryError;
use super::scalar::ScalarValue;
use crate::config::QueryConfig;

/// Control keys consumed by the sort/projection/pagination stages. They are
/// stripped before filtering and must never surface as filter fields.
pub const RESERVED_KEYS: [&str; 4] = ["page", "sort", "limit", "fields"];

/// Identifier column the engine always returns, regardless of projection.
pub const ID_COLUMN: &str = "id";

/// Internal row-version column, hidden unless explicitly projected.
pub const VERSION_COLUMN: &str = "version";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    pub fn to_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        }
    }

    fn from_token(token: &str) -> Result<Self, QueryError> {
        Ok(match token {
            "gte" => CompareOp::Gte,
            "gt" => CompareOp::Gt,
            "lte" => CompareOp::Lte,
            "lt" => CompareOp::Lt,
            other => return Err(QueryError::UnsupportedOperator(other.to_string())),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub op: CompareOp,
    pub value: ScalarValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

/// Field projection. An explicit selection replaces the default entirely,
/// so an exclusion list does bring the version column back.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Default,
    Include(Vec<String>),
    Exclude(Vec<String>),
}

impl Projection {
    /// Resolve to the concrete column list for an entity. Inclusions keep
    /// their request order; the identifier column is always present.
    pub fn resolve(&self, columns: &[&str]) -> Vec<String> {
        match self {
            Projection::Default => columns
                .iter()
                .filter(|c| **c != VERSION_COLUMN)
                .map(|c| c.to_string())
                .collect(),
            Projection::Include(fields) => {
                let mut out = Vec::with_capacity(fields.len() + 1);
                if !fields.iter().any(|f| f == ID_COLUMN) {
                    out.push(ID_COLUMN.to_string());
                }
                out.extend(fields.iter().cloned());
                out
            }
            Projection::Exclude(fields) => columns
                .iter()
                .filter(|c| !fields.iter().any(|f| f == **c))
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    pub fn skip(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// The translated form of a request query string: filter conditions, sort
/// order, projection and pagination, built in that fixed stage order. The
/// value is immutable once built; the engine-side builder consumes it.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub conditions: Vec<Condition>,
    pub sort: Vec<SortKey>,
    pub projection: Projection,
    pub page: Page,
}

impl QuerySpec {
    /// Translate raw query parameters against an entity's column set.
    ///
    /// Stage order is filter, sort, projection, pagination. Unknown fields
    /// and operators are rejected; malformed `page`/`limit` values fall
    /// back to their defaults rather than erroring.
    pub fn from_params(
        params: &HashMap<String, String>,
        columns: &[&str],
        config: &QueryConfig,
    ) -> Result<Self, QueryError> {
        let conditions = Self::parse_filter(params, columns)?;
        let sort = Self::parse_sort(params.get("sort").map(String::as_str), columns)?;
        let projection = Self::parse_projection(params.get("fields").map(String::as_str), columns)?;
        let page = Self::parse_page(
            params.get("page").map(String::as_str),
            params.get("limit").map(String::as_str),
            config,
        );
        Ok(Self { conditions, sort, projection, page })
    }

    fn default_sort() -> Vec<SortKey> {
        vec![SortKey { field: "created_at".to_string(), direction: SortDirection::Desc }]
    }

    fn parse_filter(
        params: &HashMap<String, String>,
        columns: &[&str],
    ) -> Result<Vec<Condition>, QueryError> {
        let mut conditions = Vec::new();
        for (key, raw) in params {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            let (field, op) = Self::parse_filter_key(key)?;
            Self::check_column(&field, columns)?;
            conditions.push(Condition { field, op, value: ScalarValue::infer(raw) });
        }
        // HashMap iteration order is arbitrary; keep generated SQL stable
        conditions.sort_by(|a, b| (&a.field, a.op.to_sql()).cmp(&(&b.field, b.op.to_sql())));
        Ok(conditions)
    }

    /// `price` is equality; `price[gte]` is a comparison.
    fn parse_filter_key(key: &str) -> Result<(String, CompareOp), QueryError> {
        match key.find('[') {
            Some(open) if key.ends_with(']') => {
                let field = &key[..open];
                let token = &key[open + 1..key.len() - 1];
                Ok((field.to_string(), CompareOp::from_token(token)?))
            }
            Some(_) => Err(QueryError::InvalidParameter(key.to_string())),
            None => Ok((key.to_string(), CompareOp::Eq)),
        }
    }

    fn parse_sort(sort: Option<&str>, columns: &[&str]) -> Result<Vec<SortKey>, QueryError> {
        let Some(sort) = sort else {
            return Ok(Self::default_sort());
        };
        let mut keys = Vec::new();
        for token in sort.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            let (field, direction) = match token.strip_prefix('-') {
                Some(rest) => (rest, SortDirection::Desc),
                None => (token, SortDirection::Asc),
            };
            Self::check_column(field, columns)?;
            keys.push(SortKey { field: field.to_string(), direction });
        }
        if keys.is_empty() {
            return Ok(Self::default_sort());
        }
        Ok(keys)
    }

    fn parse_projection(fields: Option<&str>, columns: &[&str]) -> Result<Projection, QueryError> {
        let Some(fields) = fields else {
            return Ok(Projection::Default);
        };
        let mut include = Vec::new();
        let mut exclude = Vec::new();
        for token in fields.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            match token.strip_prefix('-') {
                Some(rest) => {
                    Self::check_column(rest, columns)?;
                    exclude.push(rest.to_string());
                }
                None => {
                    Self::check_column(token, columns)?;
                    include.push(token.to_string());
                }
            }
        }
        match (include.is_empty(), exclude.is_empty()) {
            (true, true) => Ok(Projection::Default),
            (false, true) => Ok(Projection::Include(include)),
            (true, false) => Ok(Projection::Exclude(exclude)),
            (false, false) => Err(QueryError::MixedProjection),
        }
    }

    fn parse_page(page: Option<&str>, limit: Option<&str>, config: &QueryConfig) -> Page {
        let page = page
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1);
        let mut limit = limit
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|l| *l > 0)
            .unwrap_or(config.default_page_size);
        if let Some(max) = config.max_page_size {
            if limit > max {
                tracing::warn!("limit {} exceeds max page size {}, clamping", limit, max);
                limit = max;
            }
        }
        Page { page, limit }
    }

    fn check_column(field: &str, columns: &[&str]) -> Result<(), QueryError> {
        if columns.contains(&field) {
            Ok(())
        } else {
            Err(QueryError::InvalidField(field.to_string()))
        }
    }
}
