use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

/// A query-string value coerced into the narrowest type the storage
/// engine can compare natively. Inference order matters: `"2024-05-01"`
/// must become a timestamp, not text, or date comparisons silently break.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    Text(String),
}

impl ScalarValue {
    pub fn infer(raw: &str) -> Self {
        match raw {
            "true" => return ScalarValue::Bool(true),
            "false" => return ScalarValue::Bool(false),
            _ => {}
        }
        if let Ok(i) = raw.parse::<i64>() {
            return ScalarValue::Int(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            return ScalarValue::Float(f);
        }
        if let Ok(id) = Uuid::parse_str(raw) {
            return ScalarValue::Uuid(id);
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return ScalarValue::Timestamp(ts.with_timezone(&Utc));
        }
        if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return ScalarValue::Timestamp(d.and_time(NaiveTime::MIN).and_utc());
        }
        ScalarValue::Text(raw.to_string())
    }
}

impl std::fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarValue::Bool(b) => write!(f, "{}", b),
            ScalarValue::Int(i) => write!(f, "{}", i),
            ScalarValue::Float(x) => write!(f, "{}", x),
            ScalarValue::Uuid(id) => write!(f, "{}", id),
            ScalarValue::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            ScalarValue::Text(s) => write!(f, "{}", s),
        }
    }
}
