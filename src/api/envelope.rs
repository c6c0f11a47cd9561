use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

/// Success envelope for API responses. Lists carry a `results` count and
/// their records under `data.data`; single items just `data.data`; deletes
/// are an empty 204.
#[derive(Debug)]
pub struct Envelope {
    status_code: StatusCode,
    body: Option<Value>,
}

impl Envelope {
    pub fn list(records: Vec<Value>) -> Self {
        Self {
            status_code: StatusCode::OK,
            body: Some(json!({
                "status": "success",
                "results": records.len(),
                "data": { "data": records },
            })),
        }
    }

    pub fn record(record: Value) -> Self {
        Self {
            status_code: StatusCode::OK,
            body: Some(json!({
                "status": "success",
                "data": { "data": record },
            })),
        }
    }

    pub fn created(record: Value) -> Self {
        Self {
            status_code: StatusCode::CREATED,
            body: Some(json!({
                "status": "success",
                "data": { "data": record },
            })),
        }
    }

    /// Aggregation results under a caller-chosen key, e.g. `data.stats`.
    pub fn keyed(key: &str, value: Value) -> Self {
        Self {
            status_code: StatusCode::OK,
            body: Some(json!({
                "status": "success",
                "data": { key: value },
            })),
        }
    }

    pub fn no_content() -> Self {
        Self { status_code: StatusCode::NO_CONTENT, body: None }
    }

    #[cfg(test)]
    pub(crate) fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        match self.body {
            Some(body) => (self.status_code, Json(body)).into_response(),
            None => self.status_code.into_response(),
        }
    }
}

/// Handler result: a success envelope or an error that renders itself
pub type ApiResult = Result<Envelope, crate::error::ApiError>;
