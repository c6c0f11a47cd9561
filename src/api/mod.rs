pub mod envelope;

pub use envelope::{ApiResult, Envelope};
