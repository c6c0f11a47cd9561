pub mod error;
pub mod scalar;
pub mod spec;

pub use error::QueryError;
pub use scalar::ScalarValue;
pub use spec::{CompareOp, Condition, Page, Projection, QuerySpec, SortDirection, SortKey};
