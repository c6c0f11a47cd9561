pub mod manager;
pub mod query_builder;
pub mod repository;
pub mod schema;

pub use manager::{DatabaseError, DatabaseManager};
pub use query_builder::QueryBuilder;
pub use repository::Repository;
