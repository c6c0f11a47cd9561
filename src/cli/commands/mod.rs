pub mod fixture;
pub mod schema;
