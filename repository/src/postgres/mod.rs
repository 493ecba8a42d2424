//! PostgreSQL backing for the persistence seam

mod bind;
pub mod engine;
pub mod schema_loader;

pub use engine::PgEngine;
pub use schema_loader::load_schema;
