//! Generic repository built on the query assembler

pub mod core;
pub mod definition;
pub mod operations;

pub use self::core::Repository;
pub use definition::RepositoryDefinition;
