//! Traits binding entities to a persistence engine

pub mod engine;
pub mod entity;

pub use engine::PersistenceEngine;
pub use entity::{Entity, EntityKey, EntityRef};
