//! Request parameter resolution
//!
//! Everything here is synchronous and request-scoped. The only shared
//! inputs are the schema, the relation map and the override registry, all
//! read-only.

pub mod assembler;
pub mod expand;
pub mod fillable;
pub mod filter;
pub mod joins;
pub mod overrides;
pub mod sort;

pub use assembler::QueryAssembler;
pub use expand::ExpandResolver;
pub use fillable::FillableGuard;
pub use filter::{FilterResolver, PATH_SEPARATOR};
pub use joins::{JoinPlanner, JoinSet, ResolvedPath};
pub use overrides::{FilterContext, FilterHandler, OverrideRegistry, SortContext, SortHandler};
pub use sort::SortResolver;
