pub mod error;
pub mod schema;
pub mod vertical;
pub mod vertical_index;
pub mod hitting_set;
pub mod set_system;

// Re-exports to flatten the crate.
pub use error::{ParseError, Result, SchemaError};
pub use schema::{Column, RelationSchema, SchemaBuilder, SchemaId};
pub use vertical::Vertical;
pub use vertical_index::VerticalIndex;
pub use hitting_set::{hitting_set, HittingSetSolver, SolverConfig, SolverStats};
pub use set_system::SetSystem;
