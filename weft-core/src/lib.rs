//! Core model builder for the Weft service language.
//!
//! This crate does not read source text. A grammar-driven parser emits
//! construction events as it recognizes productions, and the builder
//! folds them bottom-up into an immutable program tree:
//!
//!   parser productions
//!     -> events          (one per production, in source order)
//!     -> model builder   (working stacks + per-construct assemblers)
//!     -> CompilationUnit (packages, imports, structs, services, ...)
//!
//! Downstream passes (type checking, code generation) consume the
//! finished `CompilationUnit` and are not part of this crate.

// ---------------------------------------------------------------------
// Error handling and source locations
// ---------------------------------------------------------------------

pub mod error;
pub mod location;

// ---------------------------------------------------------------------
// Names, types and literal values
// ---------------------------------------------------------------------

pub mod literal;
pub mod symbol;
pub mod types;

// ---------------------------------------------------------------------
// Program tree
// ---------------------------------------------------------------------

pub mod ast;
pub mod model;

// ---------------------------------------------------------------------
// Construction: builder, event vocabulary, event scripts
// ---------------------------------------------------------------------

pub mod builder;
pub mod event;
pub mod script;

// ---------------------------------------------------------------------
// Public API re-exports
// ---------------------------------------------------------------------

pub use builder::ModelBuilder;
pub use error::{BuildError, ScriptError};
pub use event::{Event, replay};
pub use location::NodeLocation;
pub use model::CompilationUnit;
