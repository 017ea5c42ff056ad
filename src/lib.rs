//! ts-splice: structural edits for TypeScript sources
//!
//! Every edit, whatever its shape, is funnelled into one contiguous text
//! replacement followed by a full tree-sitter reparse. Structural intent is
//! expressed with typed node wrappers and plain-data structures; the text
//! machinery decides where the bytes go.
//!
//! # Architecture
//!
//! - [`writer`]: indentation-aware text accumulator.
//! - [`structures`] and [`structure_to_text`]: data descriptions of
//!   constructs and their renderers.
//! - [`manipulation`]: the single-splice primitive, comma-separated list
//!   editing and reconciliation of sibling handles after a reparse.
//! - [`ast`]: [`SourceFile`] and typed wrappers exposing intent-named
//!   mutators and `fill`.
//! - [`ts`]: tree-sitter parsing, validation and queries.
//! - [`config`]: settings and TOML edit plans.
//!
//! # Guarantees
//!
//! - One splice and one reparse per logical edit
//! - Preconditions are checked before any text changes
//! - Handles ending before an edit stay valid; later ones report stale
//! - Atomic file writes (tempfile + fsync + rename)
//!
//! # Example
//!
//! ```
//! use ts_splice::ast::SourceFile;
//! use ts_splice::structures::VariableDeclarationType;
//! use ts_splice::ts::Dialect;
//!
//! let mut file = SourceFile::from_text("var answer = 42;\n", Dialect::TypeScript)?;
//! let statement = file.get_variable_statement("answer")?;
//! statement.set_declaration_type(&mut file, VariableDeclarationType::Const)?;
//! assert_eq!(file.full_text(), "const answer = 42;\n");
//! # Ok::<(), ts_splice::ManipulationError>(())
//! ```

pub mod ast;
pub mod config;
pub mod manipulation;
pub mod structure_to_text;
pub mod structures;
pub mod ts;
pub mod writer;

// Re-exports
pub use ast::{AstNode, NodeHandle, SourceFile, TextRange};
pub use config::{
    apply_plan, load_from_path, load_from_str, ApplicationError, ConfigError, EditPlan,
    EditResult, ManipulationSettings,
};
pub use manipulation::{
    get_nodes_to_return, insert_into_comma_separated_nodes, insert_into_parent_text_range,
    ManipulationError,
};
pub use ts::{Dialect, StructuralTarget, TreeSitterError};
pub use writer::CodeWriter;
