//! Tree-sitter integration for TypeScript sources.
//!
//! This module wraps the tree-sitter TypeScript/TSX grammars shipped with
//! ast-grep-language: full-text parsing, syntax validation, and query-based
//! span location for named constructs.

pub mod errors;
pub mod locator;
pub mod parser;
pub mod query;
pub mod validator;

pub use errors::TreeSitterError;
pub use locator::StructuralTarget;
pub use parser::{Dialect, ErrorNode, ParsedSource, TypeScriptParser};
pub use query::{queries, CapturedNode, QueryEngine, QueryMatch};
pub use validator::{validate_snippet, validate_syntax, validate_transition, SnippetCategory};
