//! Typed views over the syntax tree of a [`SourceFile`] and the structural
//! edits they support.
//!
//! Wrappers hold a [`NodeHandle`]: a child-index path plus the kind, range
//! and generation it was issued at. Mutators consume the wrapper and return
//! a fresh one valid for the new text.

pub mod base;
pub mod function;
pub mod interface;
pub mod literal;
pub mod node;
pub mod source_file;
mod statements;
pub mod variable;

pub use base::{ModifierableNode, TypedNode};
pub use function::{FunctionDeclaration, ParameterDeclaration};
pub use interface::{InterfaceDeclaration, PropertyName, PropertySignature};
pub use literal::{ArrayLiteralExpression, ObjectLiteralExpression, PropertyAssignment};
pub use node::{AstNode, NodeHandle, TextRange};
pub use source_file::SourceFile;
pub use variable::{VariableDeclaration, VariableDeclarationList, VariableStatement};
