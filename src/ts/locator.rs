use crate::ts::errors::TreeSitterError;
use crate::ts::parser::Dialect;
use crate::ts::query::{queries, CapturedNode, QueryEngine};

/// High-level structural target for locating TypeScript constructs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralTarget {
    /// The declarator of a variable by name
    Variable { name: String },

    /// The statement declaring a variable
    VariableStatement { name: String },

    /// A function declaration by name
    Function { name: String },

    /// A parameter of a function declaration
    Parameter { function: String, name: String },

    /// An interface declaration by name
    Interface { name: String },

    /// A property signature inside an interface
    PropertySignature { interface: String, name: String },

    /// The array literal initializing a variable
    ArrayOf { variable: String },

    /// The object literal initializing a variable
    ObjectOf { variable: String },

    /// Custom tree-sitter query; must capture `@target`
    Custom { query: String },
}

impl StructuralTarget {
    /// Convert to a tree-sitter query string.
    pub fn to_query(&self) -> String {
        match self {
            StructuralTarget::Variable { name } => queries::variable_declarator_by_name(name),
            StructuralTarget::VariableStatement { name } => {
                queries::variable_statement_by_name(name)
            }
            StructuralTarget::Function { name } => queries::function_by_name(name),
            StructuralTarget::Parameter { function, name } => {
                queries::parameter_by_name(function, name)
            }
            StructuralTarget::Interface { name } => queries::interface_by_name(name),
            StructuralTarget::PropertySignature { interface, name } => {
                queries::property_signature_by_name(interface, name)
            }
            StructuralTarget::ArrayOf { variable } => queries::array_for_variable(variable),
            StructuralTarget::ObjectOf { variable } => queries::object_for_variable(variable),
            StructuralTarget::Custom { query } => query.clone(),
        }
    }

    /// Locate the unique `@target` capture for this target below `root`.
    pub fn locate(
        &self,
        root: tree_sitter::Node<'_>,
        source: &str,
        dialect: Dialect,
    ) -> Result<CapturedNode, TreeSitterError> {
        let engine = QueryEngine::new(&self.to_query(), dialect)?;
        let m = engine.find_unique_in(root, source)?;
        m.capture("target").cloned()
    }
}

impl std::fmt::Display for StructuralTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StructuralTarget::Variable { name } => write!(f, "variable '{name}'"),
            StructuralTarget::VariableStatement { name } => {
                write!(f, "statement declaring '{name}'")
            }
            StructuralTarget::Function { name } => write!(f, "function '{name}'"),
            StructuralTarget::Parameter { function, name } => {
                write!(f, "parameter '{name}' of '{function}'")
            }
            StructuralTarget::Interface { name } => write!(f, "interface '{name}'"),
            StructuralTarget::PropertySignature { interface, name } => {
                write!(f, "property '{name}' of '{interface}'")
            }
            StructuralTarget::ArrayOf { variable } => write!(f, "array initializing '{variable}'"),
            StructuralTarget::ObjectOf { variable } => {
                write!(f, "object initializing '{variable}'")
            }
            StructuralTarget::Custom { .. } => write!(f, "custom query"),
        }
    }
}
