use crate::ts::errors::TreeSitterError;
use crate::ts::parser::{Dialect, ErrorNode, TypeScriptParser};

/// Validate that TypeScript source code has no syntax errors.
///
/// Returns Ok(()) if the code parses without ERROR nodes.
pub fn validate_syntax(source: &str, dialect: Dialect) -> Result<(), TreeSitterError> {
    let mut parser = TypeScriptParser::with_dialect(dialect)?;
    let parsed = parser.parse_with_source(source)?;

    errors_to_result(&parsed.error_nodes())
}

/// Check that `after` does not contain syntax errors that `before` lacked.
///
/// Errors are compared by count only: a splice shifts every later offset, so
/// positions from the two trees are not comparable.
pub fn validate_transition(
    before: &str,
    after: &str,
    dialect: Dialect,
) -> Result<(), TreeSitterError> {
    let mut parser = TypeScriptParser::with_dialect(dialect)?;

    let original_errors = parser.parse_with_source(before)?.error_nodes();
    let new_errors = parser.parse_with_source(after)?.error_nodes();

    if new_errors.len() <= original_errors.len() {
        return Ok(());
    }
    errors_to_result(&new_errors)
}

fn errors_to_result(errors: &[ErrorNode]) -> Result<(), TreeSitterError> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(TreeSitterError::SyntaxError {
            byte_start: errors[0].byte_start,
            byte_end: errors[0].byte_end,
        }),
        n => Err(TreeSitterError::MultipleSyntaxErrors { count: n }),
    }
}

/// Check if a code snippet is valid as a specific syntactic category.
pub fn validate_snippet(snippet: &str, category: SnippetCategory) -> Result<(), TreeSitterError> {
    let wrapped = match category {
        SnippetCategory::Statement => snippet.to_string(),
        SnippetCategory::Expression => format!("const __wrapper__ = ({});", snippet),
        SnippetCategory::Type => format!("type __Wrapper__ = {};", snippet),
        SnippetCategory::Parameter => format!("function __wrapper__({}) {{}}", snippet),
    };

    validate_syntax(&wrapped, Dialect::TypeScript)
}

/// Category of code snippet for validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnippetCategory {
    /// A statement or declaration
    Statement,
    /// An expression, e.g. an initializer or array element
    Expression,
    /// A type annotation body
    Type,
    /// One or more comma-separated parameters
    Parameter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_valid_syntax() {
        let source = "let a = 1;\ninterface I { p: string; }\n";
        assert!(validate_syntax(source, Dialect::TypeScript).is_ok());
    }

    #[test]
    fn validate_invalid_syntax() {
        let result = validate_syntax("function f( { }", Dialect::TypeScript);
        assert!(result.is_err());
    }

    #[test]
    fn transition_that_breaks_code_is_rejected() {
        let result = validate_transition("let a = 1;", "let a = ;", Dialect::TypeScript);
        assert!(result.is_err());
    }

    #[test]
    fn transition_on_already_broken_code() {
        let before = "function f( { let x = 1; }";
        let after = "function f( { let y = 2; }";
        assert!(validate_transition(before, after, Dialect::TypeScript).is_ok());
    }

    #[test]
    fn validate_snippets_by_category() {
        assert!(validate_snippet("x + 1", SnippetCategory::Expression).is_ok());
        assert!(validate_snippet("x +", SnippetCategory::Expression).is_err());
        assert!(validate_snippet("Array<string>", SnippetCategory::Type).is_ok());
        assert!(validate_snippet("a: number, ...rest: string[]", SnippetCategory::Parameter).is_ok());
    }
}
