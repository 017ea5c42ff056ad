use crate::ts::errors::TreeSitterError;
use ast_grep_language::{LanguageExt, SupportLang};
use std::path::Path;
use tree_sitter::{Parser, Tree};

/// Grammar flavour used to parse a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    TypeScript,
    Tsx,
}

impl Dialect {
    /// Pick the dialect from a file extension (`.tsx`/`.jsx` parse as TSX).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("tsx") | Some("jsx") => Dialect::Tsx,
            _ => Dialect::TypeScript,
        }
    }

    pub(crate) fn support_lang(self) -> SupportLang {
        match self {
            Dialect::TypeScript => SupportLang::TypeScript,
            Dialect::Tsx => SupportLang::Tsx,
        }
    }

    /// The tree-sitter language for this dialect.
    pub fn language(self) -> tree_sitter::Language {
        self.support_lang().get_ts_language()
    }
}

/// Tree-sitter parser wrapper for TypeScript source code.
pub struct TypeScriptParser {
    parser: Parser,
    dialect: Dialect,
}

impl TypeScriptParser {
    /// Create a new parser for plain TypeScript.
    pub fn new() -> Result<Self, TreeSitterError> {
        Self::with_dialect(Dialect::default())
    }

    /// Create a new parser targeting a specific dialect.
    pub fn with_dialect(dialect: Dialect) -> Result<Self, TreeSitterError> {
        let mut parser = Parser::new();
        parser
            .set_language(&dialect.language())
            .map_err(|_| TreeSitterError::LanguageSet)?;

        Ok(Self { parser, dialect })
    }

    /// Get the configured dialect.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Parse source code into a tree-sitter Tree.
    ///
    /// Always a full parse: no previous tree is handed to tree-sitter.
    pub fn parse(&mut self, source: &str) -> Result<Tree, TreeSitterError> {
        self.parser
            .parse(source, None)
            .ok_or(TreeSitterError::ParseFailed)
    }

    /// Parse source code and return the tree along with the source.
    pub fn parse_with_source<'a>(
        &mut self,
        source: &'a str,
    ) -> Result<ParsedSource<'a>, TreeSitterError> {
        let tree = self.parse(source)?;
        Ok(ParsedSource { source, tree })
    }
}

/// A parsed source file with its tree-sitter tree.
pub struct ParsedSource<'a> {
    pub source: &'a str,
    pub tree: Tree,
}

impl<'a> ParsedSource<'a> {
    /// Get the root node of the tree.
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Check if the tree contains any ERROR nodes.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Get all ERROR nodes in the tree.
    pub fn error_nodes(&self) -> Vec<ErrorNode> {
        error_nodes(self.tree.root_node())
    }

    /// Extract text for a node's byte range.
    pub fn node_text(&self, node: tree_sitter::Node<'_>) -> &'a str {
        &self.source[node.byte_range()]
    }
}

/// Information about an ERROR node in the parse tree.
#[derive(Debug, Clone)]
pub struct ErrorNode {
    pub byte_start: usize,
    pub byte_end: usize,
    pub start_point: tree_sitter::Point,
    pub end_point: tree_sitter::Point,
}

/// Collect every ERROR or MISSING node below `node`.
pub fn error_nodes(node: tree_sitter::Node<'_>) -> Vec<ErrorNode> {
    let mut errors = Vec::new();
    collect_error_nodes(node, &mut errors);
    errors
}

fn collect_error_nodes(node: tree_sitter::Node<'_>, errors: &mut Vec<ErrorNode>) {
    if node.is_error() || node.is_missing() {
        errors.push(ErrorNode {
            byte_start: node.start_byte(),
            byte_end: node.end_byte(),
            start_point: node.start_position(),
            end_point: node.end_position(),
        });
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_error_nodes(child, errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_typescript() {
        let mut parser = TypeScriptParser::new().unwrap();
        let source = "const x: number = 1;\nfunction f(a: string) { return a; }";
        let parsed = parser.parse_with_source(source).unwrap();

        assert!(!parsed.has_errors());
        assert_eq!(parsed.root_node().kind(), "program");
    }

    #[test]
    fn parse_invalid_typescript() {
        let mut parser = TypeScriptParser::new().unwrap();
        let source = "function f( { }";
        let parsed = parser.parse_with_source(source).unwrap();

        assert!(parsed.has_errors());
        assert!(!parsed.error_nodes().is_empty());
    }

    #[test]
    fn dialect_from_extension() {
        assert_eq!(Dialect::from_path(Path::new("a/b.tsx")), Dialect::Tsx);
        assert_eq!(Dialect::from_path(Path::new("a/b.ts")), Dialect::TypeScript);
        assert_eq!(Dialect::from_path(Path::new("noext")), Dialect::TypeScript);
    }

    #[test]
    fn tsx_parses_jsx_elements() {
        let mut parser = TypeScriptParser::with_dialect(Dialect::Tsx).unwrap();
        let parsed = parser
            .parse_with_source("const el = <div className=\"x\">hi</div>;")
            .unwrap();
        assert!(!parsed.has_errors());
    }
}
