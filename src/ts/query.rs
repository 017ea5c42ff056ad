use crate::ts::errors::TreeSitterError;
use crate::ts::parser::{Dialect, ParsedSource};
use std::collections::HashMap;
use tree_sitter::{Query, QueryCursor, StreamingIterator};

/// A match from a tree-sitter query with captured nodes.
#[derive(Debug, Clone)]
pub struct QueryMatch {
    /// The full match byte range
    pub byte_start: usize,
    pub byte_end: usize,
    /// Named captures: capture_name -> (byte_start, byte_end, text, kind)
    pub captures: HashMap<String, CapturedNode>,
}

impl QueryMatch {
    /// Look up a capture, failing if the query did not bind it.
    pub fn capture(&self, name: &str) -> Result<&CapturedNode, TreeSitterError> {
        self.captures
            .get(name)
            .ok_or_else(|| TreeSitterError::CaptureNotFound {
                name: name.to_string(),
            })
    }
}

#[derive(Debug, Clone)]
pub struct CapturedNode {
    pub byte_start: usize,
    pub byte_end: usize,
    pub text: String,
    pub kind: String,
}

/// Engine for executing tree-sitter queries against parsed TypeScript source.
pub struct QueryEngine {
    query: Query,
    capture_names: Vec<String>,
}

impl QueryEngine {
    /// Create a new query engine from a tree-sitter query string.
    ///
    /// # Query Syntax
    ///
    /// Tree-sitter queries use S-expression syntax:
    /// ```text
    /// (function_declaration
    ///   name: (identifier) @name
    ///   parameters: (formal_parameters) @params)
    /// ```
    ///
    /// Captures are prefixed with `@` and can be referenced by name.
    pub fn new(query_str: &str, dialect: Dialect) -> Result<Self, TreeSitterError> {
        let query = Query::new(&dialect.language(), query_str).map_err(|e| {
            TreeSitterError::InvalidQuery {
                message: e.to_string(),
            }
        })?;

        let capture_names = query.capture_names().iter().map(|s| s.to_string()).collect();

        Ok(Self {
            query,
            capture_names,
        })
    }

    /// Execute the query against parsed source and return all matches.
    pub fn find_all(&self, parsed: &ParsedSource<'_>) -> Vec<QueryMatch> {
        self.find_all_in(parsed.root_node(), parsed.source)
    }

    /// Execute the query below `root`, reading node text from `source`.
    pub fn find_all_in(&self, root: tree_sitter::Node<'_>, source: &str) -> Vec<QueryMatch> {
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.query, root, source.as_bytes());

        let mut results = Vec::new();

        // tree-sitter 0.25+ uses StreamingIterator
        while let Some(m) = matches.next() {
            let mut captures = HashMap::new();
            let mut overall_start = usize::MAX;
            let mut overall_end = 0usize;

            for capture in m.captures {
                let node = capture.node;
                let name = &self.capture_names[capture.index as usize];

                overall_start = overall_start.min(node.start_byte());
                overall_end = overall_end.max(node.end_byte());

                captures.insert(
                    name.clone(),
                    CapturedNode {
                        byte_start: node.start_byte(),
                        byte_end: node.end_byte(),
                        text: source[node.byte_range()].to_string(),
                        kind: node.kind().to_string(),
                    },
                );
            }

            if overall_start != usize::MAX {
                results.push(QueryMatch {
                    byte_start: overall_start,
                    byte_end: overall_end,
                    captures,
                });
            }
        }

        results
    }

    /// Execute the query and expect exactly one match.
    pub fn find_unique_in(
        &self,
        root: tree_sitter::Node<'_>,
        source: &str,
    ) -> Result<QueryMatch, TreeSitterError> {
        let mut matches = self.find_all_in(root, source);

        match matches.len() {
            0 => Err(TreeSitterError::NoMatch),
            1 => Ok(matches.remove(0)),
            n => Err(TreeSitterError::AmbiguousMatch { count: n }),
        }
    }

    /// Get capture names defined in the query.
    pub fn capture_names(&self) -> &[String] {
        &self.capture_names
    }
}

/// Common tree-sitter queries for TypeScript constructs.
///
/// Every query captures the located construct as `@target`.
pub mod queries {
    /// `$` is the only identifier character with regex meaning.
    fn ident_pattern(name: &str) -> String {
        name.replace('$', "[$]")
    }

    /// The declarator `x` in `let x = ...`.
    pub fn variable_declarator_by_name(name: &str) -> String {
        format!(
            r#"(variable_declarator
                name: (identifier) @name
                (#eq? @name "{name}")
            ) @target"#
        )
    }

    /// The statement (`lexical_declaration` or `variable_declaration`) declaring `name`.
    pub fn variable_statement_by_name(name: &str) -> String {
        format!(
            r#"(_
                (variable_declarator
                    name: (identifier) @name
                    (#eq? @name "{name}")
                )
            ) @target"#
        )
    }

    /// A function declaration by name.
    pub fn function_by_name(name: &str) -> String {
        format!(
            r#"(function_declaration
                name: (identifier) @name
                (#eq? @name "{name}")
            ) @target"#
        )
    }

    /// A parameter of a named function; matches rest parameters too.
    pub fn parameter_by_name(function: &str, parameter: &str) -> String {
        let pattern = ident_pattern(parameter);
        format!(
            r#"(function_declaration
                name: (identifier) @function
                (#eq? @function "{function}")
                parameters: (formal_parameters
                    (_
                        pattern: (_) @name
                        (#match? @name "^([.][.][.])?{pattern}$")
                    ) @target
                )
            )"#
        )
    }

    /// An interface declaration by name.
    pub fn interface_by_name(name: &str) -> String {
        format!(
            r#"(interface_declaration
                name: (type_identifier) @name
                (#eq? @name "{name}")
            ) @target"#
        )
    }

    /// A property signature inside a named interface.
    pub fn property_signature_by_name(interface: &str, property: &str) -> String {
        let property = property.replace('\\', "\\\\").replace('"', "\\\"");
        format!(
            r#"(interface_declaration
                name: (type_identifier) @interface
                (#eq? @interface "{interface}")
                body: (_
                    (property_signature
                        name: (_) @name
                        (#eq? @name "{property}")
                    ) @target
                )
            )"#
        )
    }

    /// The array literal initializing variable `name`.
    pub fn array_for_variable(name: &str) -> String {
        format!(
            r#"(variable_declarator
                name: (identifier) @name
                (#eq? @name "{name}")
                value: (array) @target
            )"#
        )
    }

    /// The object literal initializing variable `name`.
    pub fn object_for_variable(name: &str) -> String {
        format!(
            r#"(variable_declarator
                name: (identifier) @name
                (#eq? @name "{name}")
                value: (object) @target
            )"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ts::parser::TypeScriptParser;

    fn parse(source: &str) -> ParsedSource<'_> {
        TypeScriptParser::new()
            .unwrap()
            .parse_with_source(source)
            .unwrap()
    }

    #[test]
    fn find_function_by_name() {
        let source = "function helper() {}\nfunction main(a: number) { helper(); }\n";
        let parsed = parse(source);
        let engine =
            QueryEngine::new(&queries::function_by_name("main"), Dialect::TypeScript).unwrap();

        let matches = engine.find_all(&parsed);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].captures["name"].text, "main");
        assert_eq!(matches[0].captures["target"].kind, "function_declaration");
    }

    #[test]
    fn find_statement_for_var_and_const() {
        let source = "var a = 1;\nconst b = 2, c = 3;\n";
        let parsed = parse(source);

        let engine =
            QueryEngine::new(&queries::variable_statement_by_name("a"), Dialect::TypeScript)
                .unwrap();
        let m = engine.find_unique_in(parsed.root_node(), source).unwrap();
        assert_eq!(m.captures["target"].kind, "variable_declaration");

        let engine =
            QueryEngine::new(&queries::variable_statement_by_name("c"), Dialect::TypeScript)
                .unwrap();
        let m = engine.find_unique_in(parsed.root_node(), source).unwrap();
        assert_eq!(m.captures["target"].text, "const b = 2, c = 3;");
    }

    #[test]
    fn find_rest_parameter() {
        let source = "function f(a: number, ...rest: string[]) {}";
        let parsed = parse(source);
        let engine = QueryEngine::new(
            &queries::parameter_by_name("f", "rest"),
            Dialect::TypeScript,
        )
        .unwrap();
        let m = engine.find_unique_in(parsed.root_node(), source).unwrap();
        assert_eq!(m.captures["target"].text, "...rest: string[]");
    }

    #[test]
    fn find_property_signature() {
        let source = "interface Identifier { prop: string; other: number; }";
        let parsed = parse(source);
        let engine = QueryEngine::new(
            &queries::property_signature_by_name("Identifier", "other"),
            Dialect::TypeScript,
        )
        .unwrap();
        let m = engine.find_unique_in(parsed.root_node(), source).unwrap();
        assert_eq!(m.captures["target"].text, "other: number");
    }

    #[test]
    fn ambiguous_match_error() {
        let source = "function test() {}\nfunction test() {}\n";
        let parsed = parse(source);
        let engine =
            QueryEngine::new(&queries::function_by_name("test"), Dialect::TypeScript).unwrap();

        let result = engine.find_unique_in(parsed.root_node(), source);
        assert!(matches!(
            result,
            Err(TreeSitterError::AmbiguousMatch { count: 2 })
        ));
    }

    #[test]
    fn no_match_error() {
        let source = "function main() {}";
        let parsed = parse(source);
        let engine = QueryEngine::new(
            &queries::function_by_name("nonexistent"),
            Dialect::TypeScript,
        )
        .unwrap();

        let result = engine.find_unique_in(parsed.root_node(), source);
        assert!(matches!(result, Err(TreeSitterError::NoMatch)));
    }

    #[test]
    fn invalid_query_is_reported() {
        let result = QueryEngine::new("(function_declaration", Dialect::TypeScript);
        assert!(matches!(result, Err(TreeSitterError::InvalidQuery { .. })));
    }
}
