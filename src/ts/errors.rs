use thiserror::Error;

/// Failures of the parser wrapper, the syntax validators and the query engine.
#[derive(Error, Debug)]
pub enum TreeSitterError {
    #[error("TypeScript grammar could not be loaded into the parser")]
    LanguageSet,

    #[error("tree-sitter produced no tree for the source")]
    ParseFailed,

    #[error("invalid tree-sitter query: {message}")]
    InvalidQuery { message: String },

    #[error("target is ambiguous: {count} nodes match, expected exactly 1")]
    AmbiguousMatch { count: usize },

    #[error("no node matches the target")]
    NoMatch,

    /// Byte offsets refer to the text that was validated.
    #[error("syntax error at bytes {byte_start}..{byte_end}")]
    SyntaxError { byte_start: usize, byte_end: usize },

    #[error("{count} syntax errors (ERROR or MISSING nodes)")]
    MultipleSyntaxErrors { count: usize },

    #[error("query has no capture named '{name}'")]
    CaptureNotFound { name: String },
}
