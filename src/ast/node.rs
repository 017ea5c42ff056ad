use crate::manipulation::ManipulationError;
use std::fmt;

/// Half-open byte range `[start, end)` into a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "text range start {start} is after end {end}");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Positions are inclusive of `end`: inserting at the end is allowed.
    pub fn contains_pos(&self, pos: usize) -> bool {
        self.start <= pos && pos <= self.end
    }

    pub fn contains_range(&self, other: TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Position-independent handle to a node of a [`SourceFile`](super::SourceFile).
///
/// A handle records the child-index path from the root, the node kind and
/// its range at the time it was issued. It never borrows the tree, so it
/// survives edits; [`SourceFile::node`](super::SourceFile::node) decides on
/// resolution whether it is still valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    pub(crate) path: Vec<usize>,
    pub(crate) kind: &'static str,
    pub(crate) range: TextRange,
    pub(crate) generation: u64,
}

impl NodeHandle {
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn path(&self) -> &[usize] {
        &self.path
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Path of the parent node, `None` for the root.
    pub fn parent_path(&self) -> Option<&[usize]> {
        self.path.split_last().map(|(_, parent)| parent)
    }
}

/// A typed view over a [`NodeHandle`] of one or more syntax kinds.
pub trait AstNode: Sized {
    /// Tree-sitter kinds this wrapper accepts.
    const KINDS: &'static [&'static str];

    /// Wrap without checking the kind.
    fn wrap(handle: NodeHandle) -> Self;

    fn handle(&self) -> &NodeHandle;

    fn cast(handle: NodeHandle) -> Result<Self, ManipulationError> {
        if Self::KINDS.contains(&handle.kind()) {
            Ok(Self::wrap(handle))
        } else {
            Err(ManipulationError::UnexpectedKind {
                expected: Self::KINDS.join(" | "),
                found: handle.kind(),
            })
        }
    }

    fn range(&self) -> TextRange {
        self.handle().range()
    }

    fn text<'a>(&self, file: &'a super::SourceFile) -> Result<&'a str, ManipulationError> {
        file.text_of(self.handle())
    }

    /// Re-resolve at the same structural path. Valid after edits made
    /// inside this node or entirely after it.
    fn reacquire(&self, file: &super::SourceFile) -> Result<Self, ManipulationError> {
        Self::cast(file.resolve_path(self.handle().path())?)
    }
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, [$($kind:literal),+ $(,)?]) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name(NodeHandle);

        impl AstNode for $name {
            const KINDS: &'static [&'static str] = &[$($kind),+];

            fn wrap(handle: NodeHandle) -> Self {
                Self(handle)
            }

            fn handle(&self) -> &NodeHandle {
                &self.0
            }
        }
    };
}

pub(crate) use ast_node;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_containment_is_end_inclusive_for_positions() {
        let range = TextRange::new(2, 5);
        assert!(range.contains_pos(2));
        assert!(range.contains_pos(5));
        assert!(!range.contains_pos(6));
        assert!(range.contains_range(TextRange::new(3, 5)));
        assert!(!range.contains_range(TextRange::new(1, 3)));
        assert_eq!(range.len(), 3);
        assert_eq!(range.to_string(), "[2, 5)");
    }

    #[test]
    fn parent_path_of_root_is_none() {
        let handle = NodeHandle {
            path: vec![],
            kind: "program",
            range: TextRange::new(0, 0),
            generation: 0,
        };
        assert!(handle.parent_path().is_none());

        let child = NodeHandle {
            path: vec![0, 2],
            ..handle
        };
        assert_eq!(child.parent_path(), Some(&[0usize][..]));
    }
}
