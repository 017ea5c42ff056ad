//! The single text-mutation primitive.
//!
//! Every structural edit ends in exactly one [`Splice`] applied through
//! [`insert_into_parent_text_range`], followed by a full reparse.

use crate::ast::{NodeHandle, SourceFile, TextRange};
use crate::manipulation::errors::ManipulationError;
use tracing::debug;

/// A contiguous replace of `[start, end)` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Splice does nothing until applied to a SourceFile"]
pub struct Splice {
    pub start: usize,
    pub end: usize,
    pub new_text: String,
}

impl Splice {
    pub fn new(start: usize, end: usize, new_text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            new_text: new_text.into(),
        }
    }

    /// Check the range against `content` without touching it.
    pub fn validate(&self, content: &str) -> Result<(), ManipulationError> {
        if self.start > self.end || self.end > content.len() {
            return Err(ManipulationError::InvalidReplaceRange {
                start: self.start,
                end: self.end,
                reason: format!("source text has length {}", content.len()),
            });
        }
        for pos in [self.start, self.end] {
            if !content.is_char_boundary(pos) {
                return Err(ManipulationError::NotCharBoundary { pos });
            }
        }
        Ok(())
    }

    /// Build the spliced text. Assumes [`Splice::validate`] passed.
    pub fn apply_to(&self, content: &str) -> String {
        let mut new_content = String::with_capacity(
            content.len() + self.new_text.len() - (self.end - self.start),
        );
        new_content.push_str(&content[..self.start]);
        new_content.push_str(&self.new_text);
        new_content.push_str(&content[self.end..]);
        new_content
    }
}

/// Insert `new_text` at `insert_pos` inside `parent`, optionally replacing
/// `replacing` (which must start at `insert_pos`).
///
/// On success the tree has been rebuilt from the new text and the returned
/// handle is `parent` re-resolved at the same structural path. Every other
/// handle at or after `insert_pos` is stale.
pub fn insert_into_parent_text_range(
    file: &mut SourceFile,
    parent: &NodeHandle,
    insert_pos: usize,
    new_text: &str,
    replacing: Option<TextRange>,
) -> Result<NodeHandle, ManipulationError> {
    let parent_node = file.node(parent)?;
    let parent_range = file.range_of(parent_node);

    if !parent_range.contains_pos(insert_pos) {
        return Err(ManipulationError::InvalidInsertPosition {
            insert_pos,
            start: parent_range.start,
            end: parent_range.end,
        });
    }

    let end = match replacing {
        Some(range) => {
            if range.start != insert_pos {
                return Err(ManipulationError::InvalidReplaceRange {
                    start: range.start,
                    end: range.end,
                    reason: format!("must start at the insert position {insert_pos}"),
                });
            }
            if !parent_range.contains_range(range) {
                return Err(ManipulationError::InvalidReplaceRange {
                    start: range.start,
                    end: range.end,
                    reason: format!(
                        "must lie within parent range [{}, {}]",
                        parent_range.start, parent_range.end
                    ),
                });
            }
            range.end
        }
        None => insert_pos,
    };

    let splice = Splice::new(insert_pos, end, new_text);
    debug!(
        insert_pos,
        replaced = end - insert_pos,
        inserted = new_text.len(),
        parent = parent.kind(),
        "splicing source text"
    );
    file.apply_splice(&splice)?;
    file.resolve_path(parent.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ts::Dialect;

    fn file(text: &str) -> SourceFile {
        SourceFile::from_text(text, Dialect::TypeScript).unwrap()
    }

    #[test]
    fn splice_validate_rejects_out_of_bounds() {
        let splice = Splice::new(3, 20, "x");
        assert!(matches!(
            splice.validate("let a;"),
            Err(ManipulationError::InvalidReplaceRange { .. })
        ));
    }

    #[test]
    fn splice_validate_rejects_split_characters() {
        let splice = Splice::new(10, 10, "x");
        assert!(matches!(
            splice.validate("let a = \"é\";"),
            Err(ManipulationError::NotCharBoundary { pos: 10 })
        ));
    }

    #[test]
    fn splice_apply_replaces_range() {
        let splice = Splice::new(0, 3, "const");
        assert_eq!(splice.apply_to("let a = 1;"), "const a = 1;");
    }

    #[test]
    fn insert_reparses_and_returns_refreshed_parent() {
        let mut file = file("let a = 1;\n");
        let root = file.root();
        let generation = file.generation();

        let root = insert_into_parent_text_range(&mut file, &root, 11, "let b = 2;\n", None)
            .unwrap();

        assert_eq!(file.full_text(), "let a = 1;\nlet b = 2;\n");
        assert_eq!(file.generation(), generation + 1);
        assert_eq!(root.range(), TextRange::new(0, file.full_text().len()));
        assert_eq!(file.statements().unwrap().len(), 2);
    }

    #[test]
    fn replacing_range_must_start_at_insert_pos() {
        let mut file = file("let a = 1;");
        let root = file.root();
        let result = insert_into_parent_text_range(
            &mut file,
            &root,
            0,
            "var",
            Some(TextRange::new(1, 3)),
        );
        assert!(matches!(
            result,
            Err(ManipulationError::InvalidReplaceRange { .. })
        ));
        assert_eq!(file.full_text(), "let a = 1;");
    }

    #[test]
    fn insert_outside_parent_is_rejected_without_mutation() {
        let mut file = file("let a = 1;\nlet b = 2;");
        let first = file.statements().unwrap()[0].clone();
        let result = insert_into_parent_text_range(&mut file, &first, 15, "x", None);
        assert!(matches!(
            result,
            Err(ManipulationError::InvalidInsertPosition { insert_pos: 15, .. })
        ));
        assert_eq!(file.full_text(), "let a = 1;\nlet b = 2;");
        assert_eq!(file.generation(), 0);
    }
}
