//! The owner of a source text and the tree derived from it.

use crate::ast::node::{NodeHandle, TextRange};
use crate::config::ManipulationSettings;
use crate::manipulation::{ManipulationError, Splice};
use crate::ts::{parser, Dialect, ErrorNode, StructuralTarget, TreeSitterError, TypeScriptParser};
use crate::writer::CodeWriter;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use tree_sitter::{Node, Tree};
use xxhash_rust::xxh3::xxh3_64;

/// A parsed TypeScript file: the single mutator of its text.
///
/// Every edit replaces one contiguous range and reparses the whole text,
/// bumping [`SourceFile::generation`].
pub struct SourceFile {
    path: Option<PathBuf>,
    text: String,
    tree: Tree,
    parser: TypeScriptParser,
    settings: ManipulationSettings,
    generation: u64,
    /// Insert position of the splice that produced generation `i + 1`.
    splice_positions: Vec<usize>,
    /// xxh3 of the file contents when last read from or written to disk.
    disk_fingerprint: Option<u64>,
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("path", &self.path)
            .field("dialect", &self.parser.dialect())
            .field("generation", &self.generation)
            .field("len", &self.text.len())
            .finish()
    }
}

impl SourceFile {
    /// Parse in-memory text.
    pub fn from_text(text: impl Into<String>, dialect: Dialect) -> Result<Self, ManipulationError> {
        let text = text.into();
        let mut parser = TypeScriptParser::with_dialect(dialect)?;
        let tree = parser.parse(&text)?;
        Ok(Self {
            path: None,
            text,
            tree,
            parser,
            settings: ManipulationSettings::default(),
            generation: 0,
            splice_positions: Vec::new(),
            disk_fingerprint: None,
        })
    }

    /// Read and parse a file; the dialect follows the extension.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ManipulationError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ManipulationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let fingerprint = xxh3_64(text.as_bytes());
        let mut file = Self::from_text(text, Dialect::from_path(path))?;
        file.path = Some(path.to_path_buf());
        file.disk_fingerprint = Some(fingerprint);
        Ok(file)
    }

    pub fn with_settings(mut self, settings: ManipulationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Write the current text back to [`SourceFile::path`] atomically.
    ///
    /// Fails with [`ManipulationError::ModifiedOnDisk`] if the file changed
    /// since it was opened or last saved.
    pub fn save(&mut self) -> Result<(), ManipulationError> {
        let path = self.path.clone().ok_or(ManipulationError::NoPath)?;
        let io_err = |source| ManipulationError::Io {
            path: path.clone(),
            source,
        };

        if let Some(expected) = self.disk_fingerprint {
            let on_disk = fs::read(&path).map_err(io_err)?;
            if xxh3_64(&on_disk) != expected {
                return Err(ManipulationError::ModifiedOnDisk { path });
            }
        }

        atomic_write(&path, self.text.as_bytes()).map_err(io_err)?;

        // Update mtime so watchers notice the change even within one tick
        filetime::set_file_mtime(&path, filetime::FileTime::now()).map_err(io_err)?;

        self.disk_fingerprint = Some(xxh3_64(self.text.as_bytes()));
        debug!(path = %path.display(), bytes = self.text.len(), "saved source file");
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn full_text(&self) -> &str {
        &self.text
    }

    pub fn dialect(&self) -> Dialect {
        self.parser.dialect()
    }

    pub fn settings(&self) -> &ManipulationSettings {
        &self.settings
    }

    /// Number of splices applied so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn writer(&self) -> CodeWriter {
        CodeWriter::new(&self.settings)
    }

    /// A writer whose continuation lines are indented one level deeper than
    /// the line `handle` starts on, keeping that line's indentation as is.
    pub fn writer_with_queued_child_indentation(&self, handle: &NodeHandle) -> CodeWriter {
        let mut writer = self.writer();
        writer
            .set_base_indentation(self.indentation_at(handle.range().start))
            .queue_indentation_level(1);
        writer
    }

    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    pub fn error_nodes(&self) -> Vec<ErrorNode> {
        parser::error_nodes(self.tree.root_node())
    }

    /// Handle to the root. Its range always spans the whole text.
    pub fn root(&self) -> NodeHandle {
        self.handle_for(self.tree.root_node())
    }

    /// Resolve a handle against the current tree.
    ///
    /// Handles from earlier generations stay valid only if they end at or
    /// before every splice made since they were issued.
    pub fn node(&self, handle: &NodeHandle) -> Result<Node<'_>, ManipulationError> {
        let stale = || ManipulationError::StaleNode {
            kind: handle.kind,
            start: handle.range.start,
            end: handle.range.end,
        };

        if handle.generation > self.generation {
            return Err(stale());
        }
        if handle.generation < self.generation {
            let first_edit = self.splice_positions[handle.generation as usize..]
                .iter()
                .copied()
                .min()
                .unwrap_or(usize::MAX);
            if handle.range.end > first_edit {
                return Err(stale());
            }
        }

        let node = self.walk_path(&handle.path).ok_or_else(stale)?;
        if node.kind() != handle.kind || self.range_of(node) != handle.range {
            return Err(stale());
        }
        Ok(node)
    }

    /// Handle for whatever node now sits at `path`.
    pub(crate) fn resolve_path(&self, path: &[usize]) -> Result<NodeHandle, ManipulationError> {
        let node = self
            .walk_path(path)
            .ok_or(ManipulationError::ReconciliationMismatch {
                what: "path segments",
                expected: path.len(),
                found: self.resolvable_depth(path),
            })?;
        Ok(self.handle_at(node, path.to_vec()))
    }

    /// Issue a handle for a node of the current tree.
    pub fn handle_for(&self, node: Node<'_>) -> NodeHandle {
        let mut path = Vec::new();
        let mut current = node;
        while let Some(parent) = current.parent() {
            let mut cursor = parent.walk();
            let index = parent
                .children(&mut cursor)
                .position(|child| child.id() == current.id())
                .unwrap_or_default();
            path.push(index);
            current = parent;
        }
        path.reverse();
        self.handle_at(node, path)
    }

    /// Byte range of `node`; the root always covers the whole text.
    pub fn range_of(&self, node: Node<'_>) -> TextRange {
        if node.parent().is_none() {
            TextRange::new(0, self.text.len())
        } else {
            TextRange::new(node.start_byte(), node.end_byte())
        }
    }

    pub fn text_of(&self, handle: &NodeHandle) -> Result<&str, ManipulationError> {
        let node = self.node(handle)?;
        let range = self.range_of(node);
        Ok(&self.text[range.start..range.end])
    }

    /// All children, anonymous tokens and comments included.
    pub fn children(&self, handle: &NodeHandle) -> Result<Vec<NodeHandle>, ManipulationError> {
        self.collect_children(handle, |_| true)
    }

    /// Named children, comments excluded.
    pub fn named_children(&self, handle: &NodeHandle) -> Result<Vec<NodeHandle>, ManipulationError> {
        self.collect_children(handle, |child| child.is_named() && !child.is_extra())
    }

    pub fn named_children_of_kinds(
        &self,
        handle: &NodeHandle,
        kinds: &[&str],
    ) -> Result<Vec<NodeHandle>, ManipulationError> {
        self.collect_children(handle, |child| kinds.contains(&child.kind()))
    }

    pub fn first_child_by_kind(
        &self,
        handle: &NodeHandle,
        kind: &str,
    ) -> Result<Option<NodeHandle>, ManipulationError> {
        Ok(self
            .collect_children(handle, |child| child.kind() == kind)?
            .into_iter()
            .next())
    }

    pub fn first_child_by_kind_or_err(
        &self,
        handle: &NodeHandle,
        kind: &str,
    ) -> Result<NodeHandle, ManipulationError> {
        self.first_child_by_kind(handle, kind)?
            .ok_or_else(|| ManipulationError::not_found(format!("`{kind}`"), handle.kind))
    }

    pub fn child_by_field(
        &self,
        handle: &NodeHandle,
        field: &str,
    ) -> Result<Option<NodeHandle>, ManipulationError> {
        let node = self.node(handle)?;
        let mut cursor = node.walk();
        let found = node
            .children(&mut cursor)
            .enumerate()
            .find(|(index, _)| node.field_name_for_child(*index as u32) == Some(field));
        Ok(found.map(|(index, child)| self.handle_at(child, child_path(handle, index))))
    }

    pub fn parent(&self, handle: &NodeHandle) -> Result<Option<NodeHandle>, ManipulationError> {
        self.node(handle)?;
        match handle.parent_path() {
            Some(path) => self.resolve_path(path).map(Some),
            None => Ok(None),
        }
    }

    /// Every descendant of `handle` whose kind is in `kinds`, in source order.
    pub fn descendants_of_kinds(
        &self,
        handle: &NodeHandle,
        kinds: &[&str],
    ) -> Result<Vec<NodeHandle>, ManipulationError> {
        let node = self.node(handle)?;
        let mut found = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if kinds.contains(&current.kind()) {
                found.push(self.handle_for(current));
            }
            let mut cursor = current.walk();
            let children: Vec<Node<'_>> = current.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
        Ok(found)
    }

    /// Top-level statements, comments excluded.
    pub fn statements(&self) -> Result<Vec<NodeHandle>, ManipulationError> {
        self.named_children(&self.root())
    }

    /// Locate a unique named construct.
    pub fn locate(&self, target: &StructuralTarget) -> Result<NodeHandle, ManipulationError> {
        let root = self.tree.root_node();
        let captured = target
            .locate(root, &self.text, self.dialect())
            .map_err(|err| match err {
                TreeSitterError::NoMatch => ManipulationError::not_found(target.to_string(), "program"),
                other => other.into(),
            })?;

        let mut node = root
            .descendant_for_byte_range(captured.byte_start, captured.byte_end)
            .ok_or_else(|| ManipulationError::not_found(target.to_string(), root.kind()))?;
        while node.kind() != captured.kind {
            match node.parent() {
                Some(parent) if parent.byte_range() == node.byte_range() => node = parent,
                _ => return Err(ManipulationError::not_found(target.to_string(), root.kind())),
            }
        }
        Ok(self.handle_for(node))
    }

    /// Leading whitespace of the line containing `pos`.
    pub fn indentation_at(&self, pos: usize) -> &str {
        let line_start = self.text[..pos].rfind('\n').map_or(0, |i| i + 1);
        let line = &self.text[line_start..];
        let trimmed = line.trim_start_matches([' ', '\t']);
        &line[..line.len() - trimmed.len()]
    }

    pub fn indentation_level_at(&self, pos: usize) -> usize {
        let indentation = self.indentation_at(pos);
        let unit = match self.settings.indentation.as_str() {
            "\t" => 4,
            spaces => spaces.len(),
        };
        let tabs = indentation.chars().filter(|c| *c == '\t').count();
        let spaces = indentation.len() - tabs;
        tabs + spaces / unit
    }

    /// Replace text and rebuild the tree. Nothing changes if either fails.
    pub(crate) fn apply_splice(&mut self, splice: &Splice) -> Result<(), ManipulationError> {
        splice.validate(&self.text)?;
        let new_text = splice.apply_to(&self.text);
        let tree = self.parser.parse(&new_text)?;

        self.text = new_text;
        self.tree = tree;
        self.splice_positions.push(splice.start);
        self.generation += 1;
        Ok(())
    }

    /// Run `edit`. If it fails after changing the text, the previous text is
    /// put back with [`SourceFile::revert_to`] and the edit's error returned.
    pub(crate) fn atomically<T>(
        &mut self,
        edit: impl FnOnce(&mut Self) -> Result<T, ManipulationError>,
    ) -> Result<T, ManipulationError> {
        let before = self.text.clone();
        match edit(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                if self.text != before {
                    debug!(error = %err, "edit failed after splicing, reverting");
                    self.revert_to(&before)?;
                }
                Err(err)
            }
        }
    }

    /// Restore `previous` with one splice over the span where it differs
    /// from the current text.
    pub(crate) fn revert_to(&mut self, previous: &str) -> Result<(), ManipulationError> {
        let (start, current_end, previous_end) = differing_span(&self.text, previous);
        if start == current_end && start == previous_end {
            return Ok(());
        }
        let splice = Splice::new(start, current_end, &previous[start..previous_end]);
        self.apply_splice(&splice)
    }

    fn walk_path(&self, path: &[usize]) -> Option<Node<'_>> {
        let mut node = self.tree.root_node();
        for &index in path {
            let mut cursor = node.walk();
            let child = node.children(&mut cursor).nth(index)?;
            node = child;
        }
        Some(node)
    }

    fn resolvable_depth(&self, path: &[usize]) -> usize {
        (0..=path.len())
            .rev()
            .find(|depth| self.walk_path(&path[..*depth]).is_some())
            .unwrap_or(0)
    }

    fn handle_at(&self, node: Node<'_>, path: Vec<usize>) -> NodeHandle {
        NodeHandle {
            path,
            kind: node.kind(),
            range: self.range_of(node),
            generation: self.generation,
        }
    }

    fn collect_children(
        &self,
        handle: &NodeHandle,
        keep: impl Fn(&Node<'_>) -> bool,
    ) -> Result<Vec<NodeHandle>, ManipulationError> {
        let node = self.node(handle)?;
        let mut cursor = node.walk();
        let children = node
            .children(&mut cursor)
            .enumerate()
            .filter(|(_, child)| keep(child))
            .map(|(index, child)| self.handle_at(child, child_path(handle, index)))
            .collect();
        Ok(children)
    }
}

fn child_path(parent: &NodeHandle, index: usize) -> Vec<usize> {
    let mut path = parent.path.clone();
    path.push(index);
    path
}

/// Atomic file write: tempfile + fsync + rename.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    // Same directory keeps the rename on one filesystem
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

/// `(start, current_end, previous_end)`: the shared prefix ends at `start`,
/// and the shared suffix starts at `current_end` in `current` and at
/// `previous_end` in `previous`. All offsets are char boundaries.
fn differing_span(current: &str, previous: &str) -> (usize, usize, usize) {
    let (a, b) = (current.as_bytes(), previous.as_bytes());
    let mut start = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    while !current.is_char_boundary(start) {
        start -= 1;
    }

    let max_suffix = a.len().min(b.len()) - start;
    let mut suffix = a
        .iter()
        .rev()
        .zip(b.iter().rev())
        .take(max_suffix)
        .take_while(|(x, y)| x == y)
        .count();
    while !current.is_char_boundary(a.len() - suffix) || !previous.is_char_boundary(b.len() - suffix) {
        suffix -= 1;
    }
    (start, a.len() - suffix, b.len() - suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manipulation::insert_into_parent_text_range;

    fn file(text: &str) -> SourceFile {
        SourceFile::from_text(text, Dialect::TypeScript).unwrap()
    }

    #[test]
    fn root_spans_whole_text_including_trailing_whitespace() {
        let file = file("  let a = 1;  \n\n");
        assert_eq!(file.root().range(), TextRange::new(0, 16));
        assert_eq!(file.root().kind(), "program");
    }

    #[test]
    fn handle_round_trips_through_path() {
        let file = file("let a = 1;\nfunction f(x: number) {}\n");
        let function = file.statements().unwrap()[1].clone();
        let params = file.child_by_field(&function, "parameters").unwrap().unwrap();
        let again = file.handle_for(file.node(&params).unwrap());
        assert_eq!(params, again);
        assert_eq!(file.text_of(&params).unwrap(), "(x: number)");
    }

    #[test]
    fn statements_skip_comments() {
        let file = file("// leading\nlet a = 1;\n/* mid */\nlet b = 2;\n");
        let statements = file.statements().unwrap();
        assert_eq!(statements.len(), 2);
        assert!(statements.iter().all(|s| s.kind() == "lexical_declaration"));
    }

    #[test]
    fn first_child_by_kind_or_err_reports_not_found() {
        let file = file("let a = 1;");
        let statement = file.statements().unwrap().remove(0);
        assert!(file.first_child_by_kind_or_err(&statement, "let").is_ok());
        assert!(matches!(
            file.first_child_by_kind_or_err(&statement, "var"),
            Err(ManipulationError::NotFound { .. })
        ));
    }

    #[test]
    fn handles_after_the_edit_become_stale() {
        let mut file = file("let a = 1;\nlet b = 2;\nlet c = 3;\n");
        let statements = file.statements().unwrap();
        let root = file.root();

        // Rewrite `b` in place.
        let b_start = statements[1].range().start;
        insert_into_parent_text_range(
            &mut file,
            &root,
            b_start,
            "const",
            Some(TextRange::new(b_start, b_start + 3)),
        )
        .unwrap();

        assert!(file.node(&statements[0]).is_ok());
        assert!(matches!(
            file.node(&statements[1]),
            Err(ManipulationError::StaleNode { .. })
        ));
        assert!(matches!(
            file.node(&statements[2]),
            Err(ManipulationError::StaleNode { .. })
        ));
        assert!(matches!(
            file.node(&root),
            Err(ManipulationError::StaleNode { .. })
        ));
    }

    #[test]
    fn indentation_queries() {
        let file = file("function f() {\n\tif (x) {\n\t\ty();\n\t}\n}\n")
            .with_settings(ManipulationSettings {
                indentation: crate::config::IndentationText::Tab,
                ..Default::default()
            });
        let pos = file.full_text().find("y()").unwrap();
        assert_eq!(file.indentation_at(pos), "\t\t");
        assert_eq!(file.indentation_level_at(pos), 2);
    }

    #[test]
    fn save_writes_atomically_and_detects_external_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.ts");
        fs::write(&path, "let a = 1;\n").unwrap();

        let mut file = SourceFile::open(&path).unwrap();
        let root = file.root();
        insert_into_parent_text_range(&mut file, &root, 11, "let b = 2;\n", None).unwrap();
        file.save().unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "let a = 1;\nlet b = 2;\n"
        );

        fs::write(&path, "// changed elsewhere\n").unwrap();
        assert!(matches!(
            file.save(),
            Err(ManipulationError::ModifiedOnDisk { .. })
        ));
    }

    #[test]
    fn save_without_path_fails() {
        let mut file = file("let a = 1;");
        assert!(matches!(file.save(), Err(ManipulationError::NoPath)));
    }

    #[test]
    fn differing_span_covers_only_the_change() {
        assert_eq!(differing_span("let a = 1, b;", "let a = 1;"), (9, 12, 9));
        assert_eq!(differing_span("same", "same"), (4, 4, 4));
        // Shared bytes inside a multi-byte char do not split it.
        assert_eq!(differing_span("'é'", "'è'"), (1, 3, 3));
    }

    #[test]
    fn failed_edit_is_reverted_with_one_splice() {
        let mut file = file("let a = 1;\n");
        let root = file.root();
        let result: Result<(), _> = file.atomically(|file| {
            insert_into_parent_text_range(file, &root, 9, ", b", None)?;
            Err(ManipulationError::InvalidArgument("rejected".to_string()))
        });

        assert!(matches!(result, Err(ManipulationError::InvalidArgument(_))));
        assert_eq!(file.full_text(), "let a = 1;\n");
        assert_eq!(file.generation(), 2);
    }

    #[test]
    fn child_writer_keeps_line_indentation_verbatim() {
        let file = file("function f() {\n  const o = g(a,\n    b);\n}\n");
        let function = file.statements().unwrap().remove(0);
        let body = file.child_by_field(&function, "body").unwrap().unwrap();
        let statement = file.named_children(&body).unwrap().remove(0);

        let mut writer = file.writer_with_queued_child_indentation(&statement);
        writer.write("x,\ny");
        assert_eq!(writer.into_string(), "x,\n      y");
    }
}
