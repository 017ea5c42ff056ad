//! Capabilities shared by several node wrappers, plus list-insertion
//! plumbing reused by every comma-separated mutator.

use crate::ast::node::{AstNode, NodeHandle, TextRange};
use crate::ast::source_file::SourceFile;
use crate::manipulation::{
    get_nodes_to_return, insert_into_comma_separated_nodes, insert_into_parent_text_range,
    list_layout, verify_sibling_count, ManipulationError,
};
use crate::structure_to_text::{CommaSeparatedToText, ListSeparator, StructureToText};
use crate::structures::ModifierableStructure;

/// Statement kinds that only carry modifiers around a declaration.
pub(crate) const MODIFIER_WRAPPERS: &[&str] = &["export_statement", "ambient_declaration"];

/// Climb from a declaration to the outermost `export`/`declare` wrapper.
pub(crate) fn outermost_statement(
    file: &SourceFile,
    handle: &NodeHandle,
) -> Result<NodeHandle, ManipulationError> {
    let mut current = handle.clone();
    while let Some(parent) = file.parent(&current)? {
        if !MODIFIER_WRAPPERS.contains(&parent.kind()) {
            break;
        }
        current = parent;
    }
    Ok(current)
}

/// Descend from a statement through `export`/`declare` wrappers.
pub(crate) fn innermost_declaration(
    file: &SourceFile,
    statement: &NodeHandle,
) -> Result<NodeHandle, ManipulationError> {
    let mut current = statement.clone();
    loop {
        let inner = match current.kind() {
            "export_statement" => file.child_by_field(&current, "declaration")?,
            "ambient_declaration" => file.named_children(&current)?.into_iter().next(),
            _ => return Ok(current),
        };
        current = inner.ok_or_else(|| ManipulationError::not_found("declaration", current.kind()))?;
    }
}

fn ambient_declaration(
    file: &SourceFile,
    statement: &NodeHandle,
) -> Result<Option<NodeHandle>, ManipulationError> {
    match statement.kind() {
        "ambient_declaration" => Ok(Some(statement.clone())),
        "export_statement" => Ok(file
            .child_by_field(statement, "declaration")?
            .filter(|inner| inner.kind() == "ambient_declaration")),
        _ => Ok(None),
    }
}

/// Remove a whole statement and the line break that ends it.
pub(crate) fn remove_statement(
    file: &mut SourceFile,
    handle: &NodeHandle,
) -> Result<(), ManipulationError> {
    let statement = outermost_statement(file, handle)?;
    let parent = file
        .parent(&statement)?
        .ok_or_else(|| ManipulationError::not_found("parent", statement.kind()))?;

    let range = statement.range();
    let rest = &file.full_text()[range.end..];
    let end = if rest.starts_with("\r\n") {
        range.end + 2
    } else if rest.starts_with('\n') {
        range.end + 1
    } else {
        range.end
    };

    insert_into_parent_text_range(
        file,
        &parent,
        range.start,
        "",
        Some(TextRange::new(range.start, end)),
    )?;
    Ok(())
}

/// `export` / `declare` handling for statements.
///
/// Modifiers live on the outermost statement, so setters splice against the
/// statement's parent and rebuild the wrapper through
/// [`ModifierableNode::from_statement`].
pub trait ModifierableNode: AstNode {
    /// Rebuild the wrapper from its (possibly re-wrapped) statement.
    fn from_statement(file: &SourceFile, statement: NodeHandle) -> Result<Self, ManipulationError>;

    fn statement(&self, file: &SourceFile) -> Result<NodeHandle, ManipulationError> {
        outermost_statement(file, self.handle())
    }

    fn is_exported(&self, file: &SourceFile) -> Result<bool, ManipulationError> {
        Ok(self.statement(file)?.kind() == "export_statement")
    }

    fn has_declare_keyword(&self, file: &SourceFile) -> Result<bool, ManipulationError> {
        Ok(ambient_declaration(file, &self.statement(file)?)?.is_some())
    }

    fn set_is_exported(self, file: &mut SourceFile, value: bool) -> Result<Self, ManipulationError> {
        if self.is_exported(file)? == value {
            return Ok(self);
        }
        let statement = self.statement(file)?;
        let parent = statement_parent(file, &statement)?;
        let start = statement.range().start;

        if value {
            insert_into_parent_text_range(file, &parent, start, "export ", None)?;
        } else {
            let inner = file
                .child_by_field(&statement, "declaration")?
                .ok_or_else(|| ManipulationError::not_found("declaration", statement.kind()))?;
            let range = TextRange::new(start, inner.range().start);
            insert_into_parent_text_range(file, &parent, start, "", Some(range))?;
        }

        let statement = file.resolve_path(statement.path())?;
        Self::from_statement(file, statement)
    }

    fn set_has_declare_keyword(
        self,
        file: &mut SourceFile,
        value: bool,
    ) -> Result<Self, ManipulationError> {
        let statement = self.statement(file)?;
        let ambient = ambient_declaration(file, &statement)?;
        if ambient.is_some() == value {
            return Ok(self);
        }
        let parent = statement_parent(file, &statement)?;

        match ambient {
            None => {
                let pos = match file.child_by_field(&statement, "declaration")? {
                    Some(inner) if statement.kind() == "export_statement" => inner.range().start,
                    _ => statement.range().start,
                };
                insert_into_parent_text_range(file, &parent, pos, "declare ", None)?;
            }
            Some(ambient) => {
                let inner = innermost_declaration(file, &ambient)?;
                let range = TextRange::new(ambient.range().start, inner.range().start);
                insert_into_parent_text_range(file, &parent, range.start, "", Some(range))?;
            }
        }

        let statement = file.resolve_path(statement.path())?;
        Self::from_statement(file, statement)
    }

    /// Base step of every statement-level fill.
    fn fill_modifiers(
        self,
        file: &mut SourceFile,
        structure: &ModifierableStructure,
    ) -> Result<Self, ManipulationError> {
        let mut node = self;
        if let Some(exported) = structure.is_exported {
            node = node.set_is_exported(file, exported)?;
        }
        if let Some(declare) = structure.has_declare_keyword {
            node = node.set_has_declare_keyword(file, declare)?;
        }
        Ok(node)
    }
}

fn statement_parent(
    file: &SourceFile,
    statement: &NodeHandle,
) -> Result<NodeHandle, ManipulationError> {
    file.parent(statement)?
        .ok_or_else(|| ManipulationError::not_found("parent", statement.kind()))
}

/// Nodes with an optional `: type` annotation in their `type` field.
pub trait TypedNode: AstNode {
    /// Offset right after which a missing annotation is inserted.
    fn type_anchor_end(&self, file: &SourceFile) -> Result<usize, ManipulationError>;

    fn get_type_text(&self, file: &SourceFile) -> Result<Option<String>, ManipulationError> {
        match file.child_by_field(self.handle(), "type")? {
            Some(annotation) => {
                let text = file.text_of(&annotation)?;
                Ok(Some(text.trim_start_matches(':').trim().to_string()))
            }
            None => Ok(None),
        }
    }

    /// Set the annotation; an empty or blank string removes it. No splice
    /// happens when the annotation already matches.
    fn set_type(self, file: &mut SourceFile, type_text: &str) -> Result<Self, ManipulationError> {
        let type_text = type_text.trim();
        let annotation = file.child_by_field(self.handle(), "type")?;
        match annotation {
            None if type_text.is_empty() => return Ok(self),
            None => {
                let pos = self.type_anchor_end(file)?;
                let text = format!(": {type_text}");
                insert_into_parent_text_range(file, self.handle(), pos, &text, None)?;
            }
            Some(annotation) => {
                if !type_text.is_empty() && self.get_type_text(file)?.as_deref() == Some(type_text) {
                    return Ok(self);
                }
                let range = annotation.range();
                let text = if type_text.is_empty() {
                    String::new()
                } else {
                    format!(": {type_text}")
                };
                insert_into_parent_text_range(file, self.handle(), range.start, &text, Some(range))?;
            }
        }
        self.reacquire(file)
    }
}

/// Reject names that cannot possibly be written as a declaration name.
pub(crate) fn validate_new_name(new_name: &str) -> Result<(), ManipulationError> {
    if new_name.trim().is_empty() {
        return Err(ManipulationError::InvalidArgument(
            "new name must not be empty or whitespace".to_string(),
        ));
    }
    Ok(())
}

const SHORTHAND_KINDS: &[&str] = &[
    "shorthand_property_identifier",
    "shorthand_property_identifier_pattern",
];

/// A place where a renamed name is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Occurrence {
    /// Replaced by the new name.
    Name(TextRange),
    /// `{ x }` in an object or pattern: becomes `{ x: new }` so the
    /// property key is kept.
    Shorthand(TextRange),
}

impl Occurrence {
    fn range(self) -> TextRange {
        match self {
            Occurrence::Name(range) | Occurrence::Shorthand(range) => range,
        }
    }
}

/// Identifiers and shorthand properties below `scope` spelled `name`.
pub(crate) fn identifier_occurrences(
    file: &SourceFile,
    scope: &NodeHandle,
    name: &str,
) -> Result<Vec<Occurrence>, ManipulationError> {
    let mut occurrences = Vec::new();
    for node in file.descendants_of_kinds(scope, &["identifier", SHORTHAND_KINDS[0], SHORTHAND_KINDS[1]])? {
        if file.text_of(&node)? != name {
            continue;
        }
        if SHORTHAND_KINDS.contains(&node.kind()) {
            occurrences.push(Occurrence::Shorthand(node.range()));
        } else {
            occurrences.push(Occurrence::Name(node.range()));
        }
    }
    Ok(occurrences)
}

/// Rewrite every occurrence in one splice spanning from the first
/// occurrence to the last.
pub(crate) fn rename_occurrences(
    file: &mut SourceFile,
    mut occurrences: Vec<Occurrence>,
    new_name: &str,
) -> Result<(), ManipulationError> {
    validate_new_name(new_name)?;
    occurrences.sort_by_key(|occurrence| occurrence.range());
    occurrences.dedup_by_key(|occurrence| occurrence.range());
    let (Some(first), Some(last)) = (
        occurrences.first().map(|o| o.range()),
        occurrences.last().map(|o| o.range()),
    ) else {
        return Ok(());
    };

    let mut text = String::with_capacity(last.end - first.start);
    let mut cursor = first.start;
    for occurrence in &occurrences {
        let range = occurrence.range();
        text.push_str(&file.full_text()[cursor..range.start]);
        if let Occurrence::Shorthand(_) = occurrence {
            text.push_str(&file.full_text()[range.start..range.end]);
            text.push_str(": ");
        }
        text.push_str(new_name);
        cursor = range.end;
    }

    let root = file.root();
    insert_into_parent_text_range(
        file,
        &root,
        first.start,
        &text,
        Some(TextRange::new(first.start, last.end)),
    )?;
    Ok(())
}

/// Reads the sibling set of a list container.
pub(crate) type SiblingReader = fn(&SourceFile, &NodeHandle) -> Result<Vec<NodeHandle>, ManipulationError>;

/// Render `items`, splice them into `container` at `index` and return the
/// refreshed container with handles to exactly the inserted siblings.
pub(crate) fn insert_list_items<S, R: StructureToText<S>>(
    file: &mut SourceFile,
    container: &NodeHandle,
    index: usize,
    items: &[S],
    renderer: R,
    what: &'static str,
    read: SiblingReader,
) -> Result<(NodeHandle, Vec<NodeHandle>), ManipulationError> {
    let current = read(file, container)?;
    if index > current.len() {
        return Err(ManipulationError::IndexOutOfRange {
            index,
            count: current.len(),
            what,
        });
    }
    if items.is_empty() {
        return Ok((container.clone(), Vec::new()));
    }

    let layout = list_layout(file, container, &current)?;
    let separator = if layout.multi_line {
        ListSeparator::MultiLine
    } else {
        ListSeparator::Inline
    };
    let mut writer = file.writer();
    writer.set_base_indentation(&layout.indentation);
    CommaSeparatedToText::new(renderer)
        .with_separator(separator)
        .write_text(&mut writer, items);
    let text = writer.into_string();

    // A fragment can parse into more or fewer siblings than items given.
    file.atomically(|file| {
        let container = insert_into_comma_separated_nodes(file, container, &current, index, &text)?;
        let updated = read(file, &container)?;
        verify_sibling_count(what, current.len(), items.len(), updated.len())?;
        let inserted = get_nodes_to_return(&updated, index, items.len())?;
        Ok((container, inserted))
    })
}

/// Apply `fill` to each freshly inserted sibling, re-reading the set after
/// every step, then reconcile the final handles.
pub(crate) fn fill_inserted<N: AstNode, S>(
    file: &mut SourceFile,
    container: NodeHandle,
    index: usize,
    items: &[S],
    read: SiblingReader,
    fill: impl Fn(N, &mut SourceFile, &S) -> Result<N, ManipulationError>,
) -> Result<(NodeHandle, Vec<N>), ManipulationError> {
    let mut container = container;
    for (offset, item) in items.iter().enumerate() {
        let siblings = read(file, &container)?;
        let sibling = siblings.get(index + offset).cloned().ok_or(
            ManipulationError::ReconciliationMismatch {
                what: "siblings",
                expected: index + offset + 1,
                found: siblings.len(),
            },
        )?;
        fill(N::cast(sibling)?, file, item)?;
        container = file.resolve_path(container.path())?;
    }

    let nodes = get_nodes_to_return(&read(file, &container)?, index, items.len())?
        .into_iter()
        .map(N::cast)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((container, nodes))
}
