//! Insertion and removal inside comma-separated sibling sets: parameters,
//! variable declarators, array elements and object members.

use crate::ast::{NodeHandle, SourceFile, TextRange};
use crate::manipulation::errors::ManipulationError;
use crate::manipulation::splice::insert_into_parent_text_range;
use tracing::trace;

const OPEN_DELIMITERS: &[&str] = &["(", "[", "{", "<"];
const CLOSE_DELIMITERS: &[&str] = &[")", "]", "}", ">"];

/// How the existing elements of a list are laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLayout {
    /// At least one element starts on a different line than what precedes
    /// it. An empty list counts when its delimiters are on different lines.
    pub multi_line: bool,
    /// Leading whitespace of the elements' lines, copied from the source.
    pub indentation: String,
}

/// Offset where the first element of `parent`'s list goes when it is empty:
/// just after the opening delimiter, or the start of `parent` if it has none.
pub fn list_start(file: &SourceFile, parent: &NodeHandle) -> Result<usize, ManipulationError> {
    let open = file
        .children(parent)?
        .into_iter()
        .find(|child| OPEN_DELIMITERS.contains(&child.kind()));
    Ok(match open {
        Some(open) => open.range().end,
        None => parent.range().start,
    })
}

/// Start of the closing delimiter, or the end of `parent` if it has none.
fn list_end(file: &SourceFile, parent: &NodeHandle) -> Result<usize, ManipulationError> {
    let close = file
        .children(parent)?
        .into_iter()
        .rev()
        .find(|child| CLOSE_DELIMITERS.contains(&child.kind()));
    Ok(match close {
        Some(close) => close.range().start,
        None => parent.range().end,
    })
}

/// Inspect the whitespace between existing elements.
pub fn list_layout(
    file: &SourceFile,
    parent: &NodeHandle,
    current_nodes: &[NodeHandle],
) -> Result<ListLayout, ManipulationError> {
    let start = list_start(file, parent)?;
    let multi_line = if current_nodes.is_empty() {
        let end = list_end(file, parent)?.max(start);
        file.full_text()[start..end].contains('\n')
    } else {
        let mut previous_end = start;
        current_nodes.iter().any(|node| {
            let gap = &file.full_text()[previous_end..node.range().start];
            previous_end = node.range().end;
            gap.contains('\n')
        })
    };

    let indentation = match current_nodes.first() {
        Some(first) if multi_line => file.indentation_at(first.range().start).to_string(),
        _ => format!(
            "{}{}",
            file.indentation_at(parent.range().start),
            file.settings().indentation.as_str()
        ),
    };

    Ok(ListLayout {
        multi_line,
        indentation,
    })
}

/// Splice `new_text` (one or more already-joined elements) into the list so
/// that it occupies position `insert_index`.
///
/// Separators are added on the side facing existing elements only: none for
/// an empty list, one before the text when appending, one after it
/// otherwise. Multi-line lists get a newline and the neighbour's indentation.
/// An empty list spanning several lines gets the text on its own line.
pub fn insert_into_comma_separated_nodes(
    file: &mut SourceFile,
    parent: &NodeHandle,
    current_nodes: &[NodeHandle],
    insert_index: usize,
    new_text: &str,
) -> Result<NodeHandle, ManipulationError> {
    if insert_index > current_nodes.len() {
        return Err(ManipulationError::IndexOutOfRange {
            index: insert_index,
            count: current_nodes.len(),
            what: "list elements",
        });
    }

    let layout = list_layout(file, parent, current_nodes)?;
    let multi_line = layout.multi_line;
    let (insert_pos, text) = if current_nodes.is_empty() {
        let text = if multi_line {
            format!(
                "{}{}{new_text}",
                file.settings().new_line.as_str(),
                layout.indentation
            )
        } else {
            new_text.to_string()
        };
        (list_start(file, parent)?, text)
    } else if insert_index == current_nodes.len() {
        let last = &current_nodes[current_nodes.len() - 1];
        let separator = separator(file, last, multi_line);
        (last.range().end, format!("{separator}{new_text}"))
    } else {
        let next = &current_nodes[insert_index];
        let separator = separator(file, next, multi_line);
        (next.range().start, format!("{new_text}{separator}"))
    };

    trace!(insert_index, insert_pos, multi_line, "inserting into comma-separated list");
    insert_into_parent_text_range(file, parent, insert_pos, &text, None)
}

/// Remove the element at `index` together with the separator it owns.
///
/// The separator after the element is removed, except for the last element,
/// which takes the separator before it. A trailing comma stays in place.
pub fn remove_comma_separated_node(
    file: &mut SourceFile,
    parent: &NodeHandle,
    current_nodes: &[NodeHandle],
    index: usize,
) -> Result<NodeHandle, ManipulationError> {
    if index >= current_nodes.len() {
        return Err(ManipulationError::IndexOutOfRange {
            index,
            count: current_nodes.len(),
            what: "list elements",
        });
    }

    let node = current_nodes[index].range();
    let range = if current_nodes.len() == 1 {
        TextRange::new(node.start, end_of_trailing_comma(file.full_text(), node.end))
    } else if index + 1 < current_nodes.len() {
        TextRange::new(node.start, current_nodes[index + 1].range().start)
    } else {
        TextRange::new(current_nodes[index - 1].range().end, node.end)
    };

    trace!(index, start = range.start, end = range.end, "removing list element");
    insert_into_parent_text_range(file, parent, range.start, "", Some(range))
}

fn separator(file: &SourceFile, neighbour: &NodeHandle, multi_line: bool) -> String {
    if multi_line {
        format!(
            ",{}{}",
            file.settings().new_line.as_str(),
            file.indentation_at(neighbour.range().start)
        )
    } else {
        ", ".to_string()
    }
}

/// End of a `,` following `pos` (across whitespace), or `pos` if none.
fn end_of_trailing_comma(text: &str, pos: usize) -> usize {
    let rest = &text[pos..];
    let trimmed = rest.trim_start();
    if trimmed.starts_with(',') {
        pos + (rest.len() - trimmed.len()) + 1
    } else {
        pos
    }
}
