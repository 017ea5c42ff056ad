//! Renderers turning [`structures`](crate::structures) into source text.
//!
//! Renderers are pure: they only append to a [`CodeWriter`] and never look
//! at the tree.

mod comma_separated;
mod modifiers;
mod parameter;
mod variable;

pub use comma_separated::{CommaSeparatedToText, ExpressionToText, ListSeparator};
pub use modifiers::ModifiersToText;
pub use parameter::ParameterDeclarationToText;
pub use variable::{PropertyAssignmentToText, VariableDeclarationToText, VariableStatementToText};

use crate::config::ManipulationSettings;
use crate::writer::CodeWriter;

/// Serializes one structural shape into writer calls.
pub trait StructureToText<S: ?Sized> {
    fn write_text(&self, writer: &mut CodeWriter, structure: &S);
}

/// Render a single structure with a fresh writer.
pub fn render<S: ?Sized>(
    renderer: &impl StructureToText<S>,
    structure: &S,
    settings: &ManipulationSettings,
) -> String {
    let mut writer = CodeWriter::new(settings);
    renderer.write_text(&mut writer, structure);
    writer.into_string()
}
