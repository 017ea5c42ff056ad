use crate::structure_to_text::{CommaSeparatedToText, ModifiersToText, StructureToText};
use crate::structures::{
    PropertyAssignmentStructure, VariableDeclarationStructure, VariableStatementStructure,
};
use crate::writer::CodeWriter;

/// `name[!][: type][ = initializer]`
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableDeclarationToText;

impl StructureToText<VariableDeclarationStructure> for VariableDeclarationToText {
    fn write_text(&self, writer: &mut CodeWriter, structure: &VariableDeclarationStructure) {
        writer.write(&structure.name);
        writer.conditional_write(structure.has_exclamation_token, "!");
        if let Some(type_text) = non_empty(&structure.type_text) {
            writer.write(": ").write(type_text);
        }
        if let Some(initializer) = non_empty(&structure.initializer) {
            writer.write(" = ").write(initializer);
        }
    }
}

/// A full statement; an absent declaration type renders as `let`.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableStatementToText;

impl StructureToText<VariableStatementStructure> for VariableStatementToText {
    fn write_text(&self, writer: &mut CodeWriter, structure: &VariableStatementStructure) {
        let modifiers = structure.modifiers.modifiers();
        ModifiersToText.write_text(writer, modifiers.as_slice());
        let list = &structure.declaration_list;
        writer
            .write(list.declaration_type.unwrap_or_default().keyword())
            .write(" ");
        let declarations = list.declarations.as_deref().unwrap_or_default();
        CommaSeparatedToText::new(VariableDeclarationToText).write_text(writer, declarations);
        writer.write(";");
    }
}

/// `name: initializer`
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyAssignmentToText;

impl StructureToText<PropertyAssignmentStructure> for PropertyAssignmentToText {
    fn write_text(&self, writer: &mut CodeWriter, structure: &PropertyAssignmentStructure) {
        writer
            .write(&structure.name)
            .write(": ")
            .write(structure.initializer.trim());
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ManipulationSettings;
    use crate::structure_to_text::render;
    use crate::structures::{VariableDeclarationType, VariableStatementStructure};

    #[test]
    fn declaration_variants() {
        let settings = ManipulationSettings::default();
        let plain = VariableDeclarationStructure::new("x");
        assert_eq!(render(&VariableDeclarationToText, &plain, &settings), "x");

        let full = VariableDeclarationStructure::new("x")
            .with_type("number")
            .with_initializer("5");
        assert_eq!(
            render(&VariableDeclarationToText, &full, &settings),
            "x: number = 5"
        );

        let definite = VariableDeclarationStructure {
            has_exclamation_token: true,
            ..VariableDeclarationStructure::new("y").with_type("string")
        };
        assert_eq!(
            render(&VariableDeclarationToText, &definite, &settings),
            "y!: string"
        );

        let padded = VariableDeclarationStructure::new("z")
            .with_type(" number ")
            .with_initializer("  2\n");
        assert_eq!(
            render(&VariableDeclarationToText, &padded, &settings),
            "z: number = 2"
        );
    }

    #[test]
    fn statement_with_modifiers() {
        let structure = VariableStatementStructure::new(
            VariableDeclarationType::Const,
            vec![
                VariableDeclarationStructure::new("a").with_initializer("1"),
                VariableDeclarationStructure::new("b").with_initializer("2"),
            ],
        )
        .exported();
        assert_eq!(
            render(
                &VariableStatementToText,
                &structure,
                &ManipulationSettings::default()
            ),
            "export const a = 1, b = 2;"
        );
    }

    #[test]
    fn property_assignment() {
        let structure = PropertyAssignmentStructure::new("key", "'value'");
        assert_eq!(
            render(
                &PropertyAssignmentToText,
                &structure,
                &ManipulationSettings::default()
            ),
            "key: 'value'"
        );
    }
}
