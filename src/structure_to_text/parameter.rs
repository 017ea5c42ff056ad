use crate::structure_to_text::{ModifiersToText, StructureToText};
use crate::structures::ParameterDeclarationStructure;
use crate::writer::CodeWriter;

#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterDeclarationToText;

impl StructureToText<ParameterDeclarationStructure> for ParameterDeclarationToText {
    fn write_text(&self, writer: &mut CodeWriter, structure: &ParameterDeclarationStructure) {
        ModifiersToText.write_text(writer, structure.modifiers.as_slice());
        writer.conditional_write(structure.is_rest_parameter, "...");
        writer.write(&structure.name);
        if let Some(type_text) = structure.type_text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            writer.write(": ").write(type_text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ManipulationSettings;
    use crate::structure_to_text::render;
    use crate::structures::ModifierKind;

    fn text(structure: &ParameterDeclarationStructure) -> String {
        render(
            &ParameterDeclarationToText,
            structure,
            &ManipulationSettings::default(),
        )
    }

    #[test]
    fn name_and_type() {
        let structure = ParameterDeclarationStructure::new("count").with_type("number");
        assert_eq!(text(&structure), "count: number");
    }

    #[test]
    fn missing_or_empty_type_omits_annotation() {
        assert_eq!(text(&ParameterDeclarationStructure::new("count")), "count");
        assert_eq!(
            text(&ParameterDeclarationStructure::new("count").with_type("")),
            "count"
        );
    }

    #[test]
    fn rest_parameter_with_modifiers() {
        let mut structure = ParameterDeclarationStructure::new("items")
            .with_type("string[]")
            .rest();
        structure.modifiers = vec![ModifierKind::Readonly, ModifierKind::Private];
        assert_eq!(text(&structure), "private readonly ...items: string[]");
    }
}
