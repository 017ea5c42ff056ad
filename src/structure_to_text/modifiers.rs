use crate::structure_to_text::StructureToText;
use crate::structures::ModifierKind;
use crate::writer::CodeWriter;

/// Writes modifier keywords, each followed by a space, in canonical order
/// regardless of the order given.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModifiersToText;

impl StructureToText<[ModifierKind]> for ModifiersToText {
    fn write_text(&self, writer: &mut CodeWriter, modifiers: &[ModifierKind]) {
        let mut modifiers = modifiers.to_vec();
        modifiers.sort();
        modifiers.dedup();
        for modifier in modifiers {
            writer.write(modifier.keyword()).write(" ");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ManipulationSettings;
    use crate::structure_to_text::render;

    #[test]
    fn canonical_order_and_dedup() {
        let text = render(
            &ModifiersToText,
            &[
                ModifierKind::Readonly,
                ModifierKind::Public,
                ModifierKind::Readonly,
            ][..],
            &ManipulationSettings::default(),
        );
        assert_eq!(text, "public readonly ");
    }

    #[test]
    fn empty_set_writes_nothing() {
        let none: &[ModifierKind] = &[];
        let text = render(&ModifiersToText, none, &ManipulationSettings::default());
        assert_eq!(text, "");
    }
}
