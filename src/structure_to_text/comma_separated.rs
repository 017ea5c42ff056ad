use crate::structure_to_text::StructureToText;
use crate::writer::CodeWriter;

/// How consecutive elements of a rendered list are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListSeparator {
    /// `", "`
    #[default]
    Inline,
    /// `","` then a newline at the writer's indentation
    MultiLine,
}

/// Renders a sequence with an element renderer, writing a separator between
/// elements but not after the last.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommaSeparatedToText<R> {
    element: R,
    separator: ListSeparator,
}

impl<R> CommaSeparatedToText<R> {
    pub fn new(element: R) -> Self {
        Self {
            element,
            separator: ListSeparator::Inline,
        }
    }

    pub fn with_separator(mut self, separator: ListSeparator) -> Self {
        self.separator = separator;
        self
    }
}

impl<S, R: StructureToText<S>> StructureToText<[S]> for CommaSeparatedToText<R> {
    fn write_text(&self, writer: &mut CodeWriter, structures: &[S]) {
        for (i, structure) in structures.iter().enumerate() {
            if i > 0 {
                match self.separator {
                    ListSeparator::Inline => {
                        writer.write(", ");
                    }
                    ListSeparator::MultiLine => {
                        writer.write(",").new_line();
                    }
                }
            }
            self.element.write_text(writer, structure);
        }
    }
}

/// Writes raw expression text, without surrounding whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpressionToText;

impl<T: AsRef<str>> StructureToText<T> for ExpressionToText {
    fn write_text(&self, writer: &mut CodeWriter, expression: &T) {
        writer.write(expression.as_ref().trim());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ManipulationSettings;
    use crate::structure_to_text::{render, ParameterDeclarationToText};
    use crate::structures::ParameterDeclarationStructure;

    #[test]
    fn separator_between_but_not_after() {
        let text = render(
            &CommaSeparatedToText::new(ExpressionToText),
            &["x", "y"][..],
            &ManipulationSettings::default(),
        );
        assert_eq!(text, "x, y");
    }

    #[test]
    fn empty_sequence_is_empty() {
        let empty: &[&str] = &[];
        let text = render(
            &CommaSeparatedToText::new(ExpressionToText),
            empty,
            &ManipulationSettings::default(),
        );
        assert_eq!(text, "");
    }

    #[test]
    fn multi_line_uses_writer_indentation() {
        let mut writer = CodeWriter::default();
        writer.queue_indentation_level(1);
        CommaSeparatedToText::new(ExpressionToText)
            .with_separator(ListSeparator::MultiLine)
            .write_text(&mut writer, &["a", "b", "c"][..]);
        assert_eq!(writer.to_string(), "a,\n    b,\n    c");
    }

    #[test]
    fn composes_with_element_renderer() {
        let params = vec![
            ParameterDeclarationStructure::new("a").with_type("number"),
            ParameterDeclarationStructure::new("b"),
        ];
        let text = render(
            &CommaSeparatedToText::new(ParameterDeclarationToText),
            &params[..],
            &ManipulationSettings::default(),
        );
        assert_eq!(text, "a: number, b");
    }
}
