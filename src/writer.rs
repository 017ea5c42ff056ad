//! Indentation-aware text accumulator used by every renderer.
//!
//! Indentation and newlines are queued and only materialized by the next
//! non-empty [`CodeWriter::write`], so nested renderers can be composed
//! without committing whitespace for output that never happens.

use crate::config::ManipulationSettings;
use std::fmt;

#[derive(Debug, Clone)]
pub struct CodeWriter {
    indent_text: &'static str,
    new_line: &'static str,
    text: String,
    /// Literal text written before the level-based indentation.
    base_indentation: String,
    indentation_level: usize,
    queued_indentation: Option<usize>,
    queued_new_line: bool,
}

impl CodeWriter {
    pub fn new(settings: &ManipulationSettings) -> Self {
        Self {
            indent_text: settings.indentation.as_str(),
            new_line: settings.new_line.as_str(),
            text: String::new(),
            base_indentation: String::new(),
            indentation_level: 0,
            queued_indentation: None,
            queued_new_line: false,
        }
    }

    /// Append `text`, flushing queued state first.
    ///
    /// Every line after the first is prefixed with the current indentation;
    /// blank lines stay blank. Line endings are normalized to the configured
    /// newline.
    pub fn write(&mut self, text: &str) -> &mut Self {
        if text.is_empty() {
            return self;
        }
        self.flush_queued();

        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.text.push_str(self.new_line);
            }
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                continue;
            }
            if self.at_line_start() {
                self.push_indentation();
            }
            self.text.push_str(line);
        }
        self
    }

    /// Write `text` only when `condition` holds; otherwise nothing is queued.
    pub fn conditional_write(&mut self, condition: bool, text: &str) -> &mut Self {
        if condition {
            self.write(text);
        }
        self
    }

    /// Queue a newline for the next write. A second call while one is
    /// already queued commits the first, producing a blank line.
    pub fn new_line(&mut self) -> &mut Self {
        if self.queued_new_line {
            self.text.push_str(self.new_line);
        }
        self.queued_new_line = true;
        self
    }

    /// Set the indentation level applied from the next non-empty write on.
    pub fn queue_indentation_level(&mut self, level: usize) -> &mut Self {
        self.queued_indentation = Some(level);
        self
    }

    /// Indent every following line with `text` as written, ahead of any
    /// level-based indentation. Used to match indentation copied from the
    /// surrounding source, whatever its width.
    pub fn set_base_indentation(&mut self, text: &str) -> &mut Self {
        self.base_indentation = text.to_string();
        self
    }

    pub fn set_indentation_level(&mut self, level: usize) -> &mut Self {
        self.queued_indentation = None;
        self.indentation_level = level;
        self
    }

    pub fn indentation_level(&self) -> usize {
        self.queued_indentation.unwrap_or(self.indentation_level)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }

    fn flush_queued(&mut self) {
        if let Some(level) = self.queued_indentation.take() {
            self.indentation_level = level;
        }
        if self.queued_new_line {
            self.queued_new_line = false;
            self.text.push_str(self.new_line);
        }
    }

    /// Only lines after a newline are indented: a fragment's first line is
    /// spliced after existing text on the same line.
    fn at_line_start(&self) -> bool {
        self.text.ends_with('\n')
    }

    fn push_indentation(&mut self) {
        self.text.push_str(&self.base_indentation);
        for _ in 0..self.indentation_level {
            self.text.push_str(self.indent_text);
        }
    }
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new(&ManipulationSettings::default())
    }
}

impl fmt::Display for CodeWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IndentationText, NewLineKind};

    fn writer(indentation: IndentationText, new_line: NewLineKind) -> CodeWriter {
        CodeWriter::new(&ManipulationSettings {
            indentation,
            new_line,
        })
    }

    #[test]
    fn queued_indentation_without_writes_produces_nothing() {
        let mut w = CodeWriter::default();
        w.queue_indentation_level(3);
        w.write("");
        assert_eq!(w.to_string(), "");
        assert!(w.is_empty());
    }

    #[test]
    fn conditional_write_skips_when_false() {
        let mut w = CodeWriter::default();
        w.conditional_write(false, "...").write("x");
        w.conditional_write(true, ": number");
        assert_eq!(w.to_string(), "x: number");
    }

    #[test]
    fn queued_indentation_applies_to_following_lines() {
        let mut w = writer(IndentationText::TwoSpaces, NewLineKind::LineFeed);
        w.queue_indentation_level(1);
        w.write("a,").new_line().write("b");
        assert_eq!(w.to_string(), "a,\n  b");
    }

    #[test]
    fn multi_line_write_indents_non_empty_lines() {
        let mut w = writer(IndentationText::Tab, NewLineKind::LineFeed);
        w.set_indentation_level(1);
        w.write("{\n\nx\n}");
        assert_eq!(w.to_string(), "{\n\n\tx\n\t}");
    }

    #[test]
    fn base_indentation_is_copied_verbatim() {
        let mut w = CodeWriter::default();
        w.set_base_indentation("  ");
        w.write("x,").new_line().write("y,").new_line().write("z");
        assert_eq!(w.to_string(), "x,\n  y,\n  z");

        w.set_indentation_level(1);
        w.new_line().write("w");
        assert_eq!(w.to_string(), "x,\n  y,\n  z\n      w");
    }

    #[test]
    fn crlf_normalizes_line_endings() {
        let mut w = writer(IndentationText::FourSpaces, NewLineKind::CarriageReturnLineFeed);
        w.write("a\r\nb").new_line().write("c");
        assert_eq!(w.to_string(), "a\r\nb\r\nc");
    }

    #[test]
    fn trailing_queued_new_line_is_not_materialized() {
        let mut w = CodeWriter::default();
        w.write("a;").new_line();
        assert_eq!(w.to_string(), "a;");
    }

    #[test]
    fn double_new_line_gives_blank_line() {
        let mut w = CodeWriter::default();
        w.write("a;").new_line().new_line().write("b;");
        assert_eq!(w.into_string(), "a;\n\nb;");
    }
}
