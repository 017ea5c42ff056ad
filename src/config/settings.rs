use serde::{Deserialize, Serialize};

/// Text used for one level of indentation in synthesized code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndentationText {
    TwoSpaces,
    #[default]
    FourSpaces,
    EightSpaces,
    Tab,
}

impl IndentationText {
    pub fn as_str(self) -> &'static str {
        match self {
            IndentationText::TwoSpaces => "  ",
            IndentationText::FourSpaces => "    ",
            IndentationText::EightSpaces => "        ",
            IndentationText::Tab => "\t",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum NewLineKind {
    #[default]
    #[serde(rename = "lf")]
    LineFeed,
    #[serde(rename = "crlf")]
    CarriageReturnLineFeed,
}

impl NewLineKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NewLineKind::LineFeed => "\n",
            NewLineKind::CarriageReturnLineFeed => "\r\n",
        }
    }
}

/// Formatting settings consulted whenever text is synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ManipulationSettings {
    #[serde(default)]
    pub indentation: IndentationText,
    #[serde(default)]
    pub new_line: NewLineKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_four_spaces_and_lf() {
        let settings = ManipulationSettings::default();
        assert_eq!(settings.indentation.as_str(), "    ");
        assert_eq!(settings.new_line.as_str(), "\n");
    }

    #[test]
    fn deserialize_from_toml() {
        let settings: ManipulationSettings =
            toml_edit::de::from_str("indentation = \"tab\"\nnew_line = \"crlf\"\n").unwrap();
        assert_eq!(settings.indentation, IndentationText::Tab);
        assert_eq!(settings.new_line, NewLineKind::CarriageReturnLineFeed);
    }

    #[test]
    fn unknown_setting_is_rejected() {
        let result: Result<ManipulationSettings, _> =
            toml_edit::de::from_str("quote = \"single\"\n");
        assert!(result.is_err());
    }
}
