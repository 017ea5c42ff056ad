//! Plain data descriptions of constructs to synthesize or to apply onto
//! existing nodes.
//!
//! Fields wrapped in `Option` are partial: `None` means "leave unchanged".

use serde::{Deserialize, Serialize};
use std::fmt;

/// A modifier keyword. Declaration order is the canonical output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierKind {
    Export,
    Default,
    Declare,
    Public,
    Protected,
    Private,
    Static,
    Abstract,
    Override,
    Readonly,
    Async,
}

impl ModifierKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ModifierKind::Export => "export",
            ModifierKind::Default => "default",
            ModifierKind::Declare => "declare",
            ModifierKind::Public => "public",
            ModifierKind::Protected => "protected",
            ModifierKind::Private => "private",
            ModifierKind::Static => "static",
            ModifierKind::Abstract => "abstract",
            ModifierKind::Override => "override",
            ModifierKind::Readonly => "readonly",
            ModifierKind::Async => "async",
        }
    }
}

/// The keyword of a variable declaration list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableDeclarationType {
    Var,
    #[default]
    Let,
    Const,
}

impl VariableDeclarationType {
    pub fn keyword(self) -> &'static str {
        match self {
            VariableDeclarationType::Var => "var",
            VariableDeclarationType::Let => "let",
            VariableDeclarationType::Const => "const",
        }
    }

    /// Map a keyword token back to its type; `None` for anything else
    /// (e.g. `using`).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "var" => Some(VariableDeclarationType::Var),
            "let" => Some(VariableDeclarationType::Let),
            "const" => Some(VariableDeclarationType::Const),
            _ => None,
        }
    }
}

impl fmt::Display for VariableDeclarationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Statement-level modifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModifierableStructure {
    pub is_exported: Option<bool>,
    pub has_declare_keyword: Option<bool>,
}

impl ModifierableStructure {
    /// The modifiers switched on by this structure.
    pub fn modifiers(&self) -> Vec<ModifierKind> {
        let mut modifiers = Vec::new();
        if self.is_exported == Some(true) {
            modifiers.push(ModifierKind::Export);
        }
        if self.has_declare_keyword == Some(true) {
            modifiers.push(ModifierKind::Declare);
        }
        modifiers
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ParameterDeclarationStructure {
    pub name: String,
    /// Type annotation text; `None` or empty omits the annotation.
    #[serde(default, rename = "type")]
    pub type_text: Option<String>,
    #[serde(default)]
    pub is_rest_parameter: bool,
    #[serde(default)]
    pub modifiers: Vec<ModifierKind>,
}

impl ParameterDeclarationStructure {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, type_text: impl Into<String>) -> Self {
        self.type_text = Some(type_text.into());
        self
    }

    pub fn rest(mut self) -> Self {
        self.is_rest_parameter = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct VariableDeclarationStructure {
    pub name: String,
    /// Type annotation text; when filling, an empty string removes it.
    #[serde(default, rename = "type")]
    pub type_text: Option<String>,
    /// Initializer expression; when filling, an empty string removes it.
    #[serde(default)]
    pub initializer: Option<String>,
    #[serde(default)]
    pub has_exclamation_token: bool,
}

impl VariableDeclarationStructure {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, type_text: impl Into<String>) -> Self {
        self.type_text = Some(type_text.into());
        self
    }

    pub fn with_initializer(mut self, initializer: impl Into<String>) -> Self {
        self.initializer = Some(initializer.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct VariableDeclarationListStructure {
    pub declaration_type: Option<VariableDeclarationType>,
    /// Declarations to append.
    pub declarations: Option<Vec<VariableDeclarationStructure>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct VariableStatementStructure {
    #[serde(flatten)]
    pub modifiers: ModifierableStructure,
    #[serde(flatten)]
    pub declaration_list: VariableDeclarationListStructure,
}

impl VariableStatementStructure {
    pub fn new(
        declaration_type: VariableDeclarationType,
        declarations: Vec<VariableDeclarationStructure>,
    ) -> Self {
        Self {
            modifiers: ModifierableStructure::default(),
            declaration_list: VariableDeclarationListStructure {
                declaration_type: Some(declaration_type),
                declarations: Some(declarations),
            },
        }
    }

    pub fn exported(mut self) -> Self {
        self.modifiers.is_exported = Some(true);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FunctionDeclarationStructure {
    #[serde(flatten)]
    pub modifiers: ModifierableStructure,
    /// Parameters to append.
    #[serde(default)]
    pub parameters: Option<Vec<ParameterDeclarationStructure>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PropertyAssignmentStructure {
    pub name: String,
    pub initializer: String,
}

impl PropertyAssignmentStructure {
    pub fn new(name: impl Into<String>, initializer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initializer: initializer.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_order_follows_declaration_order() {
        let mut modifiers = vec![
            ModifierKind::Readonly,
            ModifierKind::Export,
            ModifierKind::Private,
        ];
        modifiers.sort();
        assert_eq!(
            modifiers,
            vec![
                ModifierKind::Export,
                ModifierKind::Private,
                ModifierKind::Readonly
            ]
        );
    }

    #[test]
    fn declaration_type_keywords() {
        for ty in [
            VariableDeclarationType::Var,
            VariableDeclarationType::Let,
            VariableDeclarationType::Const,
        ] {
            assert_eq!(VariableDeclarationType::from_keyword(ty.keyword()), Some(ty));
        }
        assert_eq!(VariableDeclarationType::from_keyword("using"), None);
    }

    #[test]
    fn statement_structure_deserializes_flattened_fields() {
        let structure: VariableStatementStructure = serde_json::from_str(
            r#"{"is_exported": true, "declaration_type": "const",
                "declarations": [{"name": "x", "type": "number", "initializer": "1"}]}"#,
        )
        .unwrap();
        assert_eq!(structure.modifiers.is_exported, Some(true));
        assert_eq!(structure.modifiers.has_declare_keyword, None);
        assert_eq!(
            structure.declaration_list.declaration_type,
            Some(VariableDeclarationType::Const)
        );
        let declarations = structure.declaration_list.declarations.unwrap();
        assert_eq!(declarations[0].type_text.as_deref(), Some("number"));
    }

    #[test]
    fn parameter_structure_defaults() {
        let parameter: ParameterDeclarationStructure =
            serde_json::from_str(r#"{"name": "count"}"#).unwrap();
        assert_eq!(parameter, ParameterDeclarationStructure::new("count"));
    }
}
