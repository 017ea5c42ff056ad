use crate::config::settings::ManipulationSettings;
use crate::structures::{
    ParameterDeclarationStructure, PropertyAssignmentStructure, VariableDeclarationStructure,
    VariableDeclarationType, VariableStatementStructure,
};
use crate::ts::StructuralTarget;
use serde::Deserialize;
use std::fmt;

/// A TOML edit plan: formatting settings plus an ordered list of edits.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct EditPlan {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub settings: ManipulationSettings,
    #[serde(default)]
    pub edits: Vec<EditDefinition>,
}

impl EditPlan {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.edits.is_empty() {
            issues.push(ValidationIssue::EmptyEditList);
        }

        for edit in &self.edits {
            let edit_id = (!edit.id.trim().is_empty()).then(|| edit.id.clone());
            if edit_id.is_none() {
                issues.push(ValidationIssue::MissingField {
                    edit_id: None,
                    field: "id",
                });
            }
            if edit.file.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    edit_id: edit_id.clone(),
                    field: "file",
                });
            }
            if let Some(target) = &edit.target {
                for (field, value) in target.names() {
                    if value.trim().is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            edit_id: edit_id.clone(),
                            field,
                        });
                    }
                }
            }

            let required = edit.operation.required_target();
            let actual = edit.target.as_ref().map(Target::kind);
            let compatible = match (required, actual) {
                (TargetRequirement::None, None) => true,
                (TargetRequirement::None, Some(_)) | (_, None) => false,
                (TargetRequirement::OneOf(kinds), Some(kind)) => kinds.contains(&kind),
            };
            if !compatible {
                issues.push(ValidationIssue::InvalidCombo {
                    edit_id: edit_id.clone(),
                    message: format!(
                        "operation {} requires {}, got {}",
                        edit.operation.name(),
                        required,
                        actual.unwrap_or("no target"),
                    ),
                });
            }

            match &edit.operation {
                Operation::InsertDeclarations { declarations, .. } => {
                    if declarations.is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            edit_id: edit_id.clone(),
                            field: "operation.declarations",
                        });
                    }
                    for declaration in declarations {
                        if declaration.name.trim().is_empty() {
                            issues.push(ValidationIssue::MissingField {
                                edit_id: edit_id.clone(),
                                field: "operation.declarations.name",
                            });
                        }
                    }
                }
                Operation::AddVariableStatements { statements, .. } => {
                    if statements.is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            edit_id: edit_id.clone(),
                            field: "operation.statements",
                        });
                    }
                    for statement in statements {
                        let empty = statement
                            .declaration_list
                            .declarations
                            .as_ref()
                            .map_or(true, Vec::is_empty);
                        if empty {
                            issues.push(ValidationIssue::InvalidCombo {
                                edit_id: edit_id.clone(),
                                message: "a new variable statement needs at least one declaration"
                                    .to_string(),
                            });
                        }
                    }
                }
                Operation::InsertParameters { parameters, .. } => {
                    if parameters.is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            edit_id: edit_id.clone(),
                            field: "operation.parameters",
                        });
                    }
                    for parameter in parameters {
                        if parameter.name.trim().is_empty() {
                            issues.push(ValidationIssue::MissingField {
                                edit_id: edit_id.clone(),
                                field: "operation.parameters.name",
                            });
                        }
                    }
                }
                Operation::RemoveParameter { name } => {
                    if name.trim().is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            edit_id: edit_id.clone(),
                            field: "operation.name",
                        });
                    }
                }
                Operation::InsertArrayElements { elements, .. } => {
                    if elements.iter().all(|element| element.trim().is_empty()) {
                        issues.push(ValidationIssue::MissingField {
                            edit_id: edit_id.clone(),
                            field: "operation.elements",
                        });
                    }
                }
                Operation::InsertPropertyAssignments { properties, .. } => {
                    if properties.is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            edit_id: edit_id.clone(),
                            field: "operation.properties",
                        });
                    }
                    for property in properties {
                        if property.name.trim().is_empty() || property.initializer.trim().is_empty()
                        {
                            issues.push(ValidationIssue::InvalidCombo {
                                edit_id: edit_id.clone(),
                                message: "property assignments need a name and an initializer"
                                    .to_string(),
                            });
                        }
                    }
                }
                Operation::Rename { new_name } => {
                    if new_name.trim().is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            edit_id: edit_id.clone(),
                            field: "operation.new_name",
                        });
                    }
                }
                Operation::SetDeclarationType { .. }
                | Operation::FillVariableStatement { .. }
                | Operation::RemoveArrayElement { .. } => {}
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EditDefinition {
    pub id: String,
    pub file: String,
    #[serde(default)]
    pub target: Option<Target>,
    pub operation: Operation,
}

/// The node an edit applies to, located by name.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Target {
    VariableStatement { name: String },
    Variable { name: String },
    Function { name: String },
    Parameter { function: String, name: String },
    PropertySignature { interface: String, name: String },
    Array { variable: String },
    Object { variable: String },
}

impl Target {
    pub fn kind(&self) -> &'static str {
        match self {
            Target::VariableStatement { .. } => "variable_statement",
            Target::Variable { .. } => "variable",
            Target::Function { .. } => "function",
            Target::Parameter { .. } => "parameter",
            Target::PropertySignature { .. } => "property_signature",
            Target::Array { .. } => "array",
            Target::Object { .. } => "object",
        }
    }

    fn names(&self) -> Vec<(&'static str, &str)> {
        match self {
            Target::VariableStatement { name }
            | Target::Variable { name }
            | Target::Function { name } => vec![("target.name", name)],
            Target::Parameter { function, name } => {
                vec![("target.function", function), ("target.name", name)]
            }
            Target::PropertySignature { interface, name } => {
                vec![("target.interface", interface), ("target.name", name)]
            }
            Target::Array { variable } | Target::Object { variable } => {
                vec![("target.variable", variable)]
            }
        }
    }

    pub fn to_structural(&self) -> StructuralTarget {
        match self {
            Target::VariableStatement { name } => {
                StructuralTarget::VariableStatement { name: name.clone() }
            }
            Target::Variable { name } => StructuralTarget::Variable { name: name.clone() },
            Target::Function { name } => StructuralTarget::Function { name: name.clone() },
            Target::Parameter { function, name } => StructuralTarget::Parameter {
                function: function.clone(),
                name: name.clone(),
            },
            Target::PropertySignature { interface, name } => StructuralTarget::PropertySignature {
                interface: interface.clone(),
                name: name.clone(),
            },
            Target::Array { variable } => StructuralTarget::ArrayOf {
                variable: variable.clone(),
            },
            Target::Object { variable } => StructuralTarget::ObjectOf {
                variable: variable.clone(),
            },
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_structural(), f)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    SetDeclarationType {
        declaration_type: VariableDeclarationType,
    },
    InsertDeclarations {
        /// Defaults to appending.
        #[serde(default)]
        index: Option<usize>,
        declarations: Vec<VariableDeclarationStructure>,
    },
    FillVariableStatement {
        structure: VariableStatementStructure,
    },
    AddVariableStatements {
        #[serde(default)]
        index: Option<usize>,
        statements: Vec<VariableStatementStructure>,
    },
    InsertParameters {
        #[serde(default)]
        index: Option<usize>,
        parameters: Vec<ParameterDeclarationStructure>,
    },
    RemoveParameter {
        name: String,
    },
    InsertArrayElements {
        #[serde(default)]
        index: Option<usize>,
        elements: Vec<String>,
    },
    RemoveArrayElement {
        index: usize,
    },
    InsertPropertyAssignments {
        #[serde(default)]
        index: Option<usize>,
        properties: Vec<PropertyAssignmentStructure>,
    },
    Rename {
        new_name: String,
    },
}

/// Which targets an operation accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRequirement {
    None,
    OneOf(&'static [&'static str]),
}

impl fmt::Display for TargetRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetRequirement::None => write!(f, "no target"),
            TargetRequirement::OneOf(kinds) => write!(f, "a {} target", kinds.join(" or ")),
        }
    }
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::SetDeclarationType { .. } => "set_declaration_type",
            Operation::InsertDeclarations { .. } => "insert_declarations",
            Operation::FillVariableStatement { .. } => "fill_variable_statement",
            Operation::AddVariableStatements { .. } => "add_variable_statements",
            Operation::InsertParameters { .. } => "insert_parameters",
            Operation::RemoveParameter { .. } => "remove_parameter",
            Operation::InsertArrayElements { .. } => "insert_array_elements",
            Operation::RemoveArrayElement { .. } => "remove_array_element",
            Operation::InsertPropertyAssignments { .. } => "insert_property_assignments",
            Operation::Rename { .. } => "rename",
        }
    }

    pub fn required_target(&self) -> TargetRequirement {
        match self {
            Operation::SetDeclarationType { .. }
            | Operation::InsertDeclarations { .. }
            | Operation::FillVariableStatement { .. } => {
                TargetRequirement::OneOf(&["variable_statement"])
            }
            Operation::AddVariableStatements { .. } => TargetRequirement::None,
            Operation::InsertParameters { .. } | Operation::RemoveParameter { .. } => {
                TargetRequirement::OneOf(&["function"])
            }
            Operation::InsertArrayElements { .. } | Operation::RemoveArrayElement { .. } => {
                TargetRequirement::OneOf(&["array"])
            }
            Operation::InsertPropertyAssignments { .. } => TargetRequirement::OneOf(&["object"]),
            Operation::Rename { .. } => {
                TargetRequirement::OneOf(&["variable", "parameter", "property_signature"])
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    EmptyEditList,
    MissingField {
        edit_id: Option<String>,
        field: &'static str,
    },
    InvalidCombo {
        edit_id: Option<String>,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyEditList => write!(f, "edit plan contains no edits"),
            ValidationIssue::MissingField { edit_id, field } => match edit_id {
                Some(id) => write!(f, "edit '{id}' missing required field '{field}'"),
                None => write!(f, "edit missing required field '{field}'"),
            },
            ValidationIssue::InvalidCombo { edit_id, message } => match edit_id {
                Some(id) => write!(f, "edit '{id}' has invalid configuration: {message}"),
                None => write!(f, "invalid edit configuration: {message}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(target: Option<Target>, operation: Operation) -> EditDefinition {
        EditDefinition {
            id: "e1".to_string(),
            file: "a.ts".to_string(),
            target,
            operation,
        }
    }

    #[test]
    fn empty_plan_is_invalid() {
        let err = EditPlan::default().validate().unwrap_err();
        assert!(matches!(err.issues[0], ValidationIssue::EmptyEditList));
    }

    #[test]
    fn collects_every_issue() {
        let plan = EditPlan {
            edits: vec![
                edit(
                    Some(Target::Function {
                        name: "f".to_string(),
                    }),
                    Operation::Rename {
                        new_name: "  ".to_string(),
                    },
                ),
                edit(None, Operation::RemoveArrayElement { index: 0 }),
            ],
            ..EditPlan::default()
        };
        let err = plan.validate().unwrap_err();
        // rename on a function, blank new name, array op without a target
        assert_eq!(err.issues.len(), 3);
        let rendered = err.to_string();
        assert!(rendered.contains("operation rename requires a variable or parameter or property_signature target, got function"));
        assert!(rendered.contains("missing required field 'operation.new_name'"));
    }

    #[test]
    fn add_statements_rejects_a_target() {
        let plan = EditPlan {
            edits: vec![edit(
                Some(Target::Variable {
                    name: "x".to_string(),
                }),
                Operation::AddVariableStatements {
                    index: None,
                    statements: vec![VariableStatementStructure::new(
                        VariableDeclarationType::Const,
                        vec![VariableDeclarationStructure::new("y")],
                    )],
                },
            )],
            ..EditPlan::default()
        };
        let err = plan.validate().unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert!(err.to_string().contains("requires no target"));
    }

    #[test]
    fn valid_plan_passes() {
        let plan = EditPlan {
            edits: vec![edit(
                Some(Target::VariableStatement {
                    name: "x".to_string(),
                }),
                Operation::SetDeclarationType {
                    declaration_type: VariableDeclarationType::Const,
                },
            )],
            ..EditPlan::default()
        };
        assert!(plan.validate().is_ok());
    }
}
