//! Edit-plan applicator: runs each edit of a plan against its file.
//!
//! Edits are grouped per file and applied in plan order to one
//! [`SourceFile`], so later edits observe earlier ones. Each edit is atomic:
//! if it fails, or leaves the file with more syntax errors than before, the
//! file is restored to its text from before that edit. Files are written
//! once, after all of their edits ran.

use crate::ast::{
    ArrayLiteralExpression, AstNode, FunctionDeclaration, NodeHandle, ObjectLiteralExpression,
    ParameterDeclaration, PropertySignature, SourceFile, VariableDeclaration, VariableStatement,
};
use crate::config::schema::{EditDefinition, EditPlan, Operation, Target};
use crate::manipulation::ManipulationError;
use crate::ts::{validate_snippet, validate_transition, SnippetCategory, TreeSitterError};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result of applying a single edit
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "EditResult should be checked for success/failure"]
pub enum EditResult {
    /// The edit changed the file
    Applied { file: PathBuf },
    /// The file already had the requested shape
    AlreadyApplied { file: PathBuf },
}

impl fmt::Display for EditResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditResult::Applied { file } => write!(f, "Applied edit to {}", file.display()),
            EditResult::AlreadyApplied { file } => {
                write!(f, "Already applied to {}", file.display())
            }
        }
    }
}

/// Errors during edit application
#[derive(Debug)]
pub enum ApplicationError {
    /// The file could not be opened or saved
    Io {
        path: PathBuf,
        source: ManipulationError,
    },
    /// The structural edit itself failed
    Manipulation {
        file: PathBuf,
        source: ManipulationError,
    },
    /// A text fragment supplied by the plan does not parse
    InvalidSnippet {
        file: PathBuf,
        snippet: String,
        source: TreeSitterError,
    },
    /// The edit left the file with new syntax errors
    IntroducedSyntaxErrors {
        file: PathBuf,
        source: TreeSitterError,
    },
    /// An earlier failure prevented this file from being processed
    Skipped { file: PathBuf, reason: String },
}

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationError::Io { path, source } => {
                write!(f, "I/O error on {}: {}", path.display(), source)
            }
            ApplicationError::Manipulation { file, source } => {
                write!(f, "edit failed on {}: {}", file.display(), source)
            }
            ApplicationError::InvalidSnippet {
                file,
                snippet,
                source,
            } => write!(
                f,
                "invalid snippet `{}` for {}: {}",
                snippet,
                file.display(),
                source
            ),
            ApplicationError::IntroducedSyntaxErrors { file, source } => write!(
                f,
                "edit would introduce syntax errors in {}: {}",
                file.display(),
                source
            ),
            ApplicationError::Skipped { file, reason } => {
                write!(f, "skipped {}: {}", file.display(), reason)
            }
        }
    }
}

impl std::error::Error for ApplicationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApplicationError::Io { source, .. } => Some(source),
            ApplicationError::Manipulation { source, .. } => Some(source),
            ApplicationError::InvalidSnippet { source, .. } => Some(source),
            ApplicationError::IntroducedSyntaxErrors { source, .. } => Some(source),
            ApplicationError::Skipped { .. } => None,
        }
    }
}

/// Text of one file before and after its edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: PathBuf,
    pub before: String,
    pub after: String,
}

/// Everything an `apply` run produced.
#[derive(Debug, Default)]
pub struct PlanReport {
    /// One entry per edit, in plan order within each file.
    pub results: Vec<(String, Result<EditResult, ApplicationError>)>,
    /// Files whose text changed.
    pub changes: Vec<FileChange>,
}

impl PlanReport {
    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|(_, result)| result.is_err()).count()
    }
}

/// Apply an edit plan. Relative file paths are resolved against
/// `workspace_root`. With `dry_run`, nothing is written.
pub fn apply_plan(plan: &EditPlan, workspace_root: &Path, dry_run: bool) -> PlanReport {
    let mut report = PlanReport::default();

    for (file_path, edits) in group_by_file(plan, workspace_root) {
        info!(file = %file_path.display(), edits = edits.len(), dry_run, "applying edits");

        let mut file = match SourceFile::open(&file_path) {
            Ok(file) => file.with_settings(plan.settings),
            Err(source) => {
                let reason = source.to_string();
                let mut edits = edits.into_iter();
                if let Some(first) = edits.next() {
                    report.results.push((
                        first.id.clone(),
                        Err(ApplicationError::Io {
                            path: file_path.clone(),
                            source,
                        }),
                    ));
                }
                for edit in edits {
                    report.results.push((
                        edit.id.clone(),
                        Err(ApplicationError::Skipped {
                            file: file_path.clone(),
                            reason: reason.clone(),
                        }),
                    ));
                }
                continue;
            }
        };

        let original = file.full_text().to_string();
        for edit in edits {
            let result = apply_atomically(&mut file, &file_path, edit);
            match &result {
                Ok(outcome) => debug!(id = %edit.id, %outcome, "edit finished"),
                Err(err) => warn!(id = %edit.id, error = %err, "edit failed"),
            }
            report.results.push((edit.id.clone(), result));
        }

        if file.full_text() == original {
            continue;
        }
        if !dry_run {
            if let Err(source) = file.save() {
                warn!(file = %file_path.display(), error = %source, "failed to save");
                report.results.push((
                    format!("save:{}", file_path.display()),
                    Err(ApplicationError::Io {
                        path: file_path.clone(),
                        source,
                    }),
                ));
                continue;
            }
        }
        report.changes.push(FileChange {
            path: file_path,
            before: original,
            after: file.full_text().to_string(),
        });
    }

    report
}

/// Group edits by resolved path, keeping the order files first appear in.
fn group_by_file<'a>(
    plan: &'a EditPlan,
    workspace_root: &Path,
) -> Vec<(PathBuf, Vec<&'a EditDefinition>)> {
    let mut groups: Vec<(PathBuf, Vec<&EditDefinition>)> = Vec::new();
    for edit in &plan.edits {
        let path = workspace_root.join(&edit.file);
        match groups.iter_mut().find(|(existing, _)| *existing == path) {
            Some((_, edits)) => edits.push(edit),
            None => groups.push((path, vec![edit])),
        }
    }
    groups
}

fn apply_atomically(
    file: &mut SourceFile,
    file_path: &Path,
    edit: &EditDefinition,
) -> Result<EditResult, ApplicationError> {
    check_snippets(&edit.operation).map_err(|(snippet, source)| {
        ApplicationError::InvalidSnippet {
            file: file_path.to_path_buf(),
            snippet,
            source,
        }
    })?;

    let before = file.full_text().to_string();
    let outcome = apply_edit(file, edit)
        .map_err(|source| ApplicationError::Manipulation {
            file: file_path.to_path_buf(),
            source,
        })
        .and_then(|()| {
            validate_transition(&before, file.full_text(), file.dialect()).map_err(|source| {
                ApplicationError::IntroducedSyntaxErrors {
                    file: file_path.to_path_buf(),
                    source,
                }
            })
        });

    if let Err(err) = outcome {
        if file.full_text() != before {
            file.revert_to(&before).map_err(|source| ApplicationError::Manipulation {
                file: file_path.to_path_buf(),
                source,
            })?;
        }
        return Err(err);
    }

    if file.full_text() == before {
        Ok(EditResult::AlreadyApplied {
            file: file_path.to_path_buf(),
        })
    } else {
        Ok(EditResult::Applied {
            file: file_path.to_path_buf(),
        })
    }
}


/// Reject fragments that cannot parse on their own before touching the file.
fn check_snippets(operation: &Operation) -> Result<(), (String, TreeSitterError)> {
    let check = |snippet: &str, category: SnippetCategory| {
        validate_snippet(snippet, category).map_err(|err| (snippet.to_string(), err))
    };

    match operation {
        Operation::InsertArrayElements { elements, .. } => {
            for element in elements {
                check(element, SnippetCategory::Expression)?;
            }
        }
        Operation::InsertPropertyAssignments { properties, .. } => {
            for property in properties {
                check(&property.initializer, SnippetCategory::Expression)?;
            }
        }
        Operation::InsertDeclarations { declarations, .. } => {
            for declaration in declarations {
                if let Some(type_text) = declaration.type_text.as_deref().filter(|t| !t.trim().is_empty()) {
                    check(type_text, SnippetCategory::Type)?;
                }
                if let Some(initializer) = declaration.initializer.as_deref().filter(|i| !i.trim().is_empty()) {
                    check(initializer, SnippetCategory::Expression)?;
                }
            }
        }
        Operation::InsertParameters { parameters, .. } => {
            for parameter in parameters {
                if let Some(type_text) = parameter.type_text.as_deref().filter(|t| !t.trim().is_empty()) {
                    check(type_text, SnippetCategory::Type)?;
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn located(file: &SourceFile, target: Option<&Target>) -> Result<NodeHandle, ManipulationError> {
    let target = target
        .ok_or_else(|| ManipulationError::InvalidArgument("edit has no target".to_string()))?;
    file.locate(&target.to_structural())
}

fn variable_statement(
    file: &SourceFile,
    target: Option<&Target>,
) -> Result<VariableStatement, ManipulationError> {
    match target {
        Some(Target::VariableStatement { name }) => file.get_variable_statement(name),
        other => VariableStatement::cast(located(file, other)?),
    }
}

fn apply_edit(file: &mut SourceFile, edit: &EditDefinition) -> Result<(), ManipulationError> {
    let target = edit.target.as_ref();
    match &edit.operation {
        Operation::SetDeclarationType { declaration_type } => {
            variable_statement(file, target)?.set_declaration_type(file, *declaration_type)?;
        }
        Operation::InsertDeclarations {
            index,
            declarations,
        } => {
            let list = variable_statement(file, target)?.declaration_list(file)?;
            let index = match index {
                Some(index) => *index,
                None => list.get_declarations(file)?.len(),
            };
            list.insert_declarations(file, index, declarations)?;
        }
        Operation::FillVariableStatement { structure } => {
            variable_statement(file, target)?.fill(file, structure)?;
        }
        Operation::AddVariableStatements { index, statements } => {
            let index = match index {
                Some(index) => *index,
                None => file.statements()?.len(),
            };
            file.insert_variable_statements(index, statements)?;
        }
        Operation::InsertParameters { index, parameters } => {
            let function = FunctionDeclaration::cast(located(file, target)?)?;
            let index = match index {
                Some(index) => *index,
                None => function.get_parameters(file)?.len(),
            };
            function.insert_parameters(file, index, parameters)?;
        }
        Operation::RemoveParameter { name } => {
            let function = FunctionDeclaration::cast(located(file, target)?)?;
            function.get_parameter(file, name)?.remove(file)?;
        }
        Operation::InsertArrayElements { index, elements } => {
            let array = ArrayLiteralExpression::cast(located(file, target)?)?;
            let index = match index {
                Some(index) => *index,
                None => array.get_elements(file)?.len(),
            };
            array.insert_elements(file, index, elements)?;
        }
        Operation::RemoveArrayElement { index } => {
            ArrayLiteralExpression::cast(located(file, target)?)?.remove_element(file, *index)?;
        }
        Operation::InsertPropertyAssignments { index, properties } => {
            let object = ObjectLiteralExpression::cast(located(file, target)?)?;
            let index = match index {
                Some(index) => *index,
                None => object.get_properties(file)?.len(),
            };
            object.insert_property_assignments(file, index, properties)?;
        }
        Operation::Rename { new_name } => {
            let handle = located(file, target)?;
            match target {
                Some(Target::Variable { .. }) => {
                    VariableDeclaration::cast(handle)?.rename(file, new_name)?;
                }
                Some(Target::Parameter { .. }) => {
                    ParameterDeclaration::cast(handle)?.rename(file, new_name)?;
                }
                Some(Target::PropertySignature { .. }) => {
                    PropertySignature::cast(handle)?.rename(file, new_name)?;
                }
                _ => {
                    return Err(ManipulationError::InvalidArgument(format!(
                        "cannot rename {}",
                        handle.kind()
                    )))
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::load_from_str;
    use std::fs;

    fn workspace(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    #[test]
    fn applies_edits_in_order_and_writes_once() {
        let dir = workspace(&[("a.ts", "var config = { debug: true };\nlet flags = [1];\n")]);
        let plan = load_from_str(
            r#"
[[edits]]
id = "const"
file = "a.ts"
target = { type = "variable_statement", name = "config" }
operation = { type = "set_declaration_type", declaration_type = "const" }

[[edits]]
id = "flags"
file = "a.ts"
target = { type = "array", variable = "flags" }
operation = { type = "insert_array_elements", elements = ["2", "3"] }
"#,
        )
        .unwrap();

        let report = apply_plan(&plan, dir.path(), false);
        assert_eq!(report.failure_count(), 0);
        assert_eq!(report.changes.len(), 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("a.ts")).unwrap(),
            "const config = { debug: true };\nlet flags = [1, 2, 3];\n"
        );
    }

    #[test]
    fn unchanged_edit_reports_already_applied() {
        let dir = workspace(&[("a.ts", "const x = 1;\n")]);
        let plan = load_from_str(
            r#"
[[edits]]
id = "noop"
file = "a.ts"
target = { type = "variable_statement", name = "x" }
operation = { type = "set_declaration_type", declaration_type = "const" }
"#,
        )
        .unwrap();

        let report = apply_plan(&plan, dir.path(), false);
        assert!(matches!(
            report.results[0].1,
            Ok(EditResult::AlreadyApplied { .. })
        ));
        assert!(report.changes.is_empty());
    }

    #[test]
    fn failed_edit_leaves_earlier_edits_and_file_consistent() {
        let dir = workspace(&[("a.ts", "let xs = [1];\n")]);
        let plan = load_from_str(
            r#"
[[edits]]
id = "append"
file = "a.ts"
target = { type = "array", variable = "xs" }
operation = { type = "insert_array_elements", elements = ["2"] }

[[edits]]
id = "out-of-range"
file = "a.ts"
target = { type = "array", variable = "xs" }
operation = { type = "insert_array_elements", index = 9, elements = ["3"] }
"#,
        )
        .unwrap();

        let report = apply_plan(&plan, dir.path(), false);
        assert!(report.results[0].1.is_ok());
        assert!(matches!(
            report.results[1].1,
            Err(ApplicationError::Manipulation {
                source: ManipulationError::IndexOutOfRange { .. },
                ..
            })
        ));
        assert_eq!(
            fs::read_to_string(dir.path().join("a.ts")).unwrap(),
            "let xs = [1, 2];\n"
        );
    }

    #[test]
    fn invalid_snippet_is_rejected_before_editing() {
        let dir = workspace(&[("a.ts", "let xs = [1];\n")]);
        let plan = load_from_str(
            r#"
[[edits]]
id = "broken"
file = "a.ts"
target = { type = "array", variable = "xs" }
operation = { type = "insert_array_elements", elements = ["1 +"] }
"#,
        )
        .unwrap();

        let report = apply_plan(&plan, dir.path(), false);
        assert!(matches!(
            report.results[0].1,
            Err(ApplicationError::InvalidSnippet { .. })
        ));
        assert!(report.changes.is_empty());
    }

    #[test]
    fn dry_run_reports_changes_without_writing() {
        let dir = workspace(&[("a.ts", "function f(a) {}\n")]);
        let plan = load_from_str(
            r#"
[[edits]]
id = "param"
file = "a.ts"
target = { type = "function", name = "f" }

[edits.operation]
type = "insert_parameters"
parameters = [{ name = "b", type = "string" }]
"#,
        )
        .unwrap();

        let report = apply_plan(&plan, dir.path(), true);
        assert_eq!(report.changes.len(), 1);
        assert_eq!(report.changes[0].after, "function f(a, b: string) {}\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("a.ts")).unwrap(),
            "function f(a) {}\n"
        );
    }

    #[test]
    fn missing_file_fails_first_edit_and_skips_the_rest() {
        let dir = workspace(&[]);
        let plan = load_from_str(
            r#"
[[edits]]
id = "one"
file = "missing.ts"
target = { type = "array", variable = "xs" }
operation = { type = "remove_array_element", index = 0 }

[[edits]]
id = "two"
file = "missing.ts"
target = { type = "array", variable = "xs" }
operation = { type = "remove_array_element", index = 0 }
"#,
        )
        .unwrap();

        let report = apply_plan(&plan, dir.path(), false);
        assert!(matches!(report.results[0].1, Err(ApplicationError::Io { .. })));
        assert!(matches!(report.results[1].1, Err(ApplicationError::Skipped { .. })));
    }
}
