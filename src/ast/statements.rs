//! File-level lookups and statement insertion.

use crate::ast::base::{innermost_declaration, outermost_statement};
use crate::ast::function::{FunctionDeclaration, FUNCTION_KINDS};
use crate::ast::interface::InterfaceDeclaration;
use crate::ast::literal::{ArrayLiteralExpression, ObjectLiteralExpression};
use crate::ast::node::AstNode;
use crate::ast::source_file::SourceFile;
use crate::ast::variable::{VariableDeclaration, VariableStatement, DECLARATION_LIST_KINDS};
use crate::manipulation::{
    get_nodes_to_return, insert_into_parent_text_range, verify_sibling_count, ManipulationError,
};
use crate::structure_to_text::{StructureToText, VariableStatementToText};
use crate::structures::VariableStatementStructure;
use crate::ts::StructuralTarget;
use tracing::debug;

impl SourceFile {
    pub fn get_variable_statements(&self) -> Result<Vec<VariableStatement>, ManipulationError> {
        let mut found = Vec::new();
        for statement in self.statements()? {
            if DECLARATION_LIST_KINDS.contains(&innermost_declaration(self, &statement)?.kind()) {
                found.push(VariableStatement::cast(statement)?);
            }
        }
        Ok(found)
    }

    /// The statement declaring `name`.
    pub fn get_variable_statement(&self, name: &str) -> Result<VariableStatement, ManipulationError> {
        let target = StructuralTarget::VariableStatement {
            name: name.to_string(),
        };
        let list = self.locate(&target)?;
        VariableStatement::cast(outermost_statement(self, &list)?)
    }

    pub fn get_variable_declaration(&self, name: &str) -> Result<VariableDeclaration, ManipulationError> {
        VariableDeclaration::cast(self.locate(&StructuralTarget::Variable {
            name: name.to_string(),
        })?)
    }

    pub fn get_functions(&self) -> Result<Vec<FunctionDeclaration>, ManipulationError> {
        let mut found = Vec::new();
        for statement in self.statements()? {
            let declaration = innermost_declaration(self, &statement)?;
            if FUNCTION_KINDS.contains(&declaration.kind()) {
                found.push(FunctionDeclaration::cast(declaration)?);
            }
        }
        Ok(found)
    }

    pub fn get_function(&self, name: &str) -> Result<FunctionDeclaration, ManipulationError> {
        FunctionDeclaration::cast(self.locate(&StructuralTarget::Function {
            name: name.to_string(),
        })?)
    }

    pub fn get_interfaces(&self) -> Result<Vec<InterfaceDeclaration>, ManipulationError> {
        let mut found = Vec::new();
        for statement in self.statements()? {
            let declaration = innermost_declaration(self, &statement)?;
            if declaration.kind() == "interface_declaration" {
                found.push(InterfaceDeclaration::cast(declaration)?);
            }
        }
        Ok(found)
    }

    pub fn get_interface(&self, name: &str) -> Result<InterfaceDeclaration, ManipulationError> {
        InterfaceDeclaration::cast(self.locate(&StructuralTarget::Interface {
            name: name.to_string(),
        })?)
    }

    /// The array literal initializing `variable`.
    pub fn get_array(&self, variable: &str) -> Result<ArrayLiteralExpression, ManipulationError> {
        ArrayLiteralExpression::cast(self.locate(&StructuralTarget::ArrayOf {
            variable: variable.to_string(),
        })?)
    }

    /// The object literal initializing `variable`.
    pub fn get_object(&self, variable: &str) -> Result<ObjectLiteralExpression, ManipulationError> {
        ObjectLiteralExpression::cast(self.locate(&StructuralTarget::ObjectOf {
            variable: variable.to_string(),
        })?)
    }

    /// Insert one statement per structure, each on its own line, so that
    /// the first becomes top-level statement `index`.
    pub fn insert_variable_statements(
        &mut self,
        index: usize,
        structures: &[VariableStatementStructure],
    ) -> Result<Vec<VariableStatement>, ManipulationError> {
        let statements = self.statements()?;
        if index > statements.len() {
            return Err(ManipulationError::IndexOutOfRange {
                index,
                count: statements.len(),
                what: "statements",
            });
        }
        if structures.is_empty() {
            return Ok(Vec::new());
        }

        let mut writer = self.writer();
        for (i, structure) in structures.iter().enumerate() {
            if i > 0 {
                writer.new_line();
            }
            VariableStatementToText.write_text(&mut writer, structure);
        }
        let rendered = writer.into_string();
        let new_line = self.settings().new_line.as_str();

        let (insert_pos, text) = if let Some(next) = statements.get(index) {
            let start = next.range().start;
            let indentation = self.indentation_at(start);
            (start, format!("{rendered}{new_line}{indentation}"))
        } else if let Some(last) = statements.last() {
            (self.end_of_line(last.range().end), format!("{new_line}{rendered}"))
        } else {
            let text = self.full_text();
            let lead = if text.is_empty() || text.ends_with('\n') { "" } else { new_line };
            (text.len(), format!("{lead}{rendered}{new_line}"))
        };

        debug!(index, count = structures.len(), insert_pos, "inserting variable statements");
        let root = self.root();
        self.atomically(|file| {
            let root = insert_into_parent_text_range(file, &root, insert_pos, &text, None)?;
            let updated = file.named_children(&root)?;
            verify_sibling_count("statements", statements.len(), structures.len(), updated.len())?;
            get_nodes_to_return(&updated, index, structures.len())?
                .into_iter()
                .map(VariableStatement::cast)
                .collect()
        })
    }

    pub fn add_variable_statements(
        &mut self,
        structures: &[VariableStatementStructure],
    ) -> Result<Vec<VariableStatement>, ManipulationError> {
        let count = self.statements()?.len();
        self.insert_variable_statements(count, structures)
    }

    pub fn add_variable_statement(
        &mut self,
        structure: &VariableStatementStructure,
    ) -> Result<VariableStatement, ManipulationError> {
        self.add_variable_statements(std::slice::from_ref(structure))?
            .pop()
            .ok_or(ManipulationError::ReconciliationMismatch {
                what: "inserted statements",
                expected: 1,
                found: 0,
            })
    }

    /// Offset of the line break ending the line that contains `pos`, or the
    /// end of the text.
    fn end_of_line(&self, pos: usize) -> usize {
        let text = self.full_text();
        match text[pos..].find('\n') {
            Some(offset) => {
                let end = pos + offset;
                if end > pos && text.as_bytes()[end - 1] == b'\r' {
                    end - 1
                } else {
                    end
                }
            }
            None => text.len(),
        }
    }
}
