//! Function declarations and their parameters.

use crate::ast::base::{
    fill_inserted, identifier_occurrences, innermost_declaration, insert_list_items,
    rename_occurrences, ModifierableNode, TypedNode,
};
use crate::ast::node::{ast_node, AstNode, NodeHandle};
use crate::ast::source_file::SourceFile;
use crate::manipulation::{remove_comma_separated_node, ManipulationError};
use crate::structure_to_text::ParameterDeclarationToText;
use crate::structures::{FunctionDeclarationStructure, ParameterDeclarationStructure};
use tracing::debug;

pub(crate) const FUNCTION_KINDS: &[&str] = &["function_declaration", "function_signature"];
const PARAMETER_KINDS: &[&str] = &["required_parameter", "optional_parameter"];

ast_node!(
    /// `function name(...) {}` or an overload/ambient signature.
    FunctionDeclaration,
    ["function_declaration", "function_signature"]
);

ast_node!(ParameterDeclaration, ["required_parameter", "optional_parameter"]);

fn read_parameters(
    file: &SourceFile,
    parameters: &NodeHandle,
) -> Result<Vec<NodeHandle>, ManipulationError> {
    file.named_children_of_kinds(parameters, PARAMETER_KINDS)
}

impl FunctionDeclaration {
    pub fn get_name(&self, file: &SourceFile) -> Result<Option<String>, ManipulationError> {
        match file.child_by_field(self.handle(), "name")? {
            Some(name) => Ok(Some(file.text_of(&name)?.to_string())),
            None => Ok(None),
        }
    }

    /// The `formal_parameters` node.
    pub fn parameter_list(&self, file: &SourceFile) -> Result<NodeHandle, ManipulationError> {
        file.child_by_field(self.handle(), "parameters")?
            .ok_or_else(|| ManipulationError::not_found("parameters", self.handle().kind()))
    }

    pub fn get_parameters(&self, file: &SourceFile) -> Result<Vec<ParameterDeclaration>, ManipulationError> {
        Ok(read_parameters(file, &self.parameter_list(file)?)?
            .into_iter()
            .map(ParameterDeclaration::wrap)
            .collect())
    }

    pub fn get_parameter(&self, file: &SourceFile, name: &str) -> Result<ParameterDeclaration, ManipulationError> {
        for parameter in self.get_parameters(file)? {
            if parameter.get_name(file)? == name {
                return Ok(parameter);
            }
        }
        Err(ManipulationError::not_found(
            format!("parameter `{name}`"),
            self.handle().kind(),
        ))
    }

    pub fn insert_parameters(
        self,
        file: &mut SourceFile,
        index: usize,
        structures: &[ParameterDeclarationStructure],
    ) -> Result<Vec<ParameterDeclaration>, ManipulationError> {
        Ok(self.insert_parameters_inner(file, index, structures)?.1)
    }

    pub fn insert_parameter(
        self,
        file: &mut SourceFile,
        index: usize,
        structure: &ParameterDeclarationStructure,
    ) -> Result<ParameterDeclaration, ManipulationError> {
        self.insert_parameters(file, index, std::slice::from_ref(structure))?
            .pop()
            .ok_or(ManipulationError::ReconciliationMismatch {
                what: "inserted parameters",
                expected: 1,
                found: 0,
            })
    }

    pub fn add_parameters(
        self,
        file: &mut SourceFile,
        structures: &[ParameterDeclarationStructure],
    ) -> Result<Vec<ParameterDeclaration>, ManipulationError> {
        let count = self.get_parameters(file)?.len();
        self.insert_parameters(file, count, structures)
    }

    pub fn add_parameter(
        self,
        file: &mut SourceFile,
        structure: &ParameterDeclarationStructure,
    ) -> Result<ParameterDeclaration, ManipulationError> {
        let count = self.get_parameters(file)?.len();
        self.insert_parameter(file, count, structure)
    }

    fn insert_parameters_inner(
        self,
        file: &mut SourceFile,
        index: usize,
        structures: &[ParameterDeclarationStructure],
    ) -> Result<(Self, Vec<ParameterDeclaration>), ManipulationError> {
        let list = self.parameter_list(file)?;
        file.atomically(|file| {
            let (list, _) = insert_list_items(
                file,
                &list,
                index,
                structures,
                ParameterDeclarationToText,
                "parameters",
                read_parameters,
            )?;
            let (_, inserted) = fill_inserted(
                file,
                list,
                index,
                structures,
                read_parameters,
                ParameterDeclaration::fill,
            )?;
            Ok((self.reacquire(file)?, inserted))
        })
    }

    /// Modifiers first, then appended parameters.
    pub fn fill(
        self,
        file: &mut SourceFile,
        structure: &FunctionDeclarationStructure,
    ) -> Result<Self, ManipulationError> {
        let mut function = self.fill_modifiers(file, &structure.modifiers)?;
        if let Some(parameters) = &structure.parameters {
            let count = function.get_parameters(file)?.len();
            function = function.insert_parameters_inner(file, count, parameters)?.0;
        }
        Ok(function)
    }
}

impl ModifierableNode for FunctionDeclaration {
    fn from_statement(file: &SourceFile, statement: NodeHandle) -> Result<Self, ManipulationError> {
        Self::cast(innermost_declaration(file, &statement)?)
    }
}

impl ParameterDeclaration {
    pub fn pattern(&self, file: &SourceFile) -> Result<NodeHandle, ManipulationError> {
        file.child_by_field(self.handle(), "pattern")?
            .ok_or_else(|| ManipulationError::not_found("pattern", self.handle().kind()))
    }

    /// The binding identifier, looking through `...`.
    pub fn name_node(&self, file: &SourceFile) -> Result<NodeHandle, ManipulationError> {
        let pattern = self.pattern(file)?;
        if pattern.kind() != "rest_pattern" {
            return Ok(pattern);
        }
        file.named_children(&pattern)?
            .into_iter()
            .next()
            .ok_or_else(|| ManipulationError::not_found("rest binding", pattern.kind()))
    }

    pub fn get_name(&self, file: &SourceFile) -> Result<String, ManipulationError> {
        Ok(file.text_of(&self.name_node(file)?)?.to_string())
    }

    pub fn is_rest_parameter(&self, file: &SourceFile) -> Result<bool, ManipulationError> {
        Ok(self.pattern(file)?.kind() == "rest_pattern")
    }

    pub fn is_optional(&self) -> bool {
        self.handle().kind() == "optional_parameter"
    }

    fn function(&self, file: &SourceFile) -> Result<NodeHandle, ManipulationError> {
        let list = file
            .parent(self.handle())?
            .ok_or_else(|| ManipulationError::not_found("parameter list", self.handle().kind()))?;
        file.parent(&list)?
            .ok_or_else(|| ManipulationError::not_found("function", list.kind()))
    }

    /// Rename the parameter and its references inside the owning function.
    pub fn rename(self, file: &mut SourceFile, new_name: &str) -> Result<Self, ManipulationError> {
        let old_name = self.get_name(file)?;
        let function = self.function(file)?;
        let occurrences = identifier_occurrences(file, &function, &old_name)?;
        debug!(%old_name, new_name, count = occurrences.len(), "renaming parameter");
        rename_occurrences(file, occurrences, new_name)?;
        self.reacquire(file)
    }

    pub fn remove(self, file: &mut SourceFile) -> Result<(), ManipulationError> {
        let list = file
            .parent(self.handle())?
            .ok_or_else(|| ManipulationError::not_found("parameter list", self.handle().kind()))?;
        let siblings = read_parameters(file, &list)?;
        let index = siblings
            .iter()
            .position(|sibling| sibling.range() == self.range())
            .ok_or_else(|| ManipulationError::not_found("parameter", list.kind()))?;
        remove_comma_separated_node(file, &list, &siblings, index)?;
        Ok(())
    }

    pub fn fill(
        self,
        file: &mut SourceFile,
        structure: &ParameterDeclarationStructure,
    ) -> Result<Self, ManipulationError> {
        match &structure.type_text {
            Some(type_text) => self.set_type(file, type_text),
            None => Ok(self),
        }
    }
}

impl TypedNode for ParameterDeclaration {
    fn type_anchor_end(&self, file: &SourceFile) -> Result<usize, ManipulationError> {
        match file.first_child_by_kind(self.handle(), "?")? {
            Some(question) => Ok(question.range().end),
            None => Ok(self.pattern(file)?.range().end),
        }
    }
}
