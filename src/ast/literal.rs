//! Array and object literals.

use crate::ast::base::insert_list_items;
use crate::ast::node::{ast_node, AstNode, NodeHandle};
use crate::ast::source_file::SourceFile;
use crate::manipulation::{remove_comma_separated_node, ManipulationError};
use crate::structure_to_text::{ExpressionToText, PropertyAssignmentToText};
use crate::structures::PropertyAssignmentStructure;

ast_node!(ArrayLiteralExpression, ["array"]);
ast_node!(ObjectLiteralExpression, ["object"]);
ast_node!(
    /// `key: value` inside an object literal.
    PropertyAssignment,
    ["pair"]
);

fn read_members(file: &SourceFile, literal: &NodeHandle) -> Result<Vec<NodeHandle>, ManipulationError> {
    file.named_children(literal)
}

fn remove_member(
    file: &mut SourceFile,
    literal: &NodeHandle,
    index: usize,
) -> Result<NodeHandle, ManipulationError> {
    let members = read_members(file, literal)?;
    remove_comma_separated_node(file, literal, &members, index)
}

impl ArrayLiteralExpression {
    pub fn get_elements(&self, file: &SourceFile) -> Result<Vec<NodeHandle>, ManipulationError> {
        read_members(file, self.handle())
    }

    /// Insert expression texts so that the first lands at `index`.
    pub fn insert_elements<T: AsRef<str>>(
        self,
        file: &mut SourceFile,
        index: usize,
        elements: &[T],
    ) -> Result<Vec<NodeHandle>, ManipulationError> {
        let (_, inserted) = insert_list_items(
            file,
            self.handle(),
            index,
            elements,
            ExpressionToText,
            "elements",
            read_members,
        )?;
        Ok(inserted)
    }

    pub fn add_elements<T: AsRef<str>>(
        self,
        file: &mut SourceFile,
        elements: &[T],
    ) -> Result<Vec<NodeHandle>, ManipulationError> {
        let count = self.get_elements(file)?.len();
        self.insert_elements(file, count, elements)
    }

    pub fn remove_element(self, file: &mut SourceFile, index: usize) -> Result<Self, ManipulationError> {
        Self::cast(remove_member(file, self.handle(), index)?)
    }
}

impl ObjectLiteralExpression {
    /// Every member: assignments, shorthands, methods and spreads.
    pub fn get_properties(&self, file: &SourceFile) -> Result<Vec<NodeHandle>, ManipulationError> {
        read_members(file, self.handle())
    }

    pub fn get_property(&self, file: &SourceFile, name: &str) -> Result<PropertyAssignment, ManipulationError> {
        for member in file.named_children_of_kinds(self.handle(), &["pair"])? {
            let assignment = PropertyAssignment::wrap(member);
            if assignment.get_name(file)? == name {
                return Ok(assignment);
            }
        }
        Err(ManipulationError::not_found(
            format!("property `{name}`"),
            self.handle().kind(),
        ))
    }

    pub fn insert_property_assignments(
        self,
        file: &mut SourceFile,
        index: usize,
        structures: &[PropertyAssignmentStructure],
    ) -> Result<Vec<PropertyAssignment>, ManipulationError> {
        let (_, inserted) = insert_list_items(
            file,
            self.handle(),
            index,
            structures,
            PropertyAssignmentToText,
            "properties",
            read_members,
        )?;
        inserted.into_iter().map(PropertyAssignment::cast).collect()
    }

    pub fn add_property_assignments(
        self,
        file: &mut SourceFile,
        structures: &[PropertyAssignmentStructure],
    ) -> Result<Vec<PropertyAssignment>, ManipulationError> {
        let count = self.get_properties(file)?.len();
        self.insert_property_assignments(file, count, structures)
    }

    pub fn remove_property(self, file: &mut SourceFile, index: usize) -> Result<Self, ManipulationError> {
        Self::cast(remove_member(file, self.handle(), index)?)
    }
}

impl PropertyAssignment {
    pub fn get_name(&self, file: &SourceFile) -> Result<String, ManipulationError> {
        let key = file
            .child_by_field(self.handle(), "key")?
            .ok_or_else(|| ManipulationError::not_found("key", self.handle().kind()))?;
        Ok(file.text_of(&key)?.to_string())
    }

    pub fn get_initializer_text(&self, file: &SourceFile) -> Result<String, ManipulationError> {
        let value = file
            .child_by_field(self.handle(), "value")?
            .ok_or_else(|| ManipulationError::not_found("value", self.handle().kind()))?;
        Ok(file.text_of(&value)?.to_string())
    }
}
