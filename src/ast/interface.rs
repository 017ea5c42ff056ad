//! Interfaces and their property signatures.

use crate::ast::base::{rename_occurrences, Occurrence, TypedNode};
use crate::ast::node::{ast_node, AstNode, NodeHandle};
use crate::ast::source_file::SourceFile;
use crate::manipulation::ManipulationError;
use tracing::debug;

ast_node!(InterfaceDeclaration, ["interface_declaration"]);
ast_node!(
    /// `name[?]: type;` inside an interface body.
    PropertySignature,
    ["property_signature"]
);

/// The syntactic form of a property name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyName {
    Identifier(NodeHandle),
    StringLiteral(NodeHandle),
    NumericLiteral(NodeHandle),
    Computed(NodeHandle),
    PrivateIdentifier(NodeHandle),
}

impl PropertyName {
    pub fn handle(&self) -> &NodeHandle {
        match self {
            PropertyName::Identifier(handle)
            | PropertyName::StringLiteral(handle)
            | PropertyName::NumericLiteral(handle)
            | PropertyName::Computed(handle)
            | PropertyName::PrivateIdentifier(handle) => handle,
        }
    }
}

impl InterfaceDeclaration {
    pub fn get_name(&self, file: &SourceFile) -> Result<String, ManipulationError> {
        let name = file
            .child_by_field(self.handle(), "name")?
            .ok_or_else(|| ManipulationError::not_found("name", self.handle().kind()))?;
        Ok(file.text_of(&name)?.to_string())
    }

    pub fn body(&self, file: &SourceFile) -> Result<NodeHandle, ManipulationError> {
        file.child_by_field(self.handle(), "body")?
            .ok_or_else(|| ManipulationError::not_found("body", self.handle().kind()))
    }

    pub fn get_properties(&self, file: &SourceFile) -> Result<Vec<PropertySignature>, ManipulationError> {
        Ok(file
            .named_children_of_kinds(&self.body(file)?, &["property_signature"])?
            .into_iter()
            .map(PropertySignature::wrap)
            .collect())
    }

    pub fn get_property(&self, file: &SourceFile, name: &str) -> Result<PropertySignature, ManipulationError> {
        for property in self.get_properties(file)? {
            if property.get_name(file)? == name {
                return Ok(property);
            }
        }
        Err(ManipulationError::not_found(
            format!("property `{name}`"),
            self.handle().kind(),
        ))
    }
}

impl PropertySignature {
    pub fn get_name_node(&self, file: &SourceFile) -> Result<PropertyName, ManipulationError> {
        let name = file
            .child_by_field(self.handle(), "name")?
            .ok_or_else(|| ManipulationError::not_found("name", self.handle().kind()))?;
        Ok(match name.kind() {
            "property_identifier" => PropertyName::Identifier(name),
            "string" => PropertyName::StringLiteral(name),
            "number" => PropertyName::NumericLiteral(name),
            "computed_property_name" => PropertyName::Computed(name),
            "private_property_identifier" => PropertyName::PrivateIdentifier(name),
            other => {
                return Err(ManipulationError::NotImplementedForValue {
                    value: other.to_string(),
                })
            }
        })
    }

    /// Name text as written, quotes included for string names.
    pub fn get_name(&self, file: &SourceFile) -> Result<String, ManipulationError> {
        Ok(file.text_of(self.get_name_node(file)?.handle())?.to_string())
    }

    pub fn is_optional(&self, file: &SourceFile) -> Result<bool, ManipulationError> {
        Ok(file.first_child_by_kind(self.handle(), "?")?.is_some())
    }

    /// Rename the signature and every `object.name` access in the file.
    ///
    /// The new name is written verbatim, so a string-literal name produces
    /// `object.'name'` at access sites.
    pub fn rename(self, file: &mut SourceFile, new_name: &str) -> Result<Self, ManipulationError> {
        let name = self.get_name_node(file)?;
        let old_name = file.text_of(name.handle())?.to_string();
        let mut occurrences = vec![Occurrence::Name(name.handle().range())];

        for property in file.descendants_of_kinds(&file.root(), &["property_identifier"])? {
            let Some(parent) = file.parent(&property)? else {
                continue;
            };
            if parent.kind() == "member_expression" && file.text_of(&property)? == old_name {
                occurrences.push(Occurrence::Name(property.range()));
            }
        }

        debug!(%old_name, new_name, count = occurrences.len(), "renaming property signature");
        rename_occurrences(file, occurrences, new_name)?;
        self.reacquire(file)
    }
}

impl TypedNode for PropertySignature {
    fn type_anchor_end(&self, file: &SourceFile) -> Result<usize, ManipulationError> {
        match file.first_child_by_kind(self.handle(), "?")? {
            Some(question) => Ok(question.range().end),
            None => Ok(self.get_name_node(file)?.handle().range().end),
        }
    }
}
