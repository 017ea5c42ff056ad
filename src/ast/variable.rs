//! Variable statements, their declaration lists and single declarations.

use crate::ast::base::{
    fill_inserted, identifier_occurrences, innermost_declaration, insert_list_items, remove_statement,
    rename_occurrences,
    ModifierableNode, TypedNode,
};
use crate::ast::node::{ast_node, AstNode, NodeHandle, TextRange};
use crate::ast::source_file::SourceFile;
use crate::manipulation::{
    insert_into_parent_text_range, remove_comma_separated_node, ManipulationError,
};
use crate::structure_to_text::VariableDeclarationToText;
use crate::structures::{
    VariableDeclarationListStructure, VariableDeclarationStructure, VariableDeclarationType,
    VariableStatementStructure,
};
use tracing::debug;

pub(crate) const DECLARATION_LIST_KINDS: &[&str] = &["lexical_declaration", "variable_declaration"];

ast_node!(
    /// `[export] [declare] let|const|var a = 1, b;` at its outermost statement.
    VariableStatement,
    ["lexical_declaration", "variable_declaration", "export_statement", "ambient_declaration"]
);

ast_node!(
    /// The keyword plus comma-separated declarators.
    VariableDeclarationList,
    ["lexical_declaration", "variable_declaration"]
);

ast_node!(
    /// `name[!][: type][ = initializer]`
    VariableDeclaration,
    ["variable_declarator"]
);

fn read_declarations(
    file: &SourceFile,
    list: &NodeHandle,
) -> Result<Vec<NodeHandle>, ManipulationError> {
    file.named_children_of_kinds(list, &["variable_declarator"])
}

impl VariableStatement {
    pub fn declaration_list(&self, file: &SourceFile) -> Result<VariableDeclarationList, ManipulationError> {
        VariableDeclarationList::cast(innermost_declaration(file, self.handle())?)
    }

    pub fn get_declarations(&self, file: &SourceFile) -> Result<Vec<VariableDeclaration>, ManipulationError> {
        self.declaration_list(file)?.get_declarations(file)
    }

    pub fn get_declaration_type(&self, file: &SourceFile) -> Result<VariableDeclarationType, ManipulationError> {
        self.declaration_list(file)?.get_declaration_type(file)
    }

    pub fn set_declaration_type(
        self,
        file: &mut SourceFile,
        declaration_type: VariableDeclarationType,
    ) -> Result<Self, ManipulationError> {
        self.declaration_list(file)?
            .set_declaration_type(file, declaration_type)?;
        self.reacquire(file)
    }

    pub fn insert_declarations(
        self,
        file: &mut SourceFile,
        index: usize,
        structures: &[VariableDeclarationStructure],
    ) -> Result<Vec<VariableDeclaration>, ManipulationError> {
        self.declaration_list(file)?
            .insert_declarations(file, index, structures)
    }

    pub fn add_declarations(
        self,
        file: &mut SourceFile,
        structures: &[VariableDeclarationStructure],
    ) -> Result<Vec<VariableDeclaration>, ManipulationError> {
        self.declaration_list(file)?.add_declarations(file, structures)
    }

    pub fn remove(self, file: &mut SourceFile) -> Result<(), ManipulationError> {
        debug!(range = %self.range(), "removing variable statement");
        remove_statement(file, self.handle())
    }

    /// Modifiers first, then the declaration list.
    pub fn fill(
        self,
        file: &mut SourceFile,
        structure: &VariableStatementStructure,
    ) -> Result<Self, ManipulationError> {
        let statement = self.fill_modifiers(file, &structure.modifiers)?;
        statement
            .declaration_list(file)?
            .fill(file, &structure.declaration_list)?;
        statement.reacquire(file)
    }
}

impl ModifierableNode for VariableStatement {
    fn from_statement(_file: &SourceFile, statement: NodeHandle) -> Result<Self, ManipulationError> {
        Self::cast(statement)
    }
}

impl VariableDeclarationList {
    pub fn get_declarations(&self, file: &SourceFile) -> Result<Vec<VariableDeclaration>, ManipulationError> {
        Ok(read_declarations(file, self.handle())?
            .into_iter()
            .map(VariableDeclaration::wrap)
            .collect())
    }

    pub fn get_declaration_type(&self, file: &SourceFile) -> Result<VariableDeclarationType, ManipulationError> {
        let keyword = file
            .children(self.handle())?
            .into_iter()
            .next()
            .ok_or_else(|| ManipulationError::not_found("declaration keyword", self.handle().kind()))?;
        let text = file.text_of(&keyword)?;
        VariableDeclarationType::from_keyword(text).ok_or_else(|| {
            ManipulationError::NotImplementedForValue {
                value: text.to_string(),
            }
        })
    }

    /// The `var` / `let` / `const` token.
    pub fn get_declaration_type_keyword(&self, file: &SourceFile) -> Result<NodeHandle, ManipulationError> {
        let kind = match self.get_declaration_type(file)? {
            VariableDeclarationType::Var => "var",
            VariableDeclarationType::Let => "let",
            VariableDeclarationType::Const => "const",
        };
        file.first_child_by_kind_or_err(self.handle(), kind)
    }

    /// Replaces only the keyword token; a no-op when the type already matches.
    pub fn set_declaration_type(
        self,
        file: &mut SourceFile,
        declaration_type: VariableDeclarationType,
    ) -> Result<Self, ManipulationError> {
        if self.get_declaration_type(file)? == declaration_type {
            return Ok(self);
        }
        let keyword = self.get_declaration_type_keyword(file)?.range();
        let list = insert_into_parent_text_range(
            file,
            self.handle(),
            keyword.start,
            declaration_type.keyword(),
            Some(keyword),
        )?;
        Self::cast(list)
    }

    pub fn insert_declarations(
        self,
        file: &mut SourceFile,
        index: usize,
        structures: &[VariableDeclarationStructure],
    ) -> Result<Vec<VariableDeclaration>, ManipulationError> {
        Ok(self.insert_declarations_inner(file, index, structures)?.1)
    }

    pub fn insert_declaration(
        self,
        file: &mut SourceFile,
        index: usize,
        structure: &VariableDeclarationStructure,
    ) -> Result<VariableDeclaration, ManipulationError> {
        let mut inserted = self.insert_declarations(file, index, std::slice::from_ref(structure))?;
        inserted
            .pop()
            .ok_or(ManipulationError::ReconciliationMismatch {
                what: "inserted declarations",
                expected: 1,
                found: 0,
            })
    }

    pub fn add_declarations(
        self,
        file: &mut SourceFile,
        structures: &[VariableDeclarationStructure],
    ) -> Result<Vec<VariableDeclaration>, ManipulationError> {
        let count = self.get_declarations(file)?.len();
        self.insert_declarations(file, count, structures)
    }

    pub fn add_declaration(
        self,
        file: &mut SourceFile,
        structure: &VariableDeclarationStructure,
    ) -> Result<VariableDeclaration, ManipulationError> {
        let count = self.get_declarations(file)?.len();
        self.insert_declaration(file, count, structure)
    }

    fn insert_declarations_inner(
        self,
        file: &mut SourceFile,
        index: usize,
        structures: &[VariableDeclarationStructure],
    ) -> Result<(Self, Vec<VariableDeclaration>), ManipulationError> {
        file.atomically(|file| {
            let (list, _) = insert_list_items(
                file,
                self.handle(),
                index,
                structures,
                VariableDeclarationToText,
                "declarations",
                read_declarations,
            )?;
            let (list, inserted) = fill_inserted(
                file,
                list,
                index,
                structures,
                read_declarations,
                VariableDeclaration::fill,
            )?;
            Ok((Self::cast(list)?, inserted))
        })
    }

    /// Declaration type first, then appended declarations.
    pub fn fill(
        self,
        file: &mut SourceFile,
        structure: &VariableDeclarationListStructure,
    ) -> Result<Self, ManipulationError> {
        let mut list = self;
        if let Some(declaration_type) = structure.declaration_type {
            list = list.set_declaration_type(file, declaration_type)?;
        }
        if let Some(declarations) = &structure.declarations {
            let count = list.get_declarations(file)?.len();
            list = list.insert_declarations_inner(file, count, declarations)?.0;
        }
        Ok(list)
    }
}

impl VariableDeclaration {
    pub fn name_node(&self, file: &SourceFile) -> Result<NodeHandle, ManipulationError> {
        file.child_by_field(self.handle(), "name")?
            .ok_or_else(|| ManipulationError::not_found("name", self.handle().kind()))
    }

    pub fn get_name(&self, file: &SourceFile) -> Result<String, ManipulationError> {
        Ok(file.text_of(&self.name_node(file)?)?.to_string())
    }

    pub fn has_exclamation_token(&self, file: &SourceFile) -> Result<bool, ManipulationError> {
        Ok(file.first_child_by_kind(self.handle(), "!")?.is_some())
    }

    pub fn get_initializer_text(&self, file: &SourceFile) -> Result<Option<String>, ManipulationError> {
        match file.child_by_field(self.handle(), "value")? {
            Some(value) => Ok(Some(file.text_of(&value)?.to_string())),
            None => Ok(None),
        }
    }

    /// Set the initializer; an empty string removes it together with `=`.
    pub fn set_initializer(self, file: &mut SourceFile, text: &str) -> Result<Self, ManipulationError> {
        let text = text.trim();
        let value = file.child_by_field(self.handle(), "value")?;
        match value {
            None if text.is_empty() => return Ok(self),
            None => {
                let end = self.range().end;
                insert_into_parent_text_range(file, self.handle(), end, &format!(" = {text}"), None)?;
            }
            Some(value) if text.is_empty() => {
                let children = file.children(self.handle())?;
                let equals = children
                    .iter()
                    .position(|child| child.kind() == "=")
                    .ok_or_else(|| ManipulationError::not_found("`=`", self.handle().kind()))?;
                let start = match equals {
                    0 => children[0].range().start,
                    i => children[i - 1].range().end,
                };
                let range = TextRange::new(start, value.range().end);
                insert_into_parent_text_range(file, self.handle(), start, "", Some(range))?;
            }
            Some(value) => {
                if file.text_of(&value)? == text {
                    return Ok(self);
                }
                let range = value.range();
                insert_into_parent_text_range(file, self.handle(), range.start, text, Some(range))?;
            }
        }
        self.reacquire(file)
    }

    /// Rename the declaration and every identifier with the same text in
    /// the file, as one splice. Shorthand properties keep their key:
    /// `{ x }` becomes `{ x: y }`.
    pub fn rename(self, file: &mut SourceFile, new_name: &str) -> Result<Self, ManipulationError> {
        let old_name = self.get_name(file)?;
        let occurrences = identifier_occurrences(file, &file.root(), &old_name)?;
        debug!(%old_name, new_name, count = occurrences.len(), "renaming variable");
        rename_occurrences(file, occurrences, new_name)?;
        self.reacquire(file)
    }

    /// Remove this declaration. The only declaration of a statement takes
    /// the statement with it.
    pub fn remove(self, file: &mut SourceFile) -> Result<(), ManipulationError> {
        let list = file
            .parent(self.handle())?
            .ok_or_else(|| ManipulationError::not_found("declaration list", self.handle().kind()))?;
        let list = VariableDeclarationList::cast(list)?;
        let siblings = read_declarations(file, list.handle())?;
        let index = siblings
            .iter()
            .position(|sibling| sibling.range() == self.range())
            .ok_or_else(|| ManipulationError::not_found("declaration", list.handle().kind()))?;

        if siblings.len() == 1 {
            return remove_statement(file, list.handle());
        }
        remove_comma_separated_node(file, list.handle(), &siblings, index)?;
        Ok(())
    }

    pub fn fill(
        self,
        file: &mut SourceFile,
        structure: &VariableDeclarationStructure,
    ) -> Result<Self, ManipulationError> {
        let mut declaration = self;
        if let Some(type_text) = &structure.type_text {
            declaration = declaration.set_type(file, type_text)?;
        }
        if let Some(initializer) = &structure.initializer {
            declaration = declaration.set_initializer(file, initializer)?;
        }
        Ok(declaration)
    }
}

impl TypedNode for VariableDeclaration {
    fn type_anchor_end(&self, file: &SourceFile) -> Result<usize, ManipulationError> {
        match file.first_child_by_kind(self.handle(), "!")? {
            Some(exclamation) => Ok(exclamation.range().end),
            None => Ok(self.name_node(file)?.range().end),
        }
    }
}
