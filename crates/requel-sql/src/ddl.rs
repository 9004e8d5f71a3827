//! DDL statements
//!
//! CREATE TABLE, ALTER TABLE, and CREATE INDEX, plus the table-definition
//! model they share. An [`AlterCommand`] can also *apply* itself to an
//! in-memory definition, which powers [`CreateTableQuery::fold`]: one
//! CREATE TABLE and a following stream of ALTER TABLE statements collapse
//! into a single net-effect definition. Folding applies commands strictly
//! in statement order and fails when a command targets a column or
//! constraint the working definition does not have.

use serde::{Deserialize, Serialize};

use crate::clauses::{SortableItem, WhereClause};
use crate::error::{Error, Result};
use crate::queries::SelectQuery;
use crate::table::PhysicalTable;
use crate::tokens::{Token, TokenIter, ToTokens};
use crate::values::{TypeName, Value};

/// CREATE TABLE: either a column/constraint definition list or AS SELECT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTableQuery {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub temporary: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub if_not_exists: bool,
    pub table: PhysicalTable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<TableDefinitionClause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Box<SelectQuery>>,
}

/// The parenthesized definition list of a CREATE TABLE.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableDefinitionClause {
    pub items: Vec<TableDefinitionItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableDefinitionItem {
    Column(ColumnDefinition),
    Constraint(TableConstraint),
}

impl TableDefinitionClause {
    pub fn columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.items.iter().filter_map(|i| match i {
            TableDefinitionItem::Column(c) => Some(c),
            TableDefinitionItem::Constraint(_) => None,
        })
    }

    pub fn find_column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    fn find_column_mut(&mut self, name: &str) -> Option<&mut ColumnDefinition> {
        self.items.iter_mut().find_map(|i| match i {
            TableDefinitionItem::Column(c) if c.name.eq_ignore_ascii_case(name) => Some(c),
            _ => None,
        })
    }

    fn constraint_position(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|i| match i {
            TableDefinitionItem::Constraint(c) => {
                c.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name))
            }
            _ => false,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub type_name: TypeName,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<ColumnConstraint>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, type_name: TypeName) -> Self {
        Self {
            name: name.into(),
            type_name,
            constraints: Vec::new(),
        }
    }

    fn has_constraint(&self, probe: impl Fn(&ColumnConstraint) -> bool) -> bool {
        self.constraints.iter().any(probe)
    }
}

/// An inline column constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnConstraint {
    NotNull,
    PrimaryKey,
    Unique,
    Default(Value),
    Check(Value),
    References {
        table: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        columns: Vec<String>,
    },
}

/// A table-level constraint, optionally named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub kind: TableConstraintKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableConstraintKind {
    PrimaryKey {
        columns: Vec<String>,
    },
    Unique {
        columns: Vec<String>,
    },
    ForeignKey {
        columns: Vec<String>,
        ref_table: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        ref_columns: Vec<String>,
    },
    Check(Value),
}

/// ALTER TABLE with its comma-separated command list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterTableQuery {
    pub table: PhysicalTable,
    pub commands: Vec<AlterCommand>,
}

/// One ALTER TABLE mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlterCommand {
    AddColumn(ColumnDefinition),
    DropColumn { name: String },
    AddConstraint(TableConstraint),
    DropConstraint { name: String },
    SetDefault { column: String, value: Value },
    DropDefault { column: String },
    SetNotNull { column: String },
    DropNotNull { column: String },
    ChangeColumnType { column: String, type_name: TypeName },
    RenameColumn { from: String, to: String },
    RenameTable { to: String },
}

impl AlterCommand {
    /// Apply this command to a working CREATE TABLE, mutating its
    /// definition (or its name, for a table rename). Fails with a
    /// structural error when the target column or constraint is absent,
    /// or when the table was created AS SELECT and has no definition.
    pub fn apply(&self, create: &mut CreateTableQuery) -> Result<()> {
        if let AlterCommand::RenameTable { to } = self {
            create.table.name = to.clone();
            return Ok(());
        }
        let definition = create.definition.as_mut().ok_or_else(|| {
            Error::structural(format!(
                "table {} has no column definition to alter",
                create.table.name
            ))
        })?;
        match self {
            AlterCommand::AddColumn(column) => {
                if definition.find_column(&column.name).is_some() {
                    return Err(Error::structural(format!(
                        "column {} already exists",
                        column.name
                    )));
                }
                definition
                    .items
                    .push(TableDefinitionItem::Column(column.clone()));
            }
            AlterCommand::DropColumn { name } => {
                let position = definition.items.iter().position(|i| {
                    matches!(i, TableDefinitionItem::Column(c) if c.name.eq_ignore_ascii_case(name))
                });
                let position = position
                    .ok_or_else(|| Error::structural(format!("column {name} does not exist")))?;
                definition.items.remove(position);
            }
            AlterCommand::AddConstraint(constraint) => {
                if let Some(name) = &constraint.name {
                    if definition.constraint_position(name).is_some() {
                        return Err(Error::structural(format!(
                            "constraint {name} already exists"
                        )));
                    }
                }
                definition
                    .items
                    .push(TableDefinitionItem::Constraint(constraint.clone()));
            }
            AlterCommand::DropConstraint { name } => {
                let position = definition.constraint_position(name).ok_or_else(|| {
                    Error::structural(format!("constraint {name} does not exist"))
                })?;
                definition.items.remove(position);
            }
            AlterCommand::SetDefault { column, value } => {
                let column = Self::existing_column(definition, column)?;
                column
                    .constraints
                    .retain(|c| !matches!(c, ColumnConstraint::Default(_)));
                column.constraints.push(ColumnConstraint::Default(value.clone()));
            }
            AlterCommand::DropDefault { column } => {
                let column = Self::existing_column(definition, column)?;
                column
                    .constraints
                    .retain(|c| !matches!(c, ColumnConstraint::Default(_)));
            }
            AlterCommand::SetNotNull { column } => {
                let column = Self::existing_column(definition, column)?;
                if !column.has_constraint(|c| matches!(c, ColumnConstraint::NotNull)) {
                    column.constraints.push(ColumnConstraint::NotNull);
                }
            }
            AlterCommand::DropNotNull { column } => {
                let column = Self::existing_column(definition, column)?;
                column
                    .constraints
                    .retain(|c| !matches!(c, ColumnConstraint::NotNull));
            }
            AlterCommand::ChangeColumnType { column, type_name } => {
                let column = Self::existing_column(definition, column)?;
                column.type_name = type_name.clone();
            }
            AlterCommand::RenameColumn { from, to } => {
                if definition.find_column(to).is_some() {
                    return Err(Error::structural(format!("column {to} already exists")));
                }
                let column = Self::existing_column(definition, from)?;
                column.name = to.clone();
            }
            AlterCommand::RenameTable { .. } => unreachable!("handled above"),
        }
        Ok(())
    }

    fn existing_column<'a>(
        definition: &'a mut TableDefinitionClause,
        name: &str,
    ) -> Result<&'a mut ColumnDefinition> {
        definition
            .find_column_mut(name)
            .ok_or_else(|| Error::structural(format!("column {name} does not exist")))
    }
}

impl CreateTableQuery {
    /// Fold a stream of ALTER TABLE statements into this definition,
    /// applying commands strictly in statement order. Every statement must
    /// target this table and every command must find its target.
    pub fn fold(mut self, alters: &[AlterTableQuery]) -> Result<CreateTableQuery> {
        for alter in alters {
            if !alter.table.same_table(&self.table) {
                return Err(Error::structural(format!(
                    "alter table targets {} but the definition is {}",
                    alter.table.name, self.table.name
                )));
            }
            for command in &alter.commands {
                command.apply(&mut self)?;
            }
        }
        Ok(self)
    }
}

/// CREATE INDEX.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIndexQuery {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub if_not_exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub on: PhysicalTable,
    /// Index method: `USING btree`, `USING gin`, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub using: Option<String>,
    pub columns: Vec<SortableItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<WhereClause>,
}

// DDL nodes are emitted by collecting into a buffer; the statements are
// not nested inside other nodes, so laziness buys nothing here.

fn extend<'a>(tokens: &mut Vec<Token>, node: &'a impl ToTokens, parent: Option<&Token>) {
    tokens.extend(node.to_tokens(parent));
}

fn name_list(tokens: &mut Vec<Token>, names: &[String], parent: Option<&Token>) {
    let open = Token::word("(", parent);
    tokens.push(open.clone());
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            tokens.push(Token::word(",", Some(&open)));
        }
        tokens.push(Token::word(name, Some(&open)));
    }
    tokens.push(Token::word(")", Some(&open)));
}

impl ToTokens for ColumnDefinition {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let mut tokens = Vec::new();
        let name = Token::word(&self.name, parent);
        tokens.push(name.clone());
        extend(&mut tokens, &self.type_name, Some(&name));
        for constraint in &self.constraints {
            extend(&mut tokens, constraint, Some(&name));
        }
        Box::new(tokens.into_iter())
    }
}

impl ToTokens for ColumnConstraint {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let p = parent.cloned();
        let mut tokens = Vec::new();
        match self {
            ColumnConstraint::NotNull => {
                tokens.push(Token::reserved("not", p.as_ref()));
                tokens.push(Token::reserved("null", p.as_ref()));
            }
            ColumnConstraint::PrimaryKey => {
                tokens.push(Token::reserved("primary", p.as_ref()));
                tokens.push(Token::reserved("key", p.as_ref()));
            }
            ColumnConstraint::Unique => {
                tokens.push(Token::reserved("unique", p.as_ref()));
            }
            ColumnConstraint::Default(value) => {
                let kw = Token::reserved("default", p.as_ref());
                tokens.push(kw.clone());
                extend(&mut tokens, value, Some(&kw));
            }
            ColumnConstraint::Check(value) => {
                let kw = Token::reserved("check", p.as_ref());
                let open = Token::word("(", Some(&kw));
                tokens.push(kw);
                tokens.push(open.clone());
                extend(&mut tokens, value, Some(&open));
                tokens.push(Token::word(")", Some(&open)));
            }
            ColumnConstraint::References { table, columns } => {
                let kw = Token::reserved("references", p.as_ref());
                tokens.push(kw.clone());
                tokens.push(Token::word(table, Some(&kw)));
                if !columns.is_empty() {
                    name_list(&mut tokens, columns, Some(&kw));
                }
            }
        }
        Box::new(tokens.into_iter())
    }
}

impl ToTokens for TableConstraint {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let p = parent.cloned();
        let mut tokens = Vec::new();
        if let Some(name) = &self.name {
            let kw = Token::reserved("constraint", p.as_ref());
            tokens.push(kw.clone());
            tokens.push(Token::word(name, Some(&kw)));
        }
        match &self.kind {
            TableConstraintKind::PrimaryKey { columns } => {
                tokens.push(Token::reserved("primary", p.as_ref()));
                tokens.push(Token::reserved("key", p.as_ref()));
                name_list(&mut tokens, columns, p.as_ref());
            }
            TableConstraintKind::Unique { columns } => {
                tokens.push(Token::reserved("unique", p.as_ref()));
                name_list(&mut tokens, columns, p.as_ref());
            }
            TableConstraintKind::ForeignKey {
                columns,
                ref_table,
                ref_columns,
            } => {
                tokens.push(Token::reserved("foreign", p.as_ref()));
                tokens.push(Token::reserved("key", p.as_ref()));
                name_list(&mut tokens, columns, p.as_ref());
                let refs = Token::reserved("references", p.as_ref());
                tokens.push(refs.clone());
                tokens.push(Token::word(ref_table, Some(&refs)));
                if !ref_columns.is_empty() {
                    name_list(&mut tokens, ref_columns, Some(&refs));
                }
            }
            TableConstraintKind::Check(value) => {
                let kw = Token::reserved("check", p.as_ref());
                let open = Token::word("(", Some(&kw));
                tokens.push(kw);
                tokens.push(open.clone());
                extend(&mut tokens, value, Some(&open));
                tokens.push(Token::word(")", Some(&open)));
            }
        }
        Box::new(tokens.into_iter())
    }
}

impl ToTokens for TableDefinitionClause {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let open = Token::word("(", parent);
        let mut tokens = vec![open.clone()];
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                tokens.push(Token::word(",", Some(&open)));
            }
            match item {
                TableDefinitionItem::Column(c) => extend(&mut tokens, c, Some(&open)),
                TableDefinitionItem::Constraint(c) => extend(&mut tokens, c, Some(&open)),
            }
        }
        tokens.push(Token::word(")", Some(&open)));
        Box::new(tokens.into_iter())
    }
}

impl ToTokens for CreateTableQuery {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let create = Token::reserved("create", parent);
        let mut tokens = vec![create.clone()];
        if self.temporary {
            tokens.push(Token::reserved("temporary", Some(&create)));
        }
        tokens.push(Token::reserved("table", Some(&create)));
        if self.if_not_exists {
            tokens.push(Token::reserved("if", Some(&create)));
            tokens.push(Token::reserved("not", Some(&create)));
            tokens.push(Token::reserved("exists", Some(&create)));
        }
        extend(&mut tokens, &self.table, Some(&create));
        if let Some(definition) = &self.definition {
            extend(&mut tokens, definition, Some(&create));
        }
        if let Some(query) = &self.query {
            let as_kw = Token::reserved("as", Some(&create));
            tokens.push(as_kw.clone());
            extend(&mut tokens, query.as_ref(), Some(&as_kw));
        }
        Box::new(tokens.into_iter())
    }
}

impl ToTokens for AlterCommand {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let p = parent.cloned();
        let mut tokens = Vec::new();
        match self {
            AlterCommand::AddColumn(column) => {
                let add = Token::reserved("add", p.as_ref());
                tokens.push(add.clone());
                tokens.push(Token::reserved("column", Some(&add)));
                extend(&mut tokens, column, Some(&add));
            }
            AlterCommand::DropColumn { name } => {
                let drop = Token::reserved("drop", p.as_ref());
                tokens.push(drop.clone());
                tokens.push(Token::reserved("column", Some(&drop)));
                tokens.push(Token::word(name, Some(&drop)));
            }
            AlterCommand::AddConstraint(constraint) => {
                let add = Token::reserved("add", p.as_ref());
                tokens.push(add.clone());
                extend(&mut tokens, constraint, Some(&add));
            }
            AlterCommand::DropConstraint { name } => {
                let drop = Token::reserved("drop", p.as_ref());
                tokens.push(drop.clone());
                tokens.push(Token::reserved("constraint", Some(&drop)));
                tokens.push(Token::word(name, Some(&drop)));
            }
            AlterCommand::SetDefault { column, value } => {
                let alter = Self::alter_column(&mut tokens, p.as_ref(), column);
                tokens.push(Token::reserved("set", Some(&alter)));
                let default = Token::reserved("default", Some(&alter));
                tokens.push(default.clone());
                extend(&mut tokens, value, Some(&default));
            }
            AlterCommand::DropDefault { column } => {
                let alter = Self::alter_column(&mut tokens, p.as_ref(), column);
                tokens.push(Token::reserved("drop", Some(&alter)));
                tokens.push(Token::reserved("default", Some(&alter)));
            }
            AlterCommand::SetNotNull { column } => {
                let alter = Self::alter_column(&mut tokens, p.as_ref(), column);
                tokens.push(Token::reserved("set", Some(&alter)));
                tokens.push(Token::reserved("not", Some(&alter)));
                tokens.push(Token::reserved("null", Some(&alter)));
            }
            AlterCommand::DropNotNull { column } => {
                let alter = Self::alter_column(&mut tokens, p.as_ref(), column);
                tokens.push(Token::reserved("drop", Some(&alter)));
                tokens.push(Token::reserved("not", Some(&alter)));
                tokens.push(Token::reserved("null", Some(&alter)));
            }
            AlterCommand::ChangeColumnType { column, type_name } => {
                let alter = Self::alter_column(&mut tokens, p.as_ref(), column);
                tokens.push(Token::reserved("type", Some(&alter)));
                extend(&mut tokens, type_name, Some(&alter));
            }
            AlterCommand::RenameColumn { from, to } => {
                let rename = Token::reserved("rename", p.as_ref());
                tokens.push(rename.clone());
                tokens.push(Token::reserved("column", Some(&rename)));
                tokens.push(Token::word(from, Some(&rename)));
                tokens.push(Token::reserved("to", Some(&rename)));
                tokens.push(Token::word(to, Some(&rename)));
            }
            AlterCommand::RenameTable { to } => {
                let rename = Token::reserved("rename", p.as_ref());
                tokens.push(rename.clone());
                tokens.push(Token::reserved("to", Some(&rename)));
                tokens.push(Token::word(to, Some(&rename)));
            }
        }
        Box::new(tokens.into_iter())
    }
}

impl AlterCommand {
    fn alter_column(tokens: &mut Vec<Token>, parent: Option<&Token>, column: &str) -> Token {
        let alter = Token::reserved("alter", parent);
        tokens.push(alter.clone());
        tokens.push(Token::reserved("column", Some(&alter)));
        tokens.push(Token::word(column, Some(&alter)));
        alter
    }
}

impl ToTokens for AlterTableQuery {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let alter = Token::reserved("alter", parent);
        let mut tokens = vec![alter.clone(), Token::reserved("table", Some(&alter))];
        extend(&mut tokens, &self.table, Some(&alter));
        for (i, command) in self.commands.iter().enumerate() {
            if i > 0 {
                tokens.push(Token::word(",", Some(&alter)));
            }
            extend(&mut tokens, command, Some(&alter));
        }
        Box::new(tokens.into_iter())
    }
}

impl ToTokens for CreateIndexQuery {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let create = Token::reserved("create", parent);
        let mut tokens = vec![create.clone()];
        if self.unique {
            tokens.push(Token::reserved("unique", Some(&create)));
        }
        tokens.push(Token::reserved("index", Some(&create)));
        if self.if_not_exists {
            tokens.push(Token::reserved("if", Some(&create)));
            tokens.push(Token::reserved("not", Some(&create)));
            tokens.push(Token::reserved("exists", Some(&create)));
        }
        if let Some(name) = &self.name {
            tokens.push(Token::word(name, Some(&create)));
        }
        let on = Token::reserved("on", Some(&create));
        tokens.push(on.clone());
        extend(&mut tokens, &self.on, Some(&on));
        if let Some(method) = &self.using {
            let using = Token::reserved("using", Some(&create));
            tokens.push(using.clone());
            tokens.push(Token::word(method, Some(&using)));
        }
        let open = Token::word("(", Some(&create));
        tokens.push(open.clone());
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                tokens.push(Token::word(",", Some(&open)));
            }
            extend(&mut tokens, column, Some(&open));
        }
        tokens.push(Token::word(")", Some(&open)));
        if let Some(where_clause) = &self.where_clause {
            extend(&mut tokens, where_clause, Some(&create));
        }
        Box::new(tokens.into_iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_create() -> CreateTableQuery {
        CreateTableQuery {
            temporary: false,
            if_not_exists: false,
            table: PhysicalTable::new("x"),
            definition: Some(TableDefinitionClause {
                items: vec![
                    TableDefinitionItem::Column(ColumnDefinition {
                        name: "id".into(),
                        type_name: TypeName::new("integer"),
                        constraints: vec![ColumnConstraint::PrimaryKey],
                    }),
                    TableDefinitionItem::Column(ColumnDefinition {
                        name: "name".into(),
                        type_name: TypeName::new("text"),
                        constraints: vec![ColumnConstraint::NotNull],
                    }),
                ],
            }),
            query: None,
        }
    }

    #[test]
    fn test_create_table_text() {
        assert_eq!(
            sample_create().to_text(),
            "create table x(id integer primary key, name text not null)"
        );
    }

    #[test]
    fn test_apply_add_and_drop_column() {
        let mut create = sample_create();
        AlterCommand::AddColumn(ColumnDefinition::new("y", TypeName::new("integer")))
            .apply(&mut create)
            .unwrap();
        assert!(create.definition.as_ref().unwrap().find_column("y").is_some());

        AlterCommand::DropColumn { name: "y".into() }
            .apply(&mut create)
            .unwrap();
        assert!(create.definition.as_ref().unwrap().find_column("y").is_none());

        let err = AlterCommand::DropColumn { name: "y".into() }
            .apply(&mut create)
            .unwrap_err();
        assert!(matches!(err, Error::Structural(_)));
    }

    #[test]
    fn test_fold_applies_in_statement_order() {
        let create = sample_create();
        let alters = vec![
            AlterTableQuery {
                table: PhysicalTable::new("x"),
                commands: vec![AlterCommand::AddColumn(ColumnDefinition::new(
                    "y",
                    TypeName::new("integer"),
                ))],
            },
            AlterTableQuery {
                table: PhysicalTable::new("x"),
                commands: vec![AlterCommand::RenameColumn {
                    from: "y".into(),
                    to: "z".into(),
                }],
            },
        ];
        let folded = create.fold(&alters).unwrap();
        let definition = folded.definition.unwrap();
        assert!(definition.find_column("z").is_some());
        assert!(definition.find_column("y").is_none());
    }

    #[test]
    fn test_fold_rejects_wrong_table() {
        let create = sample_create();
        let alters = vec![AlterTableQuery {
            table: PhysicalTable::new("other"),
            commands: vec![],
        }];
        assert!(matches!(
            create.fold(&alters),
            Err(Error::Structural(_))
        ));
    }

    #[test]
    fn test_alter_command_text() {
        let alter = AlterTableQuery {
            table: PhysicalTable::new("x"),
            commands: vec![
                AlterCommand::SetDefault {
                    column: "a".into(),
                    value: Value::literal("0"),
                },
                AlterCommand::RenameTable { to: "y".into() },
            ],
        };
        assert_eq!(
            alter.to_text(),
            "alter table x alter column a set default 0, rename to y"
        );
    }

    #[test]
    fn test_create_index_text() {
        let index = CreateIndexQuery {
            unique: true,
            if_not_exists: false,
            name: Some("ix_users_name".into()),
            on: PhysicalTable::new("users"),
            using: Some("btree".into()),
            columns: vec![SortableItem::new(Value::column("name"))],
            where_clause: Some(WhereClause::new(
                Value::column("deleted").chain("=", Value::literal("false")),
            )),
        };
        assert_eq!(
            index.to_text(),
            "create unique index ix_users_name on users using btree(name) where deleted = false"
        );
    }
}
