//! Table references
//!
//! A [`Table`] is anything that can stand in a FROM, JOIN, or USING
//! position: a physical table, a parenthesized subquery, a set-returning
//! function, or a LATERAL-qualified source. [`SelectableTable`] pairs a
//! table with its alias and optional column aliases.
//!
//! Common-table references are not a table variant; a CTE is referenced by
//! writing its alias as a physical table name, and resolution is by alias
//! text only.

use serde::{Deserialize, Serialize};

use crate::queries::ReadQuery;
use crate::tokens::{Token, TokenIter, ToTokens};
use crate::values::FunctionValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Physical(PhysicalTable),
    Virtual(VirtualTable),
    Function(FunctionTable),
    Lateral(LateralTable),
}

/// A schema-qualified table name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
}

impl PhysicalTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }

    /// Case-insensitive name comparison, schema included.
    pub fn same_table(&self, other: &PhysicalTable) -> bool {
        let schema_matches = match (&self.schema, &other.schema) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (None, None) => true,
            _ => false,
        };
        schema_matches && self.name.eq_ignore_ascii_case(&other.name)
    }
}

/// A nested query in table position, always emitted parenthesized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualTable {
    pub query: Box<ReadQuery>,
}

/// A set-returning function in table position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionTable {
    pub function: FunctionValue,
}

/// A LATERAL-qualified table source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LateralTable {
    pub inner: Box<Table>,
}

/// A table plus its alias and optional column aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectableTable {
    pub table: Table,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_aliases: Option<Vec<String>>,
}

impl SelectableTable {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            alias: None,
            column_aliases: None,
        }
    }

    pub fn aliased(table: Table, alias: impl Into<String>) -> Self {
        Self {
            table,
            alias: Some(alias.into()),
            column_aliases: None,
        }
    }

    /// The name this source is referred to by: the alias when present,
    /// otherwise the physical table name.
    pub fn reference_name(&self) -> Option<&str> {
        if let Some(alias) = &self.alias {
            return Some(alias);
        }
        match &self.table {
            Table::Physical(t) => Some(&t.name),
            _ => None,
        }
    }
}

impl ToTokens for PhysicalTable {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let p = parent.cloned();
        let mut tokens = Vec::with_capacity(3);
        if let Some(schema) = &self.schema {
            tokens.push(Token::word(schema, p.as_ref()));
            tokens.push(Token::word(".", p.as_ref()));
        }
        tokens.push(Token::word(&self.name, p.as_ref()));
        Box::new(tokens.into_iter())
    }
}

impl ToTokens for Table {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        match self {
            Table::Physical(t) => t.to_tokens(parent),
            Table::Function(t) => t.function.to_tokens(parent),
            Table::Virtual(t) => {
                let open = Token::word("(", parent);
                let body_parent = open.clone();
                let close_parent = open.clone();
                Box::new(
                    std::iter::once(open.clone())
                        .chain(
                            std::iter::once(())
                                .flat_map(move |_| t.query.to_tokens(Some(&body_parent))),
                        )
                        .chain(std::iter::once_with(move || {
                            Token::word(")", Some(&close_parent))
                        })),
                )
            }
            Table::Lateral(t) => {
                let lateral = Token::reserved("lateral", parent);
                Box::new(std::iter::once(lateral.clone()).chain(
                    std::iter::once(()).flat_map(move |_| t.inner.to_tokens(Some(&lateral))),
                ))
            }
        }
    }
}

impl ToTokens for SelectableTable {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let p = parent.cloned();
        let table = self.table.to_tokens(p.as_ref());
        let alias_parent = p.clone();
        let alias = self.alias.iter().flat_map(move |alias| {
            let as_kw = Token::reserved("as", alias_parent.as_ref());
            let name = Token::word(alias, Some(&as_kw));
            [as_kw, name]
        });
        let cols_parent = p;
        let columns = self.column_aliases.iter().flat_map(move |names| {
            let open = Token::word("(", cols_parent.as_ref());
            let list_parent = open.clone();
            let close_parent = open.clone();
            std::iter::once(open.clone())
                .chain(names.iter().enumerate().flat_map(move |(i, n)| {
                    let comma = (i > 0).then(|| Token::word(",", Some(&list_parent)));
                    comma
                        .into_iter()
                        .chain(std::iter::once(Token::word(n, Some(&list_parent))))
                }))
                .chain(std::iter::once_with(move || {
                    Token::word(")", Some(&close_parent))
                }))
        });
        Box::new(table.chain(alias).chain(columns))
    }
}
