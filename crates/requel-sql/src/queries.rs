//! Query AST
//!
//! The query family: [`SelectQuery`] and [`ValuesQuery`] (the two readable
//! queries), the DML queries, and the [`Query`] dispatcher that covers
//! every statement kind the parser understands.
//!
//! Set operations (`UNION`, `UNION ALL`, `EXCEPT`, `INTERSECT`, `MINUS`)
//! chain exactly like value operators: right-linked and order-preserving,
//! so `A UNION B UNION C` is `A UNION (B UNION C)` structurally and
//! re-serializes in input order.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::clauses::{
    FromClause, GroupClause, HavingClause, LimitClause, OrderClause, ReturningClause,
    SelectClause, SelectableItem, SetClause, SortableItem, UsingClause, WhereClause,
    WindowClause, WithClause,
};
use crate::ddl::{AlterTableQuery, CreateIndexQuery, CreateTableQuery};
use crate::table::{PhysicalTable, SelectableTable};
use crate::tokens::{Token, TokenIter, ToTokens};
use crate::values::{Value, ValueCollection};

/// A query usable wherever rows are read: as a statement, a subquery, a
/// common table body, or an INSERT source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadQuery {
    Select(Box<SelectQuery>),
    Values(ValuesQuery),
}

impl ReadQuery {
    pub fn select(query: SelectQuery) -> Self {
        ReadQuery::Select(Box::new(query))
    }

    /// Chain a set operation at the end of this query's operation chain.
    pub fn chain_operation(&mut self, operator: SetOperator, query: ReadQuery) {
        match self {
            ReadQuery::Select(q) => q.chain_operation(operator, query),
            ReadQuery::Values(q) => q.chain_operation(operator, query),
        }
    }
}

/// A SELECT statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with: Option<WithClause>,
    pub select: SelectClause,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<FromClause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<WhereClause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupClause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub having: Option<HavingClause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<WindowClause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderClause>,
    /// Trailing set operation, chained right-recursively.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<Box<QueryOperation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<LimitClause>,
}

impl SelectQuery {
    pub fn new(select: SelectClause) -> Self {
        Self {
            with: None,
            select,
            from: None,
            where_clause: None,
            group: None,
            having: None,
            window: None,
            order: None,
            operation: None,
            limit: None,
        }
    }

    /// Append an item to the select-list.
    pub fn push_select(&mut self, item: SelectableItem) {
        self.select.items.push(item);
    }

    /// AND a predicate into WHERE, creating the clause when absent.
    pub fn and_where(&mut self, predicate: Value) {
        match &mut self.where_clause {
            Some(w) => w.and(predicate),
            None => self.where_clause = Some(WhereClause::new(predicate)),
        }
    }

    /// OR a predicate into WHERE, creating the clause when absent.
    pub fn or_where(&mut self, predicate: Value) {
        match &mut self.where_clause {
            Some(w) => w.or(predicate),
            None => self.where_clause = Some(WhereClause::new(predicate)),
        }
    }

    /// Append a sort item, creating the ORDER BY clause when absent.
    pub fn push_order(&mut self, item: SortableItem) {
        match &mut self.order {
            Some(o) => o.items.push(item),
            None => self.order = Some(OrderClause { items: vec![item] }),
        }
    }

    pub fn set_limit(&mut self, limit: Value, offset: Option<Value>) {
        self.limit = Some(LimitClause { limit, offset });
    }

    /// Chain a set operation at the end of the operation chain.
    pub fn chain_operation(&mut self, operator: SetOperator, query: ReadQuery) {
        match &mut self.operation {
            None => self.operation = Some(Box::new(QueryOperation { operator, query })),
            Some(op) => op.query.chain_operation(operator, query),
        }
    }
}

/// One link of the set-operation chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOperation {
    pub operator: SetOperator,
    pub query: ReadQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetOperator {
    Union,
    UnionAll,
    Except,
    Intersect,
    Minus,
}

impl SetOperator {
    pub fn as_keyword(&self) -> &'static str {
        match self {
            SetOperator::Union => "union",
            SetOperator::UnionAll => "union all",
            SetOperator::Except => "except",
            SetOperator::Intersect => "intersect",
            SetOperator::Minus => "minus",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "union" => Some(SetOperator::Union),
            "union all" => Some(SetOperator::UnionAll),
            "except" => Some(SetOperator::Except),
            "intersect" => Some(SetOperator::Intersect),
            "minus" => Some(SetOperator::Minus),
            _ => None,
        }
    }
}

/// A VALUES query: one or more parenthesized rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuesQuery {
    pub rows: Vec<ValueCollection>,
    /// Trailing set operation, chained right-recursively.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<Box<QueryOperation>>,
}

impl ValuesQuery {
    pub fn new(rows: Vec<ValueCollection>) -> Self {
        Self {
            rows,
            operation: None,
        }
    }

    /// Chain a set operation at the end of this query's operation chain.
    pub fn chain_operation(&mut self, operator: SetOperator, query: ReadQuery) {
        match &mut self.operation {
            None => self.operation = Some(Box::new(QueryOperation { operator, query })),
            Some(op) => op.query.chain_operation(operator, query),
        }
    }
}

/// INSERT INTO. A leading WITH on the statement is hoisted into the
/// nested SELECT source; INSERT has no common-table slot of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertQuery {
    pub target: PhysicalTable,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
    pub source: ReadQuery,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returning: Option<ReturningClause>,
}

/// UPDATE ... SET ... [FROM ...] [WHERE ...] [RETURNING ...].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with: Option<WithClause>,
    pub target: SelectableTable,
    pub set: SetClause,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<FromClause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<WhereClause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returning: Option<ReturningClause>,
}

impl UpdateQuery {
    /// AND a predicate into WHERE, creating the clause when absent.
    pub fn and_where(&mut self, predicate: Value) {
        match &mut self.where_clause {
            Some(w) => w.and(predicate),
            None => self.where_clause = Some(WhereClause::new(predicate)),
        }
    }
}

/// DELETE FROM ... [USING ...] [WHERE ...] [RETURNING ...].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with: Option<WithClause>,
    pub target: SelectableTable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub using: Option<UsingClause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<WhereClause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returning: Option<ReturningClause>,
}

impl DeleteQuery {
    /// AND a predicate into WHERE, creating the clause when absent.
    pub fn and_where(&mut self, predicate: Value) {
        match &mut self.where_clause {
            Some(w) => w.and(predicate),
            None => self.where_clause = Some(WhereClause::new(predicate)),
        }
    }
}

/// Any parsed statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    Select(SelectQuery),
    Values(ValuesQuery),
    Insert(InsertQuery),
    Update(UpdateQuery),
    Delete(DeleteQuery),
    CreateTable(CreateTableQuery),
    AlterTable(AlterTableQuery),
    CreateIndex(CreateIndexQuery),
}

impl ToTokens for ReadQuery {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        match self {
            ReadQuery::Select(q) => q.to_tokens(parent),
            ReadQuery::Values(q) => q.to_tokens(parent),
        }
    }
}

impl ToTokens for SelectQuery {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let p = parent.cloned();
        fn optional<'a, T: ToTokens>(
            node: &'a Option<T>,
            parent: Option<Token>,
        ) -> impl Iterator<Item = Token> + 'a {
            node.iter()
                .flat_map(move |n| n.to_tokens(parent.as_ref()))
        }

        let with = optional(&self.with, p.clone());
        let select = {
            let p = p.clone();
            std::iter::once(()).flat_map(move |_| self.select.to_tokens(p.as_ref()))
        };
        let from = optional(&self.from, p.clone());
        let where_clause = optional(&self.where_clause, p.clone());
        let group = optional(&self.group, p.clone());
        let having = optional(&self.having, p.clone());
        let window = optional(&self.window, p.clone());
        let order = optional(&self.order, p.clone());
        let operation = {
            let p = p.clone();
            self.operation
                .iter()
                .flat_map(move |op| op.to_tokens(p.as_ref()))
        };
        let limit = optional(&self.limit, p);

        Box::new(
            with.chain(select)
                .chain(from)
                .chain(where_clause)
                .chain(group)
                .chain(having)
                .chain(window)
                .chain(order)
                .chain(operation)
                .chain(limit),
        )
    }
}

impl ToTokens for QueryOperation {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let kw = Token::reserved(self.operator.as_keyword(), parent);
        Box::new(std::iter::once(kw.clone()).chain(
            std::iter::once(()).flat_map(move |_| self.query.to_tokens(Some(&kw))),
        ))
    }
}

impl ToTokens for ValuesQuery {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let kw = Token::reserved("values", parent);
        let rows = self.rows.iter().enumerate().flat_map({
            let kw = kw.clone();
            move |(i, row)| {
                let comma = (i > 0).then(|| Token::word(",", Some(&kw)));
                let open = Token::word("(", Some(&kw));
                let row_parent = open.clone();
                let close_parent = open.clone();
                comma
                    .into_iter()
                    .chain(std::iter::once(open.clone()))
                    .chain(
                        std::iter::once(())
                            .flat_map(move |_| row.to_tokens(Some(&row_parent))),
                    )
                    .chain(std::iter::once_with(move || {
                        Token::word(")", Some(&close_parent))
                    }))
            }
        });
        let operation = {
            let p = parent.cloned();
            self.operation
                .iter()
                .flat_map(move |op| op.to_tokens(p.as_ref()))
        };
        Box::new(std::iter::once(kw).chain(rows).chain(operation))
    }
}

impl ToTokens for InsertQuery {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let insert = Token::reserved("insert", parent);
        let into = Token::reserved("into", Some(&insert));
        let target_parent = insert.clone();
        let target = std::iter::once(())
            .flat_map(move |_| self.target.to_tokens(Some(&target_parent)));
        let cols_parent = insert.clone();
        let columns = if self.columns.is_empty() {
            None
        } else {
            Some(())
        }
        .into_iter()
        .flat_map(move |_| {
            let open = Token::word("(", Some(&cols_parent));
            let list_parent = open.clone();
            let close_parent = open.clone();
            std::iter::once(open.clone())
                .chain(self.columns.iter().enumerate().flat_map(move |(i, c)| {
                    let comma = (i > 0).then(|| Token::word(",", Some(&list_parent)));
                    comma
                        .into_iter()
                        .chain(std::iter::once(Token::word(c, Some(&list_parent))))
                }))
                .chain(std::iter::once_with(move || {
                    Token::word(")", Some(&close_parent))
                }))
        });
        let source_parent = insert.clone();
        let source = std::iter::once(())
            .flat_map(move |_| self.source.to_tokens(Some(&source_parent)));
        let returning_parent = insert.clone();
        let returning = self
            .returning
            .iter()
            .flat_map(move |r| r.to_tokens(Some(&returning_parent)));
        Box::new(
            [insert.clone(), into]
                .into_iter()
                .chain(target)
                .chain(columns)
                .chain(source)
                .chain(returning),
        )
    }
}

impl ToTokens for UpdateQuery {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let p = parent.cloned();
        let with = {
            let p = p.clone();
            self.with.iter().flat_map(move |w| w.to_tokens(p.as_ref()))
        };
        let update = Token::reserved("update", p.as_ref());
        let target_parent = update.clone();
        let target = std::iter::once(())
            .flat_map(move |_| self.target.to_tokens(Some(&target_parent)));
        let set_parent = update.clone();
        let set = std::iter::once(())
            .flat_map(move |_| self.set.to_tokens(Some(&set_parent)));
        let from_parent = update.clone();
        let from = self
            .from
            .iter()
            .flat_map(move |f| f.to_tokens(Some(&from_parent)));
        let where_parent = update.clone();
        let where_clause = self
            .where_clause
            .iter()
            .flat_map(move |w| w.to_tokens(Some(&where_parent)));
        let returning_parent = update.clone();
        let returning = self
            .returning
            .iter()
            .flat_map(move |r| r.to_tokens(Some(&returning_parent)));
        Box::new(
            with.chain(std::iter::once(update.clone()))
                .chain(target)
                .chain(set)
                .chain(from)
                .chain(where_clause)
                .chain(returning),
        )
    }
}

impl ToTokens for DeleteQuery {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let p = parent.cloned();
        let with = {
            let p = p.clone();
            self.with.iter().flat_map(move |w| w.to_tokens(p.as_ref()))
        };
        let delete = Token::reserved("delete", p.as_ref());
        let from = Token::reserved("from", Some(&delete));
        let target_parent = delete.clone();
        let target = std::iter::once(())
            .flat_map(move |_| self.target.to_tokens(Some(&target_parent)));
        let using_parent = delete.clone();
        let using = self
            .using
            .iter()
            .flat_map(move |u| u.to_tokens(Some(&using_parent)));
        let where_parent = delete.clone();
        let where_clause = self
            .where_clause
            .iter()
            .flat_map(move |w| w.to_tokens(Some(&where_parent)));
        let returning_parent = delete.clone();
        let returning = self
            .returning
            .iter()
            .flat_map(move |r| r.to_tokens(Some(&returning_parent)));
        Box::new(
            with.chain([delete.clone(), from])
                .chain(target)
                .chain(using)
                .chain(where_clause)
                .chain(returning),
        )
    }
}

impl ToTokens for Query {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        match self {
            Query::Select(q) => q.to_tokens(parent),
            Query::Values(q) => q.to_tokens(parent),
            Query::Insert(q) => q.to_tokens(parent),
            Query::Update(q) => q.to_tokens(parent),
            Query::Delete(q) => q.to_tokens(parent),
            Query::CreateTable(q) => q.to_tokens(parent),
            Query::AlterTable(q) => q.to_tokens(parent),
            Query::CreateIndex(q) => q.to_tokens(parent),
        }
    }
}

impl fmt::Display for SelectQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{PhysicalTable, SelectableTable, Table};
    use crate::values::Value;

    fn select_one(column: &str, table: &str) -> SelectQuery {
        let mut q = SelectQuery::new(SelectClause::new(vec![SelectableItem::new(
            Value::column(column),
        )]));
        q.from = Some(FromClause::new(SelectableTable::new(Table::Physical(
            PhysicalTable::new(table),
        ))));
        q
    }

    #[test]
    fn test_select_to_text() {
        let mut q = select_one("id", "users");
        q.and_where(Value::column("id").chain("=", Value::literal("1")));
        assert_eq!(q.to_text(), "select id from users where id = 1");
    }

    #[test]
    fn test_edit_methods() {
        let mut q = select_one("id", "users");
        q.push_select(SelectableItem::aliased(Value::column("name"), "n"));
        q.push_order(SortableItem::new(Value::column("id")));
        q.set_limit(Value::literal("10"), None);
        assert_eq!(
            q.to_text(),
            "select id, name as n from users order by id limit 10"
        );
    }

    #[test]
    fn test_set_operation_chain_is_right_linked() {
        let mut q = select_one("a", "t1");
        q.chain_operation(SetOperator::Union, ReadQuery::select(select_one("b", "t2")));
        q.chain_operation(
            SetOperator::UnionAll,
            ReadQuery::select(select_one("c", "t3")),
        );
        assert_eq!(
            q.to_text(),
            "select a from t1 union select b from t2 union all select c from t3"
        );
        // Right-linked: the second operation hangs off the first's query.
        let first = q.operation.as_ref().unwrap();
        let ReadQuery::Select(second) = &first.query else {
            panic!("expected select");
        };
        assert!(second.operation.is_some());
    }

    #[test]
    fn test_values_query() {
        let q = ValuesQuery::new(vec![
            ValueCollection::new(vec![Value::literal("1"), Value::literal("'a'")]),
            ValueCollection::new(vec![Value::literal("2"), Value::literal("'b'")]),
        ]);
        assert_eq!(q.to_text(), "values (1, 'a'), (2, 'b')");
    }
}
