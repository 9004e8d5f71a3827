//! Query clauses
//!
//! One struct per clause of the statement grammar. Each clause owns its
//! children outright and emits its own leading keyword token; the queries
//! in `queries.rs` compose clauses in grammar order and simply chain their
//! token sequences.

use serde::{Deserialize, Serialize};

use crate::queries::ReadQuery;
use crate::table::SelectableTable;
use crate::tokens::{Token, TokenIter, ToTokens};
use crate::values::{ColumnValue, Value, ValueCollection, ValueKind, WindowDefinition};

/// The select-list with its optional DISTINCT qualifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectClause {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distinct: Option<Distinct>,
    pub items: Vec<SelectableItem>,
}

impl SelectClause {
    pub fn new(items: Vec<SelectableItem>) -> Self {
        Self {
            distinct: None,
            items,
        }
    }
}

/// `DISTINCT`, optionally `DISTINCT ON (...)`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Distinct {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<ValueCollection>,
}

/// One select-list entry: a value and its optional alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectableItem {
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl SelectableItem {
    pub fn new(value: Value) -> Self {
        Self { value, alias: None }
    }

    pub fn aliased(value: Value, alias: impl Into<String>) -> Self {
        Self {
            value,
            alias: Some(alias.into()),
        }
    }
}

/// FROM with its root table and any number of joined relations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FromClause {
    pub root: SelectableTable,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<Relation>,
}

impl FromClause {
    pub fn new(root: SelectableTable) -> Self {
        Self {
            root,
            relations: Vec::new(),
        }
    }
}

/// One joined relation with its join kind and optional ON condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub join: JoinKind,
    pub table: SelectableTable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,
}

/// The join kind. `LEFT OUTER JOIN` and `LEFT JOIN` both map to
/// [`JoinKind::Left`]; emission uses the short form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Cross,
}

impl JoinKind {
    pub fn as_keyword(&self) -> &'static str {
        match self {
            JoinKind::Inner => "inner join",
            JoinKind::Left => "left join",
            JoinKind::Right => "right join",
            JoinKind::Cross => "cross join",
        }
    }

    /// Recognize a join keyword as merged by the token reader. A bare
    /// `join` is an inner join.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "join" | "inner join" => Some(JoinKind::Inner),
            "left join" | "left outer join" => Some(JoinKind::Left),
            "right join" | "right outer join" => Some(JoinKind::Right),
            "cross join" => Some(JoinKind::Cross),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereClause {
    pub condition: Value,
}

impl WhereClause {
    pub fn new(condition: Value) -> Self {
        Self { condition }
    }

    /// AND another predicate onto the condition, parenthesizing the new
    /// predicate when it carries its own operator chain.
    pub fn and(&mut self, predicate: Value) {
        let predicate = if predicate.next.is_some() {
            Value::bracket(predicate)
        } else {
            predicate
        };
        let current = std::mem::replace(&mut self.condition, Value::literal("null"));
        self.condition = current.and(predicate);
    }

    /// OR another predicate onto the condition, parenthesizing as `and`
    /// does.
    pub fn or(&mut self, predicate: Value) {
        let predicate = if predicate.next.is_some() {
            Value::bracket(predicate)
        } else {
            predicate
        };
        let current = std::mem::replace(&mut self.condition, Value::literal("null"));
        self.condition = current.or(predicate);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupClause {
    pub items: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HavingClause {
    pub condition: Value,
}

/// The WINDOW clause's named window list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowClause {
    pub windows: Vec<NamedWindow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedWindow {
    pub name: String,
    pub definition: WindowDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderClause {
    pub items: Vec<SortableItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortableItem {
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nulls: Option<NullsPlacement>,
}

impl SortableItem {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            direction: None,
            nulls: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullsPlacement {
    First,
    Last,
}

impl NullsPlacement {
    pub fn as_keyword(&self) -> &'static str {
        match self {
            NullsPlacement::First => "nulls first",
            NullsPlacement::Last => "nulls last",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitClause {
    pub limit: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Value>,
}

/// WITH and its common tables. Resolution of a common-table reference is
/// by alias text, never node identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithClause {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub recursive: bool,
    pub tables: Vec<CommonTable>,
}

impl WithClause {
    /// Find a common table by alias.
    pub fn find(&self, alias: &str) -> Option<&CommonTable> {
        self.tables
            .iter()
            .find(|t| t.alias.eq_ignore_ascii_case(alias))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonTable {
    pub alias: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_aliases: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materialization: Option<Materialization>,
    pub query: ReadQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Materialization {
    Materialized,
    NotMaterialized,
}

impl Materialization {
    pub fn as_keyword(&self) -> &'static str {
        match self {
            Materialization::Materialized => "materialized",
            Materialization::NotMaterialized => "not materialized",
        }
    }
}

/// RETURNING list shared by INSERT, UPDATE, and DELETE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturningClause {
    pub items: ValueCollection,
}

/// UPDATE's SET assignment list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetClause {
    pub items: Vec<SetItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetItem {
    pub column: ColumnValue,
    pub value: Value,
}

/// DELETE's USING table list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsingClause {
    pub tables: Vec<SelectableTable>,
}

impl ToTokens for SelectClause {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let select = Token::reserved("select", parent);
        let distinct_parent = select.clone();
        let distinct = self.distinct.iter().flat_map(move |d| {
            let kw = Token::reserved("distinct", Some(&distinct_parent));
            let on = d.on.iter().flat_map({
                let kw = kw.clone();
                move |items| {
                    let on_kw = Token::reserved("on", Some(&kw));
                    let open = Token::word("(", Some(&on_kw));
                    let list_parent = open.clone();
                    let close_parent = open.clone();
                    [on_kw, open.clone()]
                        .into_iter()
                        .chain(
                            std::iter::once(())
                                .flat_map(move |_| items.to_tokens(Some(&list_parent))),
                        )
                        .chain(std::iter::once_with(move || {
                            Token::word(")", Some(&close_parent))
                        }))
                }
            });
            std::iter::once(kw.clone()).chain(on)
        });
        let items_parent = select.clone();
        let items = self.items.iter().enumerate().flat_map(move |(i, item)| {
            let comma = (i > 0).then(|| Token::word(",", Some(&items_parent)));
            comma
                .into_iter()
                .chain(item.to_tokens(Some(&items_parent)))
        });
        Box::new(std::iter::once(select.clone()).chain(distinct).chain(items))
    }
}

impl ToTokens for SelectableItem {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let p = parent.cloned();
        let value = self.value.to_tokens(p.as_ref());
        let alias = self.alias.iter().flat_map(move |alias| {
            let as_kw = Token::reserved("as", p.as_ref());
            let name = Token::word(alias, Some(&as_kw));
            [as_kw, name]
        });
        Box::new(value.chain(alias))
    }
}

impl ToTokens for FromClause {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let from = Token::reserved("from", parent);
        let root_parent = from.clone();
        let root = std::iter::once(())
            .flat_map(move |_| self.root.to_tokens(Some(&root_parent)));
        let relations_parent = from.clone();
        let relations = self
            .relations
            .iter()
            .flat_map(move |r| r.to_tokens(Some(&relations_parent)));
        Box::new(std::iter::once(from.clone()).chain(root).chain(relations))
    }
}

impl ToTokens for Relation {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let join = Token::reserved(self.join.as_keyword(), parent);
        let table_parent = join.clone();
        let table = std::iter::once(())
            .flat_map(move |_| self.table.to_tokens(Some(&table_parent)));
        let on_parent = join.clone();
        let condition = self.condition.iter().flat_map(move |c| {
            let on = Token::reserved("on", Some(&on_parent));
            std::iter::once(on.clone())
                .chain(std::iter::once(()).flat_map(move |_| c.to_tokens(Some(&on))))
        });
        Box::new(std::iter::once(join.clone()).chain(table).chain(condition))
    }
}

impl ToTokens for WhereClause {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let kw = Token::reserved("where", parent);
        Box::new(std::iter::once(kw.clone()).chain(
            std::iter::once(()).flat_map(move |_| self.condition.to_tokens(Some(&kw))),
        ))
    }
}

impl ToTokens for GroupClause {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let kw = Token::reserved("group by", parent);
        let items = self.items.iter().enumerate().flat_map({
            let kw = kw.clone();
            move |(i, v)| {
                let comma = (i > 0).then(|| Token::word(",", Some(&kw)));
                comma.into_iter().chain(v.to_tokens(Some(&kw)))
            }
        });
        Box::new(std::iter::once(kw).chain(items))
    }
}

impl ToTokens for HavingClause {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let kw = Token::reserved("having", parent);
        Box::new(std::iter::once(kw.clone()).chain(
            std::iter::once(()).flat_map(move |_| self.condition.to_tokens(Some(&kw))),
        ))
    }
}

impl ToTokens for WindowClause {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let kw = Token::reserved("window", parent);
        let windows = self.windows.iter().enumerate().flat_map({
            let kw = kw.clone();
            move |(i, w)| {
                let comma = (i > 0).then(|| Token::word(",", Some(&kw)));
                let name = Token::word(&w.name, Some(&kw));
                let as_kw = Token::reserved("as", Some(&kw));
                let def_parent = kw.clone();
                comma
                    .into_iter()
                    .chain([name, as_kw])
                    .chain(
                        std::iter::once(())
                            .flat_map(move |_| w.definition.to_tokens(Some(&def_parent))),
                    )
            }
        });
        Box::new(std::iter::once(kw).chain(windows))
    }
}

impl ToTokens for OrderClause {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let kw = Token::reserved("order by", parent);
        let items = self.items.iter().enumerate().flat_map({
            let kw = kw.clone();
            move |(i, item)| {
                let comma = (i > 0).then(|| Token::word(",", Some(&kw)));
                comma.into_iter().chain(item.to_tokens(Some(&kw)))
            }
        });
        Box::new(std::iter::once(kw).chain(items))
    }
}

impl ToTokens for SortableItem {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let p = parent.cloned();
        let value = self.value.to_tokens(p.as_ref());
        let dir_parent = p.clone();
        let direction = self
            .direction
            .iter()
            .map(move |d| Token::reserved(d.as_keyword(), dir_parent.as_ref()));
        let nulls_parent = p;
        let nulls = self
            .nulls
            .iter()
            .map(move |n| Token::reserved(n.as_keyword(), nulls_parent.as_ref()));
        Box::new(value.chain(direction).chain(nulls))
    }
}

impl ToTokens for LimitClause {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let kw = Token::reserved("limit", parent);
        let limit_parent = kw.clone();
        let limit = std::iter::once(())
            .flat_map(move |_| self.limit.to_tokens(Some(&limit_parent)));
        let offset_parent = kw.clone();
        let offset = self.offset.iter().flat_map(move |v| {
            let off = Token::reserved("offset", Some(&offset_parent));
            std::iter::once(off.clone())
                .chain(std::iter::once(()).flat_map(move |_| v.to_tokens(Some(&off))))
        });
        Box::new(std::iter::once(kw).chain(limit).chain(offset))
    }
}

impl ToTokens for WithClause {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let kw = Token::reserved("with", parent);
        let recursive = self
            .recursive
            .then(|| Token::reserved("recursive", Some(&kw)));
        let tables = self.tables.iter().enumerate().flat_map({
            let kw = kw.clone();
            move |(i, t)| {
                let comma = (i > 0).then(|| Token::word(",", Some(&kw)));
                comma.into_iter().chain(t.to_tokens(Some(&kw)))
            }
        });
        Box::new(
            std::iter::once(kw.clone())
                .chain(recursive)
                .chain(tables),
        )
    }
}

impl ToTokens for CommonTable {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let p = parent.cloned();
        let alias = Token::word(&self.alias, p.as_ref());
        let cols_parent = alias.clone();
        let columns = self.column_aliases.iter().flat_map(move |names| {
            let open = Token::word("(", Some(&cols_parent));
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
        let as_kw = Token::reserved("as", p.as_ref());
        let hint_parent = as_kw.clone();
        let materialization = self
            .materialization
            .iter()
            .map(move |m| Token::reserved(m.as_keyword(), Some(&hint_parent)));
        let open = Token::word("(", p.as_ref());
        let body_parent = open.clone();
        let close_parent = open.clone();
        Box::new(
            std::iter::once(alias.clone())
                .chain(columns)
                .chain(std::iter::once(as_kw.clone()))
                .chain(materialization)
                .chain(std::iter::once(open.clone()))
                .chain(
                    std::iter::once(())
                        .flat_map(move |_| self.query.to_tokens(Some(&body_parent))),
                )
                .chain(std::iter::once_with(move || {
                    Token::word(")", Some(&close_parent))
                })),
        )
    }
}

impl ToTokens for ReturningClause {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let kw = Token::reserved("returning", parent);
        Box::new(std::iter::once(kw.clone()).chain(
            std::iter::once(()).flat_map(move |_| self.items.to_tokens(Some(&kw))),
        ))
    }
}

impl ToTokens for SetClause {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let kw = Token::reserved("set", parent);
        let items = self.items.iter().enumerate().flat_map({
            let kw = kw.clone();
            move |(i, item)| {
                let comma = (i > 0).then(|| Token::word(",", Some(&kw)));
                let column = Value::new(ValueKind::Column(item.column.clone()));
                let eq = Token::word("=", Some(&kw));
                let value_parent = kw.clone();
                comma
                    .into_iter()
                    .chain(column.to_tokens(Some(&kw)).collect::<Vec<_>>())
                    .chain(std::iter::once(eq))
                    .chain(
                        std::iter::once(())
                            .flat_map(move |_| item.value.to_tokens(Some(&value_parent))),
                    )
            }
        });
        Box::new(std::iter::once(kw).chain(items))
    }
}

impl ToTokens for UsingClause {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let kw = Token::reserved("using", parent);
        let tables = self.tables.iter().enumerate().flat_map({
            let kw = kw.clone();
            move |(i, t)| {
                let comma = (i > 0).then(|| Token::word(",", Some(&kw)));
                comma.into_iter().chain(t.to_tokens(Some(&kw)))
            }
        });
        Box::new(std::iter::once(kw).chain(tables))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{PhysicalTable, Table};

    #[test]
    fn test_select_clause_distinct_on() {
        let clause = SelectClause {
            distinct: Some(Distinct {
                on: Some(ValueCollection::new(vec![Value::column("dept")])),
            }),
            items: vec![SelectableItem::new(Value::column("dept"))],
        };
        assert_eq!(clause.to_text(), "select distinct on (dept) dept");
    }

    #[test]
    fn test_from_with_join() {
        let from = FromClause {
            root: SelectableTable::aliased(Table::Physical(PhysicalTable::new("a")), "x"),
            relations: vec![Relation {
                join: JoinKind::Left,
                table: SelectableTable::new(Table::Physical(PhysicalTable::new("b"))),
                condition: Some(
                    Value::qualified_column("x", "id")
                        .chain("=", Value::qualified_column("b", "id")),
                ),
            }],
        };
        assert_eq!(from.to_text(), "from a as x left join b on x.id = b.id");
    }

    #[test]
    fn test_join_kind_normalization() {
        assert_eq!(
            JoinKind::from_keyword("left outer join"),
            JoinKind::from_keyword("LEFT JOIN")
        );
        assert_eq!(JoinKind::from_keyword("join"), Some(JoinKind::Inner));
        assert_eq!(JoinKind::from_keyword("full join"), None);
    }

    #[test]
    fn test_where_and_parenthesizes_chained_predicates() {
        let mut w = WhereClause::new(Value::column("a").chain("=", Value::literal("1")));
        w.and(Value::column("b").chain("=", Value::literal("2")));
        assert_eq!(w.to_text(), "where a = 1 and (b = 2)");
        w.and(Value::column("c"));
        assert_eq!(w.to_text(), "where a = 1 and (b = 2) and c");
    }

    #[test]
    fn test_order_clause() {
        let order = OrderClause {
            items: vec![
                SortableItem {
                    value: Value::column("a"),
                    direction: Some(SortDirection::Desc),
                    nulls: Some(NullsPlacement::Last),
                },
                SortableItem::new(Value::column("b")),
            ],
        };
        assert_eq!(order.to_text(), "order by a desc nulls last, b");
    }

    #[test]
    fn test_limit_offset() {
        let limit = LimitClause {
            limit: Value::literal("10"),
            offset: Some(Value::literal("20")),
        };
        assert_eq!(limit.to_text(), "limit 10 offset 20");
    }
}
