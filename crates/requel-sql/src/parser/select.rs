//! SELECT parsing
//!
//! The SELECT statement is a fixed-order sequence of clause parses, each
//! using the peek-then-consume-if-match pattern: WITH, the select-list,
//! FROM, WHERE, GROUP BY, HAVING, WINDOW, ORDER BY, a trailing set
//! operation, and LIMIT. Set operations recurse right, so `A UNION B
//! UNION C` parses as `A UNION (B UNION C)` and re-serializes in input
//! order.
//!
//! The table and alias parsers here are shared with the DML and DDL
//! parsers, which need the same FROM-position grammar.

use crate::clauses::{
    CommonTable, Distinct, FromClause, GroupClause, HavingClause, LimitClause,
    Materialization, NamedWindow, Relation, SelectClause, SelectableItem, WhereClause,
    WindowClause, WithClause,
};
use crate::error::{Error, Result};
use crate::parser::can_be_identifier;
use crate::parser::value::{
    parse_function_args, parse_order_clause, parse_value, parse_window_definition,
};
use crate::queries::{QueryOperation, ReadQuery, SelectQuery, SetOperator};
use crate::reader::{BracketScope, TokenSource};
use crate::table::{
    FunctionTable, LateralTable, PhysicalTable, SelectableTable, Table, VirtualTable,
};
use crate::values::{FunctionValue, ValueCollection};

/// Parse a readable query: SELECT or VALUES, with an optional leading
/// WITH clause. A caller that already consumed a WITH clause passes it in
/// so it can be attached to the SELECT it belongs to.
pub(crate) fn parse_read_query(
    reader: &mut dyn TokenSource,
    with: Option<WithClause>,
) -> Result<ReadQuery> {
    let Some(first) = reader.peek()? else {
        return Err(Error::end_of_input("select or values"));
    };
    let lower = first.to_ascii_lowercase();
    match lower.as_str() {
        "with" if with.is_none() => {
            let with = parse_with_clause(reader)?;
            parse_read_query(reader, Some(with))
        }
        "select" => Ok(ReadQuery::Select(Box::new(parse_select_query(
            reader, with,
        )?))),
        // VALUES has no common-table slot, so a WITH cannot precede it.
        "values" if with.is_none() => Ok(ReadQuery::Values(
            super::dml::parse_values_query(reader)?,
        )),
        _ => Err(Error::syntax("select or values", first)),
    }
}

pub(crate) fn parse_select_query(
    reader: &mut dyn TokenSource,
    with: Option<WithClause>,
) -> Result<SelectQuery> {
    let with = match with {
        Some(with) => Some(with),
        None => {
            if reader.peek_is("with")? {
                Some(parse_with_clause(reader)?)
            } else {
                None
            }
        }
    };

    reader.expect("select")?;
    let distinct = parse_distinct(reader)?;
    let mut items = vec![parse_selectable_item(reader)?];
    while reader.read_if(",")?.is_some() {
        items.push(parse_selectable_item(reader)?);
    }

    let mut query = SelectQuery::new(SelectClause { distinct, items });
    query.with = with;

    if reader.peek_is("from")? {
        query.from = Some(parse_from_clause(reader)?);
    }
    query.where_clause = parse_where_clause(reader)?;
    if reader.read_if("group by")?.is_some() {
        let mut items = vec![parse_value(reader)?];
        while reader.read_if(",")?.is_some() {
            items.push(parse_value(reader)?);
        }
        query.group = Some(GroupClause { items });
    }
    if reader.read_if("having")?.is_some() {
        query.having = Some(HavingClause {
            condition: parse_value(reader)?,
        });
    }
    if reader.peek_is("window")? {
        query.window = Some(parse_window_clause(reader)?);
    }
    if reader.peek_is("order by")? {
        query.order = Some(parse_order_clause(reader)?);
    }
    query.operation = parse_set_operation(reader)?;
    if reader.read_if("limit")?.is_some() {
        let limit = parse_value(reader)?;
        let offset = if reader.read_if("offset")?.is_some() {
            Some(parse_value(reader)?)
        } else {
            None
        };
        query.limit = Some(LimitClause { limit, offset });
    }
    Ok(query)
}

/// A trailing set operation, attached right-recursively: the rest of the
/// chain is parsed as one query and hangs off this link.
pub(crate) fn parse_set_operation(
    reader: &mut dyn TokenSource,
) -> Result<Option<Box<QueryOperation>>> {
    let operator = match reader.peek()? {
        Some(next) => SetOperator::from_keyword(next),
        None => None,
    };
    let Some(operator) = operator else {
        return Ok(None);
    };
    reader.read()?;
    let query = parse_read_query(reader, None)?;
    Ok(Some(Box::new(QueryOperation { operator, query })))
}

fn parse_distinct(reader: &mut dyn TokenSource) -> Result<Option<Distinct>> {
    if reader.read_if("distinct")?.is_none() {
        return Ok(None);
    }
    let mut distinct = Distinct::default();
    if reader.read_if("on")?.is_some() {
        let mut scope = BracketScope::open(reader)?;
        let mut values = vec![parse_value(&mut scope)?];
        while scope.read_if(",")?.is_some() {
            values.push(parse_value(&mut scope)?);
        }
        scope.close()?;
        distinct.on = Some(ValueCollection::new(values));
    }
    Ok(Some(distinct))
}

fn parse_selectable_item(reader: &mut dyn TokenSource) -> Result<SelectableItem> {
    let value = parse_value(reader)?;
    let alias = parse_alias(reader)?;
    Ok(SelectableItem { value, alias })
}

/// An alias after a value or table: `as name`, or a bare name when the
/// next token can serve as an identifier.
pub(crate) fn parse_alias(reader: &mut dyn TokenSource) -> Result<Option<String>> {
    if reader.read_if("as")?.is_some() {
        return identifier(reader, "alias").map(Some);
    }
    if reader.peek()?.is_some_and(can_be_identifier) {
        return Ok(Some(reader.require("alias")?));
    }
    Ok(None)
}

/// Consume a token that must read like a name.
pub(crate) fn identifier(reader: &mut dyn TokenSource, what: &str) -> Result<String> {
    let name = reader.require(what)?;
    if !can_be_identifier(&name) {
        return Err(Error::syntax(what, name));
    }
    Ok(name)
}

pub(crate) fn parse_where_clause(
    reader: &mut dyn TokenSource,
) -> Result<Option<WhereClause>> {
    if reader.read_if("where")?.is_none() {
        return Ok(None);
    }
    Ok(Some(WhereClause::new(parse_value(reader)?)))
}

pub(crate) fn parse_from_clause(reader: &mut dyn TokenSource) -> Result<FromClause> {
    reader.expect("from")?;
    let root = parse_selectable_table(reader)?;
    let mut from = FromClause::new(root);
    loop {
        let join = match reader.peek()? {
            Some(next) => crate::clauses::JoinKind::from_keyword(next),
            None => None,
        };
        let Some(join) = join else {
            return Ok(from);
        };
        reader.read()?;
        let table = parse_selectable_table(reader)?;
        let condition = if reader.read_if("on")?.is_some() {
            Some(parse_value(reader)?)
        } else {
            None
        };
        from.relations.push(Relation {
            join,
            table,
            condition,
        });
    }
}

pub(crate) fn parse_selectable_table(
    reader: &mut dyn TokenSource,
) -> Result<SelectableTable> {
    let table = parse_table(reader)?;
    let alias = parse_alias(reader)?;
    let column_aliases = if alias.is_some() && reader.peek_is("(")? {
        Some(parse_name_list(reader)?)
    } else {
        None
    };
    Ok(SelectableTable {
        table,
        alias,
        column_aliases,
    })
}

fn parse_table(reader: &mut dyn TokenSource) -> Result<Table> {
    if reader.read_if("lateral")?.is_some() {
        let inner = parse_table(reader)?;
        return Ok(Table::Lateral(LateralTable {
            inner: Box::new(inner),
        }));
    }
    if reader.peek_is("(")? {
        let mut scope = BracketScope::open(reader)?;
        let query = parse_read_query(&mut scope, None)?;
        scope.close()?;
        return Ok(Table::Virtual(VirtualTable {
            query: Box::new(query),
        }));
    }

    let name = identifier(reader, "table name")?;
    if reader.read_if(".")?.is_some() {
        let member = identifier(reader, "table name")?;
        if reader.peek_is("(")? {
            return parse_function_table(reader, format!("{name}.{member}"));
        }
        return Ok(Table::Physical(PhysicalTable::qualified(name, member)));
    }
    if reader.peek_is("(")? {
        return parse_function_table(reader, name);
    }
    Ok(Table::Physical(PhysicalTable::new(name)))
}

fn parse_function_table(reader: &mut dyn TokenSource, name: String) -> Result<Table> {
    let args = parse_function_args(reader)?;
    Ok(Table::Function(FunctionTable {
        function: FunctionValue {
            name,
            args,
            filter: None,
            over: None,
        },
    }))
}

/// A schema-qualified table name without alias handling; the target
/// position of INSERT and the DDL statements.
pub(crate) fn parse_physical_table(reader: &mut dyn TokenSource) -> Result<PhysicalTable> {
    let name = identifier(reader, "table name")?;
    if reader.read_if(".")?.is_some() {
        let member = identifier(reader, "table name")?;
        return Ok(PhysicalTable::qualified(name, member));
    }
    Ok(PhysicalTable::new(name))
}

/// A parenthesized, comma-separated list of names.
pub(crate) fn parse_name_list(reader: &mut dyn TokenSource) -> Result<Vec<String>> {
    let mut scope = BracketScope::open(reader)?;
    let mut names = vec![identifier(&mut scope, "name")?];
    while scope.read_if(",")?.is_some() {
        names.push(identifier(&mut scope, "name")?);
    }
    scope.close()?;
    Ok(names)
}

pub(crate) fn parse_with_clause(reader: &mut dyn TokenSource) -> Result<WithClause> {
    reader.expect("with")?;
    let recursive = reader.read_if("recursive")?.is_some();
    let mut tables = vec![parse_common_table(reader)?];
    while reader.read_if(",")?.is_some() {
        tables.push(parse_common_table(reader)?);
    }
    Ok(WithClause { recursive, tables })
}

fn parse_common_table(reader: &mut dyn TokenSource) -> Result<CommonTable> {
    let alias = identifier(reader, "common table alias")?;
    let column_aliases = if reader.peek_is("(")? {
        Some(parse_name_list(reader)?)
    } else {
        None
    };
    reader.expect("as")?;
    let materialization = if reader.read_if("materialized")?.is_some() {
        Some(Materialization::Materialized)
    } else if reader.read_if("not materialized")?.is_some() {
        Some(Materialization::NotMaterialized)
    } else {
        None
    };
    let mut scope = BracketScope::open(reader)?;
    let query = parse_read_query(&mut scope, None)?;
    scope.close()?;
    Ok(CommonTable {
        alias,
        column_aliases,
        materialization,
        query,
    })
}

fn parse_window_clause(reader: &mut dyn TokenSource) -> Result<WindowClause> {
    reader.expect("window")?;
    let mut windows = vec![parse_named_window(reader)?];
    while reader.read_if(",")?.is_some() {
        windows.push(parse_named_window(reader)?);
    }
    Ok(WindowClause { windows })
}

fn parse_named_window(reader: &mut dyn TokenSource) -> Result<NamedWindow> {
    let name = identifier(reader, "window name")?;
    reader.expect("as")?;
    let definition = parse_window_definition(reader)?;
    Ok(NamedWindow { name, definition })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clauses::JoinKind;
    use crate::parser::Parser;
    use crate::reader::TokenReader;
    use crate::tokens::ToTokens;
    use crate::values::ValueKind;

    fn select(sql: &str) -> SelectQuery {
        Parser::parse_select(sql).unwrap()
    }

    #[test]
    fn test_minimal_select() {
        let q = select("select 1");
        assert_eq!(q.select.items.len(), 1);
        assert!(q.from.is_none());
        assert_eq!(q.to_text(), "select 1");
    }

    #[test]
    fn test_clause_order() {
        let q = select(
            "select dept, count(*) from emp where active group by dept \
             having count(*) > 1 order by dept desc limit 5 offset 10",
        );
        assert!(q.where_clause.is_some());
        assert!(q.group.is_some());
        assert!(q.having.is_some());
        assert!(q.order.is_some());
        assert!(q.limit.as_ref().unwrap().offset.is_some());
        assert_eq!(
            q.to_text(),
            "select dept, count(*) from emp where active group by dept \
             having count(*) > 1 order by dept desc limit 5 offset 10"
        );
    }

    #[test]
    fn test_aliases_explicit_and_implicit() {
        let q = select("select a.id as i, a.name n from users a");
        assert_eq!(q.select.items[0].alias.as_deref(), Some("i"));
        assert_eq!(q.select.items[1].alias.as_deref(), Some("n"));
        assert_eq!(q.from.unwrap().root.alias.as_deref(), Some("a"));
    }

    #[test]
    fn test_join_parsing() {
        let q = select("select * from a left outer join b on a.id = b.id inner join c on c.x = 1");
        let from = q.from.unwrap();
        assert_eq!(from.relations.len(), 2);
        assert_eq!(from.relations[0].join, JoinKind::Left);
        assert_eq!(from.relations[1].join, JoinKind::Inner);
        assert!(from.relations[0].condition.is_some());
    }

    #[test]
    fn test_left_function_not_join() {
        let q = select("select left(x, 1) from t");
        let ValueKind::Function(f) = &q.select.items[0].value.kind else {
            panic!("expected function");
        };
        assert_eq!(f.name, "left");
        assert_eq!(f.args.len(), 2);
    }

    #[test]
    fn test_subquery_in_from() {
        let q = select("select * from (select id from t) as s");
        let from = q.from.unwrap();
        assert!(matches!(from.root.table, Table::Virtual(_)));
        assert_eq!(from.root.alias.as_deref(), Some("s"));
    }

    #[test]
    fn test_function_and_lateral_tables() {
        let q = select("select * from generate_series(1, 3) as g cross join lateral f(g.x) t");
        let from = q.from.unwrap();
        assert!(matches!(from.root.table, Table::Function(_)));
        assert!(matches!(from.relations[0].table.table, Table::Lateral(_)));
    }

    #[test]
    fn test_with_clause() {
        let q = select("with t (a, b) as materialized (select 1, 2) select * from t");
        let with = q.with.unwrap();
        assert!(!with.recursive);
        let cte = with.find("T").unwrap();
        assert_eq!(cte.column_aliases.as_deref(), Some(&["a".to_string(), "b".to_string()][..]));
        assert_eq!(cte.materialization, Some(Materialization::Materialized));
    }

    #[test]
    fn test_recursive_with() {
        let q = select(
            "with recursive r as (select 1 as n union all select n + 1 from r) select n from r",
        );
        assert!(q.with.unwrap().recursive);
    }

    #[test]
    fn test_set_operations_right_recursive() {
        let q = select("select a from t1 union select b from t2 union all select c from t3");
        let first = q.operation.as_ref().unwrap();
        assert_eq!(first.operator, SetOperator::Union);
        let ReadQuery::Select(second) = &first.query else {
            panic!("expected select");
        };
        assert_eq!(
            second.operation.as_ref().unwrap().operator,
            SetOperator::UnionAll
        );
    }

    #[test]
    fn test_distinct_on() {
        let q = select("select distinct on (dept) dept, salary from emp");
        let distinct = q.select.distinct.unwrap();
        assert_eq!(distinct.on.unwrap().len(), 1);
    }

    #[test]
    fn test_window_clause() {
        let q = select("select sum(x) over w from t window w as (partition by a order by b)");
        let window = q.window.unwrap();
        assert_eq!(window.windows[0].name, "w");
        assert!(window.windows[0].definition.partition_by.is_some());
    }

    #[test]
    fn test_missing_close_paren() {
        let err = Parser::parse_select("select * from a where (a.id = 1").unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
    }

    #[test]
    fn test_bracket_depth_returns_to_zero() {
        let mut reader = TokenReader::new(
            "select (select count(*) from (select 1) q) from t where (a = (1))",
        );
        parse_select_query(&mut reader, None).unwrap();
        assert_eq!(reader.bracket_depth(), 0);
    }
}
