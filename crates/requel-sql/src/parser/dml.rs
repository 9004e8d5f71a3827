//! INSERT, UPDATE, DELETE, and VALUES parsing
//!
//! INSERT deserves a note: it has no common-table slot of its own, so a
//! WITH clause read before the statement is handed down here and hoisted
//! into the nested SELECT source. When the source is VALUES there is
//! nowhere to hoist to and the WITH is a syntax error.

use crate::clauses::{ReturningClause, SetClause, SetItem, UsingClause, WithClause};
use crate::error::Result;
use crate::parser::select::{
    identifier, parse_from_clause, parse_name_list, parse_physical_table, parse_read_query,
    parse_selectable_table, parse_set_operation, parse_where_clause,
};
use crate::parser::value::parse_value;
use crate::queries::{DeleteQuery, InsertQuery, UpdateQuery, ValuesQuery};
use crate::reader::{BracketScope, TokenSource};
use crate::values::{ColumnValue, ValueCollection};

pub(crate) fn parse_values_query(reader: &mut dyn TokenSource) -> Result<ValuesQuery> {
    reader.expect("values")?;
    let mut rows = vec![parse_row(reader)?];
    while reader.read_if(",")?.is_some() {
        rows.push(parse_row(reader)?);
    }
    let mut query = ValuesQuery::new(rows);
    query.operation = parse_set_operation(reader)?;
    Ok(query)
}

fn parse_row(reader: &mut dyn TokenSource) -> Result<ValueCollection> {
    let mut scope = BracketScope::open(reader)?;
    let mut values = vec![parse_value(&mut scope)?];
    while scope.read_if(",")?.is_some() {
        values.push(parse_value(&mut scope)?);
    }
    scope.close()?;
    Ok(ValueCollection::new(values))
}

pub(crate) fn parse_insert_query(
    reader: &mut dyn TokenSource,
    with: Option<WithClause>,
) -> Result<InsertQuery> {
    reader.expect("insert")?;
    reader.expect("into")?;
    let target = parse_physical_table(reader)?;
    let columns = if reader.peek_is("(")? {
        parse_name_list(reader)?
    } else {
        Vec::new()
    };
    let source = parse_read_query(reader, with)?;
    let returning = parse_returning_clause(reader)?;
    Ok(InsertQuery {
        target,
        columns,
        source,
        returning,
    })
}

pub(crate) fn parse_update_query(
    reader: &mut dyn TokenSource,
    with: Option<WithClause>,
) -> Result<UpdateQuery> {
    reader.expect("update")?;
    let target = parse_selectable_table(reader)?;
    let set = parse_set_clause(reader)?;
    let from = if reader.peek_is("from")? {
        Some(parse_from_clause(reader)?)
    } else {
        None
    };
    let where_clause = parse_where_clause(reader)?;
    let returning = parse_returning_clause(reader)?;
    Ok(UpdateQuery {
        with,
        target,
        set,
        from,
        where_clause,
        returning,
    })
}

pub(crate) fn parse_delete_query(
    reader: &mut dyn TokenSource,
    with: Option<WithClause>,
) -> Result<DeleteQuery> {
    reader.expect("delete")?;
    reader.expect("from")?;
    let target = parse_selectable_table(reader)?;
    let using = if reader.read_if("using")?.is_some() {
        let mut tables = vec![parse_selectable_table(reader)?];
        while reader.read_if(",")?.is_some() {
            tables.push(parse_selectable_table(reader)?);
        }
        Some(UsingClause { tables })
    } else {
        None
    };
    let where_clause = parse_where_clause(reader)?;
    let returning = parse_returning_clause(reader)?;
    Ok(DeleteQuery {
        with,
        target,
        using,
        where_clause,
        returning,
    })
}

fn parse_set_clause(reader: &mut dyn TokenSource) -> Result<SetClause> {
    reader.expect("set")?;
    let mut items = vec![parse_set_item(reader)?];
    while reader.read_if(",")?.is_some() {
        items.push(parse_set_item(reader)?);
    }
    Ok(SetClause { items })
}

fn parse_set_item(reader: &mut dyn TokenSource) -> Result<SetItem> {
    let mut name = identifier(reader, "column name")?;
    let mut qualifiers = Vec::new();
    while reader.read_if(".")?.is_some() {
        let part = identifier(reader, "column name")?;
        qualifiers.push(std::mem::replace(&mut name, part));
    }
    reader.expect("=")?;
    let value = parse_value(reader)?;
    Ok(SetItem {
        column: ColumnValue { qualifiers, name },
        value,
    })
}

fn parse_returning_clause(
    reader: &mut dyn TokenSource,
) -> Result<Option<ReturningClause>> {
    if reader.read_if("returning")?.is_none() {
        return Ok(None);
    }
    let mut values = vec![parse_value(reader)?];
    while reader.read_if(",")?.is_some() {
        values.push(parse_value(reader)?);
    }
    Ok(Some(ReturningClause {
        items: ValueCollection::new(values),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::parser::Parser;
    use crate::queries::ReadQuery;
    use crate::tokens::ToTokens;

    #[test]
    fn test_insert_values() {
        let q = Parser::parse_insert("insert into t (a, b) values (1, 2), (3, 4)").unwrap();
        assert_eq!(q.columns, vec!["a", "b"]);
        let ReadQuery::Values(v) = &q.source else {
            panic!("expected values source");
        };
        assert_eq!(v.rows.len(), 2);
        assert_eq!(q.to_text(), "insert into t(a, b) values (1, 2), (3, 4)");
    }

    #[test]
    fn test_insert_select_with_hoisted_cte() {
        let q = Parser::parse("with src as (select 1 as a) insert into t select a from src")
            .unwrap();
        let crate::queries::Query::Insert(insert) = q else {
            panic!("expected insert");
        };
        let ReadQuery::Select(select) = &insert.source else {
            panic!("expected select source");
        };
        // The statement-level WITH lands on the nested SELECT.
        assert!(select.with.is_some());
    }

    #[test]
    fn test_insert_with_values_source_is_rejected() {
        let err =
            Parser::parse("with src as (select 1) insert into t values (1)").unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
    }

    #[test]
    fn test_insert_returning() {
        let q = Parser::parse_insert("insert into t values (1) returning id").unwrap();
        assert_eq!(q.returning.unwrap().items.len(), 1);
    }

    #[test]
    fn test_update() {
        let q = Parser::parse_update(
            "update t set a = 1, t.b = b + 1 from u where t.id = u.id returning t.a",
        )
        .unwrap();
        assert_eq!(q.set.items.len(), 2);
        assert_eq!(q.set.items[1].column.qualifiers, vec!["t"]);
        assert!(q.from.is_some());
        assert!(q.where_clause.is_some());
        assert_eq!(
            q.to_text(),
            "update t set a = 1, t.b = b + 1 from u where t.id = u.id returning t.a"
        );
    }

    #[test]
    fn test_delete_using() {
        let q = Parser::parse_delete(
            "delete from t using u, v where t.id = u.id returning t.id",
        )
        .unwrap();
        assert_eq!(q.using.unwrap().tables.len(), 2);
        assert!(q.returning.is_some());
    }

    #[test]
    fn test_values_with_set_operation() {
        let q = Parser::parse_values("values (1) union all values (2)").unwrap();
        assert!(q.operation.is_some());
        assert_eq!(q.to_text(), "values (1) union all values (2)");
    }

    #[test]
    fn test_update_where_and_builder() {
        let mut q = Parser::parse_update("update t set a = 1").unwrap();
        q.and_where(crate::values::Value::column("b"));
        assert_eq!(q.to_text(), "update t set a = 1 where b");
    }
}
