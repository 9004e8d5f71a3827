//! Structural parser tests
//!
//! Assertions on the shape of parsed trees rather than on re-serialized
//! text: clause contents, join kinds, CTE resolution, keyword-merge
//! disambiguation, and multi-statement iteration.

use requel_sql::{
    JoinKind, Parser, Query, ReadQuery, Table, ToTokens, ValueKind,
};

#[test]
fn test_select_structure() {
    let q = Parser::parse_select("select a.id, a.name from users as a where a.id = 1").unwrap();

    assert_eq!(q.select.items.len(), 2);
    let ValueKind::Column(first) = &q.select.items[0].value.kind else {
        panic!("expected column");
    };
    assert_eq!(first.qualifiers, vec!["a"]);
    assert_eq!(first.name, "id");

    let from = q.from.as_ref().unwrap();
    let Table::Physical(root) = &from.root.table else {
        panic!("expected physical table");
    };
    assert_eq!(root.name, "users");
    assert_eq!(from.root.alias.as_deref(), Some("a"));

    let where_clause = q.where_clause.as_ref().unwrap();
    assert_eq!(where_clause.condition.to_text(), "a.id = 1");
}

#[test]
fn test_common_table_resolution_by_alias() {
    let q = Parser::parse_select("with t as (select 1 as x) select t.x from t").unwrap();
    let with = q.with.as_ref().unwrap();
    assert_eq!(with.tables.len(), 1);
    // Lookup is by alias text, case-insensitively.
    assert!(with.find("t").is_some());
    assert!(with.find("T").is_some());
    assert!(with.find("u").is_none());

    // The FROM clause refers to the CTE by name, as a physical table.
    let from = q.from.as_ref().unwrap();
    assert_eq!(from.root.reference_name(), Some("t"));
}

#[test]
fn test_join_structure() {
    let q = Parser::parse_select("select * from a left join b on a.id = b.id").unwrap();
    let from = q.from.as_ref().unwrap();
    assert_eq!(from.relations.len(), 1);
    let relation = &from.relations[0];
    assert_eq!(relation.join, JoinKind::Left);
    assert_eq!(relation.condition.as_ref().unwrap().to_text(), "a.id = b.id");
}

#[test]
fn test_left_outer_and_left_join_agree() {
    let outer = Parser::parse_select("select * from a left outer join b on a.id = b.id").unwrap();
    let plain = Parser::parse_select("select * from a left join b on a.id = b.id").unwrap();
    assert_eq!(
        outer.from.as_ref().unwrap().relations[0].join,
        plain.from.as_ref().unwrap().relations[0].join
    );
}

#[test]
fn test_left_parenthesis_means_scalar_function() {
    let q = Parser::parse_select("select left(x, 1) from t").unwrap();
    let ValueKind::Function(f) = &q.select.items[0].value.kind else {
        panic!("expected function, left was read as a join keyword");
    };
    assert_eq!(f.name, "left");
    assert_eq!(f.args.len(), 2);
}

#[test]
fn test_create_table_structure() {
    let q = Parser::parse_create_table(
        "create table x (id integer primary key, name text not null)",
    )
    .unwrap();
    let definition = q.definition.as_ref().unwrap();
    assert_eq!(definition.columns().count(), 2);
    let id = definition.find_column("id").unwrap();
    assert_eq!(id.type_name.name, "integer");
    assert_eq!(
        id.constraints,
        vec![requel_sql::ColumnConstraint::PrimaryKey]
    );
    let name = definition.find_column("name").unwrap();
    assert_eq!(
        name.constraints,
        vec![requel_sql::ColumnConstraint::NotNull]
    );
}

#[test]
fn test_multi_statement_stream() {
    let statements = Parser::parse_statements("select 1; select 2;").unwrap();
    assert_eq!(statements.len(), 2);
    assert_eq!(statements[0].to_text(), "select 1");
    assert_eq!(statements[1].to_text(), "select 2");
}

#[test]
fn test_statement_stream_mixed_kinds() {
    let statements = Parser::parse_statements(
        "create table t (a integer); insert into t values (1); select a from t",
    )
    .unwrap();
    assert_eq!(statements.len(), 3);
    assert!(matches!(statements[0], Query::CreateTable(_)));
    assert!(matches!(statements[1], Query::Insert(_)));
    assert!(matches!(statements[2], Query::Select(_)));
}

#[test]
fn test_empty_script_yields_no_statements() {
    assert!(Parser::parse_statements("").unwrap().is_empty());
    assert!(Parser::parse_statements(" ; ").unwrap().is_empty());
    assert!(Parser::parse_statements("-- only a comment\n").unwrap().is_empty());
}

#[test]
fn test_semicolon_inside_string_does_not_terminate() {
    let statements = Parser::parse_statements("select 'a;b'; select 2").unwrap();
    assert_eq!(statements.len(), 2);
    assert_eq!(statements[0].to_text(), "select 'a;b'");
}

#[test]
fn test_operator_chain_shape() {
    let q = Parser::parse_select("select a + b * c from t").unwrap();
    let value = &q.select.items[0].value;
    // Flat, right-linked, input order; no precedence tree.
    let first = value.next.as_ref().unwrap();
    assert_eq!(first.operator, "+");
    let second = first.value.next.as_ref().unwrap();
    assert_eq!(second.operator, "*");
    assert!(second.value.next.is_none());
}

#[test]
fn test_set_operation_chain_shape() {
    let q = Parser::parse_select("select a from t1 union select a from t2 except select a from t3")
        .unwrap();
    let first = q.operation.as_ref().unwrap();
    assert_eq!(first.operator, requel_sql::SetOperator::Union);
    let ReadQuery::Select(second) = &first.query else {
        panic!("expected select");
    };
    assert_eq!(
        second.operation.as_ref().unwrap().operator,
        requel_sql::SetOperator::Except
    );
}

#[test]
fn test_insert_with_hoisting() {
    let Query::Insert(insert) =
        Parser::parse("with src as (select 1 as a) insert into t select a from src").unwrap()
    else {
        panic!("expected insert");
    };
    let ReadQuery::Select(source) = &insert.source else {
        panic!("expected select source");
    };
    let with = source.with.as_ref().unwrap();
    assert!(with.find("src").is_some());
}

#[test]
fn test_subquery_values_as_value() {
    let q = Parser::parse_select("select (select max(x) from t) from u").unwrap();
    assert!(matches!(q.select.items[0].value.kind, ValueKind::Query(_)));

    let q = Parser::parse_select("select * from t where (a, b) in (select a, b from u)").unwrap();
    let ValueKind::In(in_expr) = &q.where_clause.as_ref().unwrap().condition.kind else {
        panic!("expected in");
    };
    assert!(matches!(in_expr.value.kind, ValueKind::Bracket(_)));
    assert!(matches!(in_expr.argument.kind, ValueKind::Query(_)));
}

#[test]
fn test_parameters() {
    let q = Parser::parse_select("select * from t where a = :a and b = @b and c = ? and d = $1")
        .unwrap();
    let text = q.to_text();
    assert_eq!(
        text,
        "select * from t where a = :a and b = @b and c = ? and d = $1"
    );
}

#[test]
fn test_token_parent_chain_is_traceable() {
    let q = Parser::parse_select("select a from t where b = 1").unwrap();
    let tokens: Vec<_> = q.to_tokens(None).collect();
    // Every token except the clause keywords hangs off a structural token.
    let b = tokens.iter().find(|t| t.text() == "b").unwrap();
    assert_eq!(b.parent().unwrap().text(), "where");
    assert!(tokens.iter().any(|t| t.is_reserved() && t.text() == "select"));
}

#[test]
fn test_statement_editing_after_parse() {
    let mut q = Parser::parse_select("select id from users").unwrap();
    q.push_select(requel_sql::SelectableItem::aliased(
        requel_sql::Value::column("name"),
        "n",
    ));
    q.and_where(
        requel_sql::Value::column("active").chain("=", requel_sql::Value::literal("true")),
    );
    q.and_where(requel_sql::Value::column("verified"));
    q.set_limit(requel_sql::Value::literal("10"), None);
    assert_eq!(
        q.to_text(),
        "select id, name as n from users where active = true and verified limit 10"
    );
}
