//! Serde round-trip tests
//!
//! Every AST node derives Serialize/Deserialize; a parsed tree must
//! survive a JSON round trip structurally intact and re-serialize to the
//! same SQL.

use requel_sql::{Parser, Query, SelectQuery, ToTokens};

fn json_roundtrip_select(sql: &str) {
    let parsed = Parser::parse_select(sql).unwrap();
    let json = serde_json::to_string(&parsed).unwrap();
    let restored: SelectQuery = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, restored, "JSON round-trip changed the AST for: {sql}");
    assert_eq!(parsed.to_text(), restored.to_text());
}

#[test]
fn test_select_json_roundtrip() {
    json_roundtrip_select("select a.id, count(*) as n from users as a left join orders o on o.user_id = a.id where a.active group by a.id having count(*) > 1 order by n desc limit 10");
}

#[test]
fn test_subquery_and_case_json_roundtrip() {
    json_roundtrip_select(
        "select case when x in (select x from u) then 'in' else 'out' end from t",
    );
}

#[test]
fn test_query_enum_json_roundtrip() {
    for sql in [
        "select 1",
        "values (1, 2)",
        "insert into t(a) values (1)",
        "update t set a = 1 where b = 2",
        "delete from t where a = 1",
        "create table t(a integer primary key)",
        "alter table t add column b text",
        "create index ix on t(a)",
    ] {
        let parsed = Parser::parse(sql).unwrap();
        let json = serde_json::to_string(&parsed).unwrap();
        let restored: Query = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, restored, "JSON round-trip changed the AST for: {sql}");
    }
}

#[test]
fn test_defaults_are_omitted_from_json() {
    let parsed = Parser::parse_select("select 1").unwrap();
    let json = serde_json::to_string(&parsed).unwrap();
    // Absent clauses are skipped, keeping the serialized form small.
    assert!(!json.contains("where_clause"));
    assert!(!json.contains("operation"));
}
