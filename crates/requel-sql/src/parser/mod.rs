//! Statement and expression parsers
//!
//! One parser function per grammar production, composed recursively over a
//! [`TokenSource`]. The split mirrors the grammar: `value` for the value
//! expression grammar, `select` for SELECT and its clauses, `dml` for
//! INSERT/UPDATE/DELETE/VALUES, `ddl` for CREATE and ALTER.
//!
//! Every entry point parses a complete statement and then verifies that
//! nothing remains: trailing unconsumed tokens are an error, never
//! silently dropped. A returned AST is therefore a faithful parse of the
//! whole input.

pub(crate) mod ddl;
pub(crate) mod dml;
pub(crate) mod select;
pub(crate) mod value;

use crate::clauses::WithClause;
use crate::ddl::{AlterTableQuery, CreateIndexQuery, CreateTableQuery};
use crate::error::{Error, Result};
use crate::queries::{
    DeleteQuery, InsertQuery, Query, SelectQuery, UpdateQuery, ValuesQuery,
};
use crate::reader::{StatementReader, TokenReader, TokenSource};

/// Keywords that end a value or alias position. The list holds the merged
/// forms the token reader produces.
const BOUNDARY_KEYWORDS: &[&str] = &[
    "select", "from", "where", "group by", "having", "window", "order by", "limit",
    "offset", "union", "union all", "except", "intersect", "minus", "returning", "on",
    "using", "set", "as", "join", "inner join", "cross join", "left join",
    "left outer join", "right join", "right outer join", "when", "then", "else", "end",
    "and", "or", "not", "asc", "desc", "nulls first", "nulls last", "filter", "over",
    "by", "values", "insert", "into", "update", "delete", "create", "alter", "with",
    "case", "between", "like", "in", "exists", "is", "distinct", "lateral",
    "at time zone", "materialized", "not materialized",
];

pub(crate) fn is_boundary_keyword(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    BOUNDARY_KEYWORDS.contains(&lower.as_str()) || lower.starts_with("is ")
}

/// Whether a token can serve as an implicit alias or identifier: it must
/// read like a name and not be a clause keyword.
pub(crate) fn can_be_identifier(token: &str) -> bool {
    if is_boundary_keyword(token) {
        return false;
    }
    token
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || matches!(c, '_' | '"' | '`' | '[' | '&'))
}

/// Parser entry points, one per statement kind plus a generic dispatcher.
pub struct Parser;

impl Parser {
    /// Parse a single statement of any kind, dispatching on the leading
    /// keyword.
    pub fn parse(sql: &str) -> Result<Query> {
        Self::complete(sql, parse_query)
    }

    /// Parse a `;`-separated script into its statements, in order. A lone
    /// trailing `;` yields no further statement.
    pub fn parse_statements(sql: &str) -> Result<Vec<Query>> {
        let mut stream = StatementReader::new(sql);
        let mut statements = Vec::new();
        while stream.has_next()? {
            let query = parse_query(stream.reader())?;
            finish(stream.reader())?;
            statements.push(query);
        }
        Ok(statements)
    }

    pub fn parse_select(sql: &str) -> Result<SelectQuery> {
        Self::complete(sql, |r| select::parse_select_query(r, None))
    }

    pub fn parse_values(sql: &str) -> Result<ValuesQuery> {
        Self::complete(sql, dml::parse_values_query)
    }

    pub fn parse_insert(sql: &str) -> Result<InsertQuery> {
        Self::complete(sql, |r| dml::parse_insert_query(r, None))
    }

    pub fn parse_update(sql: &str) -> Result<UpdateQuery> {
        Self::complete(sql, |r| dml::parse_update_query(r, None))
    }

    pub fn parse_delete(sql: &str) -> Result<DeleteQuery> {
        Self::complete(sql, |r| dml::parse_delete_query(r, None))
    }

    pub fn parse_create_table(sql: &str) -> Result<CreateTableQuery> {
        Self::complete(sql, |r| match ddl::parse_create_query(r)? {
            Query::CreateTable(q) => Ok(q),
            other => Err(Error::syntax("create table", statement_name(&other))),
        })
    }

    pub fn parse_create_index(sql: &str) -> Result<CreateIndexQuery> {
        Self::complete(sql, |r| match ddl::parse_create_query(r)? {
            Query::CreateIndex(q) => Ok(q),
            other => Err(Error::syntax("create index", statement_name(&other))),
        })
    }

    pub fn parse_alter_table(sql: &str) -> Result<AlterTableQuery> {
        Self::complete(sql, ddl::parse_alter_table_query)
    }

    fn complete<T>(
        sql: &str,
        parse: impl FnOnce(&mut dyn TokenSource) -> Result<T>,
    ) -> Result<T> {
        let mut reader = TokenReader::new(sql);
        let parsed = parse(&mut reader)?;
        finish(&mut reader)?;
        Ok(parsed)
    }
}

fn statement_name(query: &Query) -> &'static str {
    match query {
        Query::Select(_) => "select",
        Query::Values(_) => "values",
        Query::Insert(_) => "insert",
        Query::Update(_) => "update",
        Query::Delete(_) => "delete",
        Query::CreateTable(_) => "create table",
        Query::AlterTable(_) => "alter table",
        Query::CreateIndex(_) => "create index",
    }
}

/// Verify the statement consumed its entire input.
fn finish(reader: &mut TokenReader) -> Result<()> {
    match reader.peek()? {
        Some(token) => Err(Error::syntax("end of statement", token)),
        None => Ok(()),
    }
}

/// Dispatch on the leading keyword. A leading WITH is parsed first and
/// handed to whichever statement follows it.
pub(crate) fn parse_query(reader: &mut dyn TokenSource) -> Result<Query> {
    let Some(first) = reader.peek()? else {
        return Err(Error::end_of_input("statement"));
    };
    let lower = first.to_ascii_lowercase();
    match lower.as_str() {
        "with" => {
            let with = select::parse_with_clause(reader)?;
            dispatch_after_with(reader, with)
        }
        "select" => Ok(Query::Select(select::parse_select_query(reader, None)?)),
        "values" => Ok(Query::Values(dml::parse_values_query(reader)?)),
        "insert" => Ok(Query::Insert(dml::parse_insert_query(reader, None)?)),
        "update" => Ok(Query::Update(dml::parse_update_query(reader, None)?)),
        "delete" => Ok(Query::Delete(dml::parse_delete_query(reader, None)?)),
        "create" => ddl::parse_create_query(reader),
        "alter" => Ok(Query::AlterTable(ddl::parse_alter_table_query(reader)?)),
        _ => Err(Error::syntax("statement keyword", first)),
    }
}

fn dispatch_after_with(reader: &mut dyn TokenSource, with: WithClause) -> Result<Query> {
    let Some(next) = reader.peek()? else {
        return Err(Error::end_of_input("select, insert, update or delete"));
    };
    match next.to_ascii_lowercase().as_str() {
        "select" => Ok(Query::Select(select::parse_select_query(
            reader,
            Some(with),
        )?)),
        "insert" => Ok(Query::Insert(dml::parse_insert_query(reader, Some(with))?)),
        "update" => Ok(Query::Update(dml::parse_update_query(reader, Some(with))?)),
        "delete" => Ok(Query::Delete(dml::parse_delete_query(reader, Some(with))?)),
        _ => Err(Error::syntax("select, insert, update or delete", next)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_classification() {
        assert!(can_be_identifier("users"));
        assert!(can_be_identifier("\"my table\""));
        assert!(can_be_identifier("&lit"));
        assert!(!can_be_identifier("where"));
        assert!(!can_be_identifier("left join"));
        assert!(!can_be_identifier("1x"));
        assert!(!can_be_identifier("is not distinct from"));
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let err = Parser::parse("select 1 from t extra junk").unwrap_err();
        assert!(err.to_string().contains("end of statement"));
    }

    #[test]
    fn test_dispatcher_covers_statement_kinds() {
        assert!(matches!(
            Parser::parse("select 1").unwrap(),
            Query::Select(_)
        ));
        assert!(matches!(
            Parser::parse("values (1)").unwrap(),
            Query::Values(_)
        ));
        assert!(matches!(
            Parser::parse("insert into t values (1)").unwrap(),
            Query::Insert(_)
        ));
        assert!(matches!(
            Parser::parse("update t set a = 1").unwrap(),
            Query::Update(_)
        ));
        assert!(matches!(
            Parser::parse("delete from t").unwrap(),
            Query::Delete(_)
        ));
        assert!(matches!(
            Parser::parse("create table t (id integer)").unwrap(),
            Query::CreateTable(_)
        ));
        assert!(matches!(
            Parser::parse("create index on t (id)").unwrap(),
            Query::CreateIndex(_)
        ));
        assert!(matches!(
            Parser::parse("alter table t add column x integer").unwrap(),
            Query::AlterTable(_)
        ));
    }

    #[test]
    fn test_unknown_statement_keyword() {
        let err = Parser::parse("explain select 1").unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
    }
}
