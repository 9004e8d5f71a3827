//! Value expression parsing
//!
//! Grammar, informally:
//!
//! ```text
//! value   := core (operator value)?      // right-linked, order-preserving
//! core    := primary suffix*
//! suffix  := ['not'] ('between' atom 'and' atom | 'like' atom | 'in' '(' ... ')')
//!          | '::' type
//! primary := literal | '(' value-or-query ')' | case | exists | 'not' core
//!          | qualified_name ['(' args ')'] | parameter | array | cast | interval
//! ```
//!
//! A BETWEEN/LIKE/IN suffix binds to the immediately preceding primary and
//! is checked before any trailing binary operator is consumed. The binary
//! operator chain records operators in input order and never resolves
//! precedence.

use crate::clauses::{OrderClause, SortableItem};
use crate::error::{Error, Result};
use crate::parser::select::parse_select_query;
use crate::parser::{is_boundary_keyword, select::parse_read_query};
use crate::reader::{BracketScope, TokenSource};
use crate::tokens::ToTokens;
use crate::values::{
    BetweenExpression, CaseExpression, CastStyle, CastValue, ColumnValue, ExistsExpression,
    FunctionValue, InExpression, LikeExpression, TypeName, Value, ValueCollection, ValueKind,
    WhenBranch, WindowDefinition, WindowReference,
};

/// Tokens that continue an operator chain: symbolic operators plus the
/// word operators `and`, `or`, `at time zone`, and the `is` family.
fn is_chain_operator(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    if matches!(lower.as_str(), "and" | "or" | "at time zone" | "is") || lower.starts_with("is ")
    {
        return true;
    }
    !token.is_empty()
        && token.chars().all(|c| {
            matches!(
                c,
                '+' | '-' | '*' | '/' | '%' | '<' | '>' | '!' | '=' | '|' | '&' | '^' | '~' | '#'
            )
        })
}

/// Parse a full value expression including its operator chain.
pub(crate) fn parse_value(reader: &mut dyn TokenSource) -> Result<Value> {
    let mut value = parse_value_core(reader)?;
    if let Some(next) = reader.peek()? {
        if is_chain_operator(next) {
            let operator = reader.require("operator")?;
            let rest = parse_value(reader)?;
            value = value.chain(operator, rest);
        }
    }
    Ok(value)
}

/// Parse a primary with its suffixes but no operator chain.
fn parse_value_core(reader: &mut dyn TokenSource) -> Result<Value> {
    let mut value = parse_primary(reader)?;
    loop {
        let Some(next) = reader.peek()? else {
            return Ok(value);
        };
        match next.to_ascii_lowercase().as_str() {
            "::" => {
                reader.read()?;
                let type_name = parse_type_name(reader)?;
                value = Value::new(ValueKind::Cast(Box::new(CastValue {
                    value,
                    type_name,
                    style: CastStyle::DoubleColon,
                })));
            }
            "between" => value = parse_between_suffix(reader, value, false)?,
            "like" => value = parse_like_suffix(reader, value, false)?,
            "in" => value = parse_in_suffix(reader, value, false)?,
            "not" => {
                // Two tokens decide whether `not` negates a suffix here or
                // belongs to the caller (`not null` in a column definition,
                // `not materialized` ahead of a CTE body). The second look
                // uses the reader's single rollback slot.
                reader.read()?;
                let kind = reader.peek()?.map(str::to_ascii_lowercase);
                value = match kind.as_deref() {
                    Some("between") => parse_between_suffix(reader, value, true)?,
                    Some("like") => parse_like_suffix(reader, value, true)?,
                    Some("in") => parse_in_suffix(reader, value, true)?,
                    _ => {
                        reader.rollback()?;
                        return Ok(value);
                    }
                };
            }
            _ => return Ok(value),
        }
    }
}

/// Parse a primary with cast suffixes only; used for the operands of
/// BETWEEN and LIKE, whose grammar forbids a full chain (BETWEEN's `and`
/// would otherwise be consumed as a chain operator).
fn parse_value_atom(reader: &mut dyn TokenSource) -> Result<Value> {
    let mut value = parse_primary(reader)?;
    while reader.read_if("::")?.is_some() {
        let type_name = parse_type_name(reader)?;
        value = Value::new(ValueKind::Cast(Box::new(CastValue {
            value,
            type_name,
            style: CastStyle::DoubleColon,
        })));
    }
    Ok(value)
}

fn parse_between_suffix(
    reader: &mut dyn TokenSource,
    value: Value,
    negated: bool,
) -> Result<Value> {
    reader.expect("between")?;
    let lower = parse_value_atom(reader)?;
    reader.expect("and")?;
    let upper = parse_value_atom(reader)?;
    Ok(Value::new(ValueKind::Between(Box::new(BetweenExpression {
        value,
        negated,
        lower,
        upper,
    }))))
}

fn parse_like_suffix(
    reader: &mut dyn TokenSource,
    value: Value,
    negated: bool,
) -> Result<Value> {
    reader.expect("like")?;
    let pattern = parse_value_atom(reader)?;
    Ok(Value::new(ValueKind::Like(Box::new(LikeExpression {
        value,
        negated,
        pattern,
    }))))
}

fn parse_in_suffix(
    reader: &mut dyn TokenSource,
    value: Value,
    negated: bool,
) -> Result<Value> {
    reader.expect("in")?;
    let argument = parse_bracket_value(reader)?;
    Ok(Value::new(ValueKind::In(Box::new(InExpression {
        value,
        negated,
        argument,
    }))))
}

fn parse_primary(reader: &mut dyn TokenSource) -> Result<Value> {
    let Some(first) = reader.peek()?.map(str::to_owned) else {
        return Err(Error::end_of_input("value"));
    };
    let lower = first.to_ascii_lowercase();

    match lower.as_str() {
        "(" => return parse_bracket_value(reader),
        "case" => {
            reader.read()?;
            return parse_case_tail(reader);
        }
        "exists" => {
            reader.read()?;
            return parse_exists_tail(reader, false);
        }
        "not" => {
            reader.read()?;
            return parse_negated_primary(reader);
        }
        "array" => {
            reader.read()?;
            return parse_array_tail(reader);
        }
        "interval" => {
            reader.read()?;
            let literal = reader.require("interval literal")?;
            if !literal.starts_with('\'') {
                return Err(Error::syntax("interval literal", literal));
            }
            return Ok(Value::literal(format!("{first} {literal}")));
        }
        "cast" => {
            reader.read()?;
            let mut scope = BracketScope::open(reader)?;
            let value = parse_value(&mut scope)?;
            scope.expect("as")?;
            let type_name = parse_type_name(&mut scope)?;
            scope.close()?;
            return Ok(Value::new(ValueKind::Cast(Box::new(CastValue {
                value,
                type_name,
                style: CastStyle::Function,
            }))));
        }
        "null" | "true" | "false" => {
            reader.read()?;
            return Ok(Value::literal(first));
        }
        "*" => {
            reader.read()?;
            return Ok(Value::column("*"));
        }
        _ => {}
    }

    let head = first.chars().next().unwrap_or('\0');
    if head.is_ascii_digit() || head == '\'' {
        reader.read()?;
        return Ok(Value::literal(first));
    }
    if head == '$' {
        reader.read()?;
        // $1 and ${name} are placeholders; $tag$...$tag$ is a string.
        let second = first.chars().nth(1).unwrap_or('\0');
        if second.is_ascii_digit() || second == '{' {
            return Ok(Value::parameter(first));
        }
        return Ok(Value::literal(first));
    }
    if matches!(head, ':' | '@' | '?') {
        reader.read()?;
        return Ok(Value::parameter(first));
    }
    if matches!(head, '+' | '-') && first.len() == 1 {
        reader.read()?;
        let number = reader.require("numeric literal")?;
        if !number.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return Err(Error::syntax("numeric literal", number));
        }
        return Ok(Value::literal(format!("{first}{number}")));
    }
    if is_boundary_keyword(&first) || !super::can_be_identifier(&first) {
        return Err(Error::syntax("value", first));
    }

    parse_name_or_function(reader)
}

/// A leading `not` is valid only when the value it precedes ends in a
/// negatable shape: BETWEEN, LIKE, IN, or EXISTS.
fn parse_negated_primary(reader: &mut dyn TokenSource) -> Result<Value> {
    if reader.peek_is("exists")? {
        reader.read()?;
        return parse_exists_tail(reader, true);
    }
    let inner = parse_value_core(reader)?;
    let negated = match inner.kind {
        ValueKind::Between(mut b) => {
            b.negated = true;
            ValueKind::Between(b)
        }
        ValueKind::Like(mut l) => {
            l.negated = true;
            ValueKind::Like(l)
        }
        ValueKind::In(mut i) => {
            i.negated = true;
            ValueKind::In(i)
        }
        ValueKind::Exists(mut e) => {
            e.negated = true;
            ValueKind::Exists(e)
        }
        _ => return Err(Error::syntax("between, like, in or exists", inner.to_text())),
    };
    Ok(Value {
        kind: negated,
        next: inner.next,
    })
}

/// Parenthesis disambiguation: the first token inside decides between a
/// nested query and a parenthesized value list.
fn parse_bracket_value(reader: &mut dyn TokenSource) -> Result<Value> {
    let mut scope = BracketScope::open(reader)?;
    if scope.peek_is_any(&["select", "values", "with"])? {
        let query = parse_read_query(&mut scope, None)?;
        scope.close()?;
        return Ok(Value::new(ValueKind::Query(Box::new(query))));
    }
    let mut values = vec![parse_value(&mut scope)?];
    while scope.read_if(",")?.is_some() {
        values.push(parse_value(&mut scope)?);
    }
    scope.close()?;
    let inner = if values.len() == 1 {
        values.into_iter().next().expect("one value")
    } else {
        Value::collection(values)
    };
    Ok(Value::bracket(inner))
}

fn parse_case_tail(reader: &mut dyn TokenSource) -> Result<Value> {
    let condition = if reader.peek_is("when")? {
        None
    } else {
        Some(parse_value(reader)?)
    };
    let mut branches = Vec::new();
    while reader.read_if("when")?.is_some() {
        let when = parse_value(reader)?;
        reader.expect("then")?;
        let then = parse_value(reader)?;
        branches.push(WhenBranch { when, then });
    }
    if branches.is_empty() {
        let found = reader
            .peek()?
            .map(str::to_owned)
            .unwrap_or_else(|| "end of input".to_string());
        return Err(Error::syntax("when", found));
    }
    let else_value = if reader.read_if("else")?.is_some() {
        Some(parse_value(reader)?)
    } else {
        None
    };
    reader.expect("end")?;
    Ok(Value::new(ValueKind::Case(Box::new(CaseExpression {
        condition,
        branches,
        else_value,
    }))))
}

fn parse_exists_tail(reader: &mut dyn TokenSource, negated: bool) -> Result<Value> {
    let mut scope = BracketScope::open(reader)?;
    let query = parse_select_query(&mut scope, None)?;
    scope.close()?;
    Ok(Value::new(ValueKind::Exists(Box::new(ExistsExpression {
        negated,
        query,
    }))))
}

fn parse_array_tail(reader: &mut dyn TokenSource) -> Result<Value> {
    reader.expect("[")?;
    let mut values = Vec::new();
    if !reader.peek_is("]")? {
        values.push(parse_value(reader)?);
        while reader.read_if(",")?.is_some() {
            values.push(parse_value(reader)?);
        }
    }
    reader.expect("]")?;
    Ok(Value::new(ValueKind::Array(ValueCollection::new(values))))
}

/// A word begins either a qualified column reference or a function call.
fn parse_name_or_function(reader: &mut dyn TokenSource) -> Result<Value> {
    let first = reader.require("name")?;
    let mut parts = vec![first];
    while reader.read_if(".")?.is_some() {
        let part = reader.require("name")?;
        if part != "*" && !super::can_be_identifier(&part) {
            return Err(Error::syntax("name", part));
        }
        parts.push(part);
    }

    if reader.peek_is("(")? {
        let name = parts.join(".");
        let args = parse_function_args(reader)?;
        let filter = parse_filter_clause(reader)?;
        let over = parse_over_clause(reader)?;
        return Ok(Value::new(ValueKind::Function(Box::new(FunctionValue {
            name,
            args,
            filter,
            over,
        }))));
    }

    let name = parts.pop().expect("at least one part");
    Ok(Value::new(ValueKind::Column(ColumnValue {
        qualifiers: parts,
        name,
    })))
}

pub(crate) fn parse_function_args(reader: &mut dyn TokenSource) -> Result<ValueCollection> {
    let mut scope = BracketScope::open(reader)?;
    let mut values = Vec::new();
    if scope.peek()?.is_some() {
        values.push(parse_value(&mut scope)?);
        while scope.read_if(",")?.is_some() {
            values.push(parse_value(&mut scope)?);
        }
    }
    scope.close()?;
    Ok(ValueCollection::new(values))
}

fn parse_filter_clause(reader: &mut dyn TokenSource) -> Result<Option<Value>> {
    if reader.read_if("filter")?.is_none() {
        return Ok(None);
    }
    let mut scope = BracketScope::open(reader)?;
    scope.expect("where")?;
    let condition = parse_value(&mut scope)?;
    scope.close()?;
    Ok(Some(condition))
}

fn parse_over_clause(reader: &mut dyn TokenSource) -> Result<Option<WindowReference>> {
    if reader.read_if("over")?.is_none() {
        return Ok(None);
    }
    if reader.peek_is("(")? {
        let definition = parse_window_definition(reader)?;
        return Ok(Some(WindowReference::Definition(definition)));
    }
    let name = reader.require("window name")?;
    if !super::can_be_identifier(&name) {
        return Err(Error::syntax("window name", name));
    }
    Ok(Some(WindowReference::Name(name)))
}

/// Parse `( [partition by ...] [order by ...] )`. Frame clauses are
/// recognized and reported as unsupported rather than misparsed.
pub(crate) fn parse_window_definition(
    reader: &mut dyn TokenSource,
) -> Result<WindowDefinition> {
    let mut scope = BracketScope::open(reader)?;
    let mut definition = WindowDefinition::default();
    if scope.read_if("partition by")?.is_some() {
        let mut values = vec![parse_value(&mut scope)?];
        while scope.read_if(",")?.is_some() {
            values.push(parse_value(&mut scope)?);
        }
        definition.partition_by = Some(ValueCollection::new(values));
    }
    if scope.peek_is("order by")? {
        definition.order_by = Some(parse_order_clause(&mut scope)?);
    }
    if scope.peek_is_any(&["rows", "range", "groups"])? {
        return Err(Error::unsupported("window frame clause"));
    }
    scope.close()?;
    Ok(definition)
}

pub(crate) fn parse_order_clause(reader: &mut dyn TokenSource) -> Result<OrderClause> {
    reader.expect("order by")?;
    let mut items = vec![parse_sortable_item(reader)?];
    while reader.read_if(",")?.is_some() {
        items.push(parse_sortable_item(reader)?);
    }
    Ok(OrderClause { items })
}

pub(crate) fn parse_sortable_item(reader: &mut dyn TokenSource) -> Result<SortableItem> {
    use crate::clauses::{NullsPlacement, SortDirection};
    let value = parse_value(reader)?;
    let direction = if reader.read_if("asc")?.is_some() {
        Some(SortDirection::Asc)
    } else if reader.read_if("desc")?.is_some() {
        Some(SortDirection::Desc)
    } else {
        None
    };
    let nulls = if reader.read_if("nulls first")?.is_some() {
        Some(NullsPlacement::First)
    } else if reader.read_if("nulls last")?.is_some() {
        Some(NullsPlacement::Last)
    } else {
        None
    };
    Ok(SortableItem {
        value,
        direction,
        nulls,
    })
}

/// Parse a type name: the (possibly multi-word) name, optional arguments,
/// and an optional time-zone qualifier.
pub(crate) fn parse_type_name(reader: &mut dyn TokenSource) -> Result<TypeName> {
    let name = reader.require("type name")?;
    if !super::can_be_identifier(&name) {
        return Err(Error::syntax("type name", name));
    }
    let mut type_name = TypeName::new(name);
    if reader.peek_is("(")? {
        let mut scope = BracketScope::open(reader)?;
        let mut args = vec![parse_value(&mut scope)?];
        while scope.read_if(",")?.is_some() {
            args.push(parse_value(&mut scope)?);
        }
        scope.close()?;
        type_name.args = args;
    }
    if let Some(zone) = reader.read_if("without time zone")? {
        type_name.zone = Some(zone);
    } else if reader.peek_is("with")? {
        let with = reader.require("with")?;
        let time = reader.expect("time")?;
        let zone = reader.expect("zone")?;
        type_name.zone = Some(format!("{with} {time} {zone}"));
    }
    Ok(type_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::TokenReader;
    use crate::tokens::ToTokens;

    fn value(sql: &str) -> Value {
        let mut reader = TokenReader::new(sql);
        let v = parse_value(&mut reader).unwrap();
        assert!(reader.peek().unwrap().is_none(), "unconsumed input in {sql}");
        v
    }

    fn value_err(sql: &str) -> Error {
        let mut reader = TokenReader::new(sql);
        parse_value(&mut reader).unwrap_err()
    }

    #[test]
    fn test_flat_chain_order() {
        let v = value("a + b * c");
        assert_eq!(v.to_text(), "a + b * c");
        let first = v.next.as_ref().unwrap();
        assert_eq!(first.operator, "+");
        assert_eq!(first.value.next.as_ref().unwrap().operator, "*");
    }

    #[test]
    fn test_suffix_binds_before_chain() {
        let v = value("x between 1 and 2 and y = 3");
        // BETWEEN captured 1 and 2; the trailing `and y = 3` is chain.
        let ValueKind::Between(b) = &v.kind else {
            panic!("expected between, got {:?}", v.kind);
        };
        assert_eq!(b.lower.to_text(), "1");
        assert_eq!(b.upper.to_text(), "2");
        assert_eq!(v.next.as_ref().unwrap().operator, "and");
        assert_eq!(v.to_text(), "x between 1 and 2 and y = 3");
    }

    #[test]
    fn test_not_suffixes() {
        assert_eq!(value("x not in (1, 2)").to_text(), "x not in (1, 2)");
        assert_eq!(value("x not like 'a%'").to_text(), "x not like 'a%'");
        assert_eq!(
            value("not exists (select 1)").to_text(),
            "not exists (select 1)"
        );
        assert_eq!(value("not x in (1)").to_text(), "x not in (1)");
    }

    #[test]
    fn test_bare_not_is_rejected() {
        let err = value_err("not x");
        assert!(matches!(err, Error::Syntax { .. }));
    }

    #[test]
    fn test_paren_disambiguation() {
        let subquery = value("(select 1)");
        assert!(matches!(subquery.kind, ValueKind::Query(_)));

        let list = value("(1, 2)");
        let ValueKind::Bracket(inner) = &list.kind else {
            panic!("expected bracket");
        };
        assert!(matches!(inner.kind, ValueKind::Collection(_)));

        let single = value("(a + 1)");
        let ValueKind::Bracket(inner) = &single.kind else {
            panic!("expected bracket");
        };
        assert!(inner.next.is_some());
    }

    #[test]
    fn test_case_forms() {
        let simple = value("case x when 1 then 'a' else 'b' end");
        let ValueKind::Case(c) = &simple.kind else {
            panic!("expected case");
        };
        assert!(c.condition.is_some());

        let searched = value("case when x = 1 then 'a' end");
        let ValueKind::Case(c) = &searched.kind else {
            panic!("expected case");
        };
        assert!(c.condition.is_none());
        assert_eq!(c.branches.len(), 1);

        assert!(matches!(value_err("case end"), Error::Syntax { .. }));
    }

    #[test]
    fn test_function_calls() {
        assert_eq!(value("count(*)").to_text(), "count(*)");
        assert_eq!(value("coalesce(a, b, 0)").to_text(), "coalesce(a, b, 0)");
        assert_eq!(
            value("sum(x) filter (where x > 0) over w").to_text(),
            "sum(x) filter (where x > 0) over w"
        );
        assert_eq!(
            value("row_number() over (partition by a order by b desc)").to_text(),
            "row_number() over (partition by a order by b desc)"
        );
    }

    #[test]
    fn test_window_frame_is_unsupported() {
        let err = value_err("sum(x) over (order by y rows 1)");
        assert!(matches!(err, Error::Unsupported { .. }));
    }

    #[test]
    fn test_casts() {
        let v = value("a::numeric(10, 2)");
        assert!(matches!(v.kind, ValueKind::Cast(_)));
        assert_eq!(v.to_text(), "a::numeric(10, 2)");
        assert_eq!(value("cast(a as text)").to_text(), "cast(a as text)");
        assert_eq!(
            value("ts at time zone 'utc'").to_text(),
            "ts at time zone 'utc'"
        );
    }

    #[test]
    fn test_parameters_and_literals() {
        assert!(matches!(value(":name").kind, ValueKind::Parameter(_)));
        assert!(matches!(value("@p").kind, ValueKind::Parameter(_)));
        assert!(matches!(value("?").kind, ValueKind::Parameter(_)));
        assert!(matches!(value("$1").kind, ValueKind::Parameter(_)));
        assert!(matches!(value("$$text$$").kind, ValueKind::Literal(_)));
        assert_eq!(value("-1").to_text(), "-1");
        assert_eq!(value("interval '2 days'").to_text(), "interval '2 days'");
    }

    #[test]
    fn test_quote_escape_preserved() {
        let v = value("'it''s'");
        assert_eq!(v.to_text(), "'it''s'");
    }

    #[test]
    fn test_in_subquery() {
        let v = value("id in (select id from t)");
        let ValueKind::In(i) = &v.kind else {
            panic!("expected in");
        };
        assert!(matches!(i.argument.kind, ValueKind::Query(_)));
    }

    #[test]
    fn test_is_operators_chain() {
        assert_eq!(value("a is null").to_text(), "a is null");
        assert_eq!(
            value("a is not distinct from b").to_text(),
            "a is not distinct from b"
        );
    }

    #[test]
    fn test_array_constructor() {
        assert_eq!(value("array[1, 2 + 3]").to_text(), "array[1, 2 + 3]");
    }
}
