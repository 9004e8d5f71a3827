//! Value expression AST
//!
//! The [`Value`] type represents every SQL value expression: literals,
//! columns, parameters, function calls, CASE, BETWEEN/LIKE/IN/EXISTS,
//! parenthesized groups, casts, arrays, tuples, and nested queries used as
//! values.
//!
//! # Operator chains
//!
//! Every value optionally carries a trailing operator chain,
//! `next: Option<Box<OperatedValue>>`, a right-linked list that records
//! binary operators in left-to-right input order. The chain performs no
//! precedence resolution: `a + b * c` is the flat chain `a, (+ b), (* c)`,
//! never a precedence-shaped tree. Re-serialization therefore reproduces
//! the exact operator order of the input, which is the point of this
//! representation. Logical `and`/`or` and `at time zone` participate in
//! the chain the same way arithmetic operators do.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::queries::{ReadQuery, SelectQuery};
use crate::tokens::{Token, TokenIter, ToTokens};

/// A value expression with its optional trailing operator chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Value {
    pub kind: ValueKind,
    /// Right-linked operator chain in input order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Box<OperatedValue>>,
}

/// One link of an operator chain: the operator and the value it applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatedValue {
    pub operator: String,
    pub value: Value,
}

/// The variant payload of a [`Value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Numeric, string, boolean, null, or interval literal, kept verbatim.
    Literal(LiteralValue),
    /// Column reference with an optional qualifier path.
    Column(ColumnValue),
    /// Positional or named placeholder: `?`, `:name`, `@name`, `$1`.
    Parameter(ParameterValue),
    Function(Box<FunctionValue>),
    Case(Box<CaseExpression>),
    Between(Box<BetweenExpression>),
    Like(Box<LikeExpression>),
    In(Box<InExpression>),
    Exists(Box<ExistsExpression>),
    /// A parenthesized inner value.
    Bracket(Box<Value>),
    Cast(Box<CastValue>),
    /// `ARRAY[...]` constructor.
    Array(ValueCollection),
    /// An ordered tuple or argument list without its own parentheses.
    Collection(ValueCollection),
    /// A nested query used as a value; always emitted parenthesized.
    Query(Box<ReadQuery>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralValue {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnValue {
    /// Qualifier path, e.g. `["a"]` for `a.id` or `["s", "t"]` for `s.t.id`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qualifiers: Vec<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterValue {
    /// The placeholder text including its prefix.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionValue {
    pub name: String,
    pub args: ValueCollection,
    /// Aggregate `FILTER (WHERE ...)` condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    /// Window `OVER ...` clause.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub over: Option<WindowReference>,
}

/// The window a function runs over: a named window from the WINDOW clause
/// or an inline definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowReference {
    Name(String),
    Definition(WindowDefinition),
}

/// An inline window definition: `(partition by ... order by ...)`.
///
/// Frame clauses (`ROWS`, `RANGE`, `GROUPS`) are recognized but not
/// implemented; the parser reports them as unsupported.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WindowDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_by: Option<ValueCollection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<crate::clauses::OrderClause>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseExpression {
    /// Controlling value of a simple CASE; `None` for a searched CASE.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,
    pub branches: Vec<WhenBranch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub else_value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhenBranch {
    pub when: Value,
    pub then: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetweenExpression {
    pub value: Value,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub negated: bool,
    pub lower: Value,
    pub upper: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikeExpression {
    pub value: Value,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub negated: bool,
    pub pattern: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InExpression {
    pub value: Value,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub negated: bool,
    /// The right-hand side: a bracketed value list or a subquery.
    pub argument: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistsExpression {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub negated: bool,
    pub query: SelectQuery,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastValue {
    pub value: Value,
    pub type_name: TypeName,
    pub style: CastStyle,
}

/// Which of the two cast spellings the input used; preserved so the text
/// round-trips in the form it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastStyle {
    /// `value::type`
    DoubleColon,
    /// `CAST(value AS type)`
    Function,
}

/// A named SQL type, shared by casts and column definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeName {
    /// The type word, including joined multi-word names such as
    /// `double precision`.
    pub name: String,
    /// Precision/scale arguments, e.g. the `10, 2` of `numeric(10, 2)`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
    /// Trailing zone qualifier: `with time zone` or `without time zone`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            zone: None,
        }
    }
}

/// An ordered list of values, rendered comma-separated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueCollection {
    pub values: Vec<Value>,
}

impl ValueCollection {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Value {
    pub fn new(kind: ValueKind) -> Self {
        Self { kind, next: None }
    }

    /// A literal kept verbatim: `1`, `'text'`, `true`, `null`.
    pub fn literal(text: impl Into<String>) -> Self {
        Self::new(ValueKind::Literal(LiteralValue { text: text.into() }))
    }

    /// An unqualified column reference.
    pub fn column(name: impl Into<String>) -> Self {
        Self::new(ValueKind::Column(ColumnValue {
            qualifiers: Vec::new(),
            name: name.into(),
        }))
    }

    /// A column reference with one table qualifier.
    pub fn qualified_column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(ValueKind::Column(ColumnValue {
            qualifiers: vec![table.into()],
            name: name.into(),
        }))
    }

    pub fn parameter(text: impl Into<String>) -> Self {
        Self::new(ValueKind::Parameter(ParameterValue { text: text.into() }))
    }

    pub fn function(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self::new(ValueKind::Function(Box::new(FunctionValue {
            name: name.into(),
            args: ValueCollection::new(args),
            filter: None,
            over: None,
        })))
    }

    pub fn bracket(inner: Value) -> Self {
        Self::new(ValueKind::Bracket(Box::new(inner)))
    }

    pub fn collection(values: Vec<Value>) -> Self {
        Self::new(ValueKind::Collection(ValueCollection::new(values)))
    }

    /// Append `(operator, value)` at the end of the operator chain.
    pub fn chain(mut self, operator: impl Into<String>, value: Value) -> Self {
        let link = OperatedValue {
            operator: operator.into(),
            value,
        };
        let mut cursor = &mut self.next;
        while let Some(next) = cursor {
            cursor = &mut next.value.next;
        }
        *cursor = Some(Box::new(link));
        self
    }

    /// Chain with `and`.
    pub fn and(self, value: Value) -> Self {
        self.chain("and", value)
    }

    /// Chain with `or`.
    pub fn or(self, value: Value) -> Self {
        self.chain("or", value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Operators made of letters are reserved words (`and`, `or`,
/// `at time zone`); symbolic operators are plain tokens.
fn operator_token(operator: &str, parent: Option<&Token>) -> Token {
    if operator
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c == ' ')
    {
        Token::reserved(operator, parent)
    } else {
        Token::word(operator, parent)
    }
}

impl ToTokens for Value {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let p = parent.cloned();
        let head = self.kind.to_tokens(p.as_ref());
        let Some(next) = &self.next else {
            return head;
        };
        let op_parent = p.clone();
        let op = std::iter::once_with(move || operator_token(&next.operator, op_parent.as_ref()));
        let value = std::iter::once(()).flat_map(move |_| next.value.to_tokens(p.as_ref()));
        Box::new(head.chain(op).chain(value))
    }
}

impl ToTokens for ValueKind {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let p = parent.cloned();
        match self {
            ValueKind::Literal(l) => Box::new(std::iter::once(Token::word(&l.text, parent))),
            ValueKind::Parameter(v) => Box::new(std::iter::once(Token::word(&v.text, parent))),
            ValueKind::Column(c) => {
                let mut tokens = Vec::with_capacity(c.qualifiers.len() * 2 + 1);
                for q in &c.qualifiers {
                    tokens.push(Token::word(q, p.as_ref()));
                    tokens.push(Token::word(".", p.as_ref()));
                }
                tokens.push(Token::word(&c.name, p.as_ref()));
                Box::new(tokens.into_iter())
            }
            ValueKind::Function(f) => f.to_tokens(parent),
            ValueKind::Case(c) => c.to_tokens(parent),
            ValueKind::Between(b) => b.to_tokens(parent),
            ValueKind::Like(l) => l.to_tokens(parent),
            ValueKind::In(i) => i.to_tokens(parent),
            ValueKind::Exists(e) => e.to_tokens(parent),
            ValueKind::Bracket(inner) => {
                let open = Token::word("(", p.as_ref());
                let close_parent = open.clone();
                let body_parent = open.clone();
                Box::new(
                    std::iter::once(open.clone())
                        .chain(
                            std::iter::once(())
                                .flat_map(move |_| inner.to_tokens(Some(&body_parent))),
                        )
                        .chain(std::iter::once_with(move || {
                            Token::word(")", Some(&close_parent))
                        })),
                )
            }
            ValueKind::Cast(c) => c.to_tokens(parent),
            ValueKind::Array(values) => {
                let array = Token::reserved("array", p.as_ref());
                let open = Token::word("[", Some(&array));
                let close_parent = open.clone();
                let body_parent = open.clone();
                Box::new(
                    [array, open]
                        .into_iter()
                        .chain(
                            std::iter::once(())
                                .flat_map(move |_| values.to_tokens(Some(&body_parent))),
                        )
                        .chain(std::iter::once_with(move || {
                            Token::word("]", Some(&close_parent))
                        })),
                )
            }
            ValueKind::Collection(values) => values.to_tokens(parent),
            ValueKind::Query(q) => {
                let open = Token::word("(", p.as_ref());
                let close_parent = open.clone();
                let body_parent = open.clone();
                Box::new(
                    std::iter::once(open.clone())
                        .chain(
                            std::iter::once(())
                                .flat_map(move |_| q.to_tokens(Some(&body_parent))),
                        )
                        .chain(std::iter::once_with(move || {
                            Token::word(")", Some(&close_parent))
                        })),
                )
            }
        }
    }
}

impl ToTokens for ValueCollection {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let p = parent.cloned();
        Box::new(self.values.iter().enumerate().flat_map(move |(i, v)| {
            let comma = if i > 0 {
                Some(Token::word(",", p.as_ref()))
            } else {
                None
            };
            comma.into_iter().chain(v.to_tokens(p.as_ref()))
        }))
    }
}

impl ToTokens for FunctionValue {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let name = Token::word(&self.name, parent);
        let open = Token::word("(", Some(&name));
        let args_parent = open.clone();
        let close_parent = open.clone();
        let head = [name.clone(), open]
            .into_iter()
            .chain(
                std::iter::once(())
                    .flat_map(move |_| self.args.to_tokens(Some(&args_parent))),
            )
            .chain(std::iter::once_with(move || {
                Token::word(")", Some(&close_parent))
            }));

        let filter_name = name.clone();
        let filter = self.filter.iter().flat_map(move |cond| {
            let kw = Token::reserved("filter", Some(&filter_name));
            let open = Token::word("(", Some(&kw));
            let where_kw = Token::reserved("where", Some(&open));
            let cond_parent = where_kw.clone();
            let close_parent = open.clone();
            [kw, open, where_kw.clone()]
                .into_iter()
                .chain(
                    std::iter::once(())
                        .flat_map(move |_| cond.to_tokens(Some(&cond_parent))),
                )
                .chain(std::iter::once_with(move || {
                    Token::word(")", Some(&close_parent))
                }))
        });

        let over_name = name;
        let over = self.over.iter().flat_map(move |over| {
            let kw = Token::reserved("over", Some(&over_name));
            std::iter::once(kw.clone()).chain(over.to_tokens(Some(&kw)))
        });

        Box::new(head.chain(filter).chain(over))
    }
}

impl ToTokens for WindowReference {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        match self {
            WindowReference::Name(name) => {
                Box::new(std::iter::once(Token::word(name, parent)))
            }
            WindowReference::Definition(def) => def.to_tokens(parent),
        }
    }
}

impl ToTokens for WindowDefinition {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let open = Token::word("(", parent);
        let partition_parent = open.clone();
        let order_parent = open.clone();
        let close_parent = open.clone();
        let partition = self.partition_by.iter().flat_map(move |items| {
            let kw = Token::reserved("partition by", Some(&partition_parent));
            std::iter::once(kw.clone())
                .chain(std::iter::once(()).flat_map(move |_| items.to_tokens(Some(&kw))))
        });
        let order = self
            .order_by
            .iter()
            .flat_map(move |o| o.to_tokens(Some(&order_parent)));
        Box::new(
            std::iter::once(open.clone())
                .chain(partition)
                .chain(order)
                .chain(std::iter::once_with(move || {
                    Token::word(")", Some(&close_parent))
                })),
        )
    }
}

impl ToTokens for CaseExpression {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let case = Token::reserved("case", parent);
        let cond_parent = case.clone();
        let condition = self
            .condition
            .iter()
            .flat_map(move |c| c.to_tokens(Some(&cond_parent)));

        let branch_parent = case.clone();
        let branches = self.branches.iter().flat_map(move |b| {
            let when = Token::reserved("when", Some(&branch_parent));
            let then_parent = branch_parent.clone();
            let when_parent = when.clone();
            std::iter::once(when.clone())
                .chain(std::iter::once(()).flat_map(move |_| b.when.to_tokens(Some(&when_parent))))
                .chain(std::iter::once_with({
                    let p = then_parent.clone();
                    move || Token::reserved("then", Some(&p))
                }))
                .chain(std::iter::once(()).flat_map(move |_| b.then.to_tokens(Some(&then_parent))))
        });

        let else_parent = case.clone();
        let else_value = self.else_value.iter().flat_map(move |v| {
            let kw = Token::reserved("else", Some(&else_parent));
            std::iter::once(kw.clone())
                .chain(std::iter::once(()).flat_map(move |_| v.to_tokens(Some(&kw))))
        });

        let end_parent = case.clone();
        Box::new(
            std::iter::once(case.clone())
                .chain(condition)
                .chain(branches)
                .chain(else_value)
                .chain(std::iter::once_with(move || {
                    Token::reserved("end", Some(&end_parent))
                })),
        )
    }
}

impl ToTokens for BetweenExpression {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let p = parent.cloned();
        let value = self.value.to_tokens(p.as_ref());
        let negated = self.negated;
        let kw_parent = p.clone();
        let keywords = std::iter::once(()).flat_map(move |_| {
            let not = negated.then(|| Token::reserved("not", kw_parent.as_ref()));
            not.into_iter()
                .chain(std::iter::once(Token::reserved("between", kw_parent.as_ref())))
        });
        let lower_parent = p.clone();
        let lower = std::iter::once(())
            .flat_map(move |_| self.lower.to_tokens(lower_parent.as_ref()));
        let and_parent = p.clone();
        let and = std::iter::once_with(move || Token::reserved("and", and_parent.as_ref()));
        let upper_parent = p;
        let upper = std::iter::once(())
            .flat_map(move |_| self.upper.to_tokens(upper_parent.as_ref()));
        Box::new(value.chain(keywords).chain(lower).chain(and).chain(upper))
    }
}

impl ToTokens for LikeExpression {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let p = parent.cloned();
        let value = self.value.to_tokens(p.as_ref());
        let negated = self.negated;
        let kw_parent = p.clone();
        let keywords = std::iter::once(()).flat_map(move |_| {
            let not = negated.then(|| Token::reserved("not", kw_parent.as_ref()));
            not.into_iter()
                .chain(std::iter::once(Token::reserved("like", kw_parent.as_ref())))
        });
        let pattern_parent = p;
        let pattern = std::iter::once(())
            .flat_map(move |_| self.pattern.to_tokens(pattern_parent.as_ref()));
        Box::new(value.chain(keywords).chain(pattern))
    }
}

impl ToTokens for InExpression {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let p = parent.cloned();
        let value = self.value.to_tokens(p.as_ref());
        let negated = self.negated;
        let kw_parent = p.clone();
        let keywords = std::iter::once(()).flat_map(move |_| {
            let not = negated.then(|| Token::reserved("not", kw_parent.as_ref()));
            not.into_iter()
                .chain(std::iter::once(Token::reserved("in", kw_parent.as_ref())))
        });
        let arg_parent = p;
        let argument = std::iter::once(())
            .flat_map(move |_| self.argument.to_tokens(arg_parent.as_ref()));
        Box::new(value.chain(keywords).chain(argument))
    }
}

impl ToTokens for ExistsExpression {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let p = parent.cloned();
        let not = self
            .negated
            .then(|| Token::reserved("not", p.as_ref()));
        let exists = Token::reserved("exists", p.as_ref());
        let open = Token::word("(", Some(&exists));
        let body_parent = open.clone();
        let close_parent = open.clone();
        Box::new(
            not.into_iter()
                .chain([exists, open])
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

impl ToTokens for CastValue {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let p = parent.cloned();
        match self.style {
            CastStyle::DoubleColon => {
                let sep_parent = p.clone();
                let type_parent = p.clone();
                Box::new(
                    self.value
                        .to_tokens(p.as_ref())
                        .chain(std::iter::once_with(move || {
                            Token::word("::", sep_parent.as_ref())
                        }))
                        .chain(
                            std::iter::once(())
                                .flat_map(move |_| self.type_name.to_tokens(type_parent.as_ref())),
                        ),
                )
            }
            CastStyle::Function => {
                let cast = Token::reserved("cast", p.as_ref());
                let open = Token::word("(", Some(&cast));
                let value_parent = open.clone();
                let as_parent = open.clone();
                let type_parent = open.clone();
                let close_parent = open.clone();
                Box::new(
                    [cast, open]
                        .into_iter()
                        .chain(
                            std::iter::once(())
                                .flat_map(move |_| self.value.to_tokens(Some(&value_parent))),
                        )
                        .chain(std::iter::once_with(move || {
                            Token::reserved("as", Some(&as_parent))
                        }))
                        .chain(
                            std::iter::once(())
                                .flat_map(move |_| self.type_name.to_tokens(Some(&type_parent))),
                        )
                        .chain(std::iter::once_with(move || {
                            Token::word(")", Some(&close_parent))
                        })),
                )
            }
        }
    }
}

impl ToTokens for TypeName {
    fn to_tokens<'a>(&'a self, parent: Option<&Token>) -> TokenIter<'a> {
        let name = Token::word(&self.name, parent);
        let args_parent = name.clone();
        let args = if self.args.is_empty() {
            None
        } else {
            Some(())
        }
        .into_iter()
        .flat_map(move |_| {
            let open = Token::word("(", Some(&args_parent));
            let list_parent = open.clone();
            let close_parent = open.clone();
            std::iter::once(open.clone())
                .chain(self.args.iter().enumerate().flat_map(move |(i, v)| {
                    let comma = (i > 0).then(|| Token::word(",", Some(&list_parent)));
                    comma.into_iter().chain(v.to_tokens(Some(&list_parent)))
                }))
                .chain(std::iter::once_with(move || {
                    Token::word(")", Some(&close_parent))
                }))
        });
        let zone_parent = name.clone();
        let zone = self
            .zone
            .iter()
            .map(move |z| Token::reserved(z, Some(&zone_parent)));
        Box::new(std::iter::once(name.clone()).chain(args).chain(zone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_values() {
        assert_eq!(Value::literal("1").to_text(), "1");
        assert_eq!(Value::column("id").to_text(), "id");
        assert_eq!(Value::qualified_column("a", "id").to_text(), "a.id");
        assert_eq!(Value::parameter(":name").to_text(), ":name");
    }

    #[test]
    fn test_operator_chain_preserves_order() {
        let v = Value::column("a")
            .chain("+", Value::column("b"))
            .chain("*", Value::column("c"));
        assert_eq!(v.to_text(), "a + b * c");
        // The chain is right-linked.
        let first = v.next.as_ref().unwrap();
        assert_eq!(first.operator, "+");
        assert_eq!(first.value.next.as_ref().unwrap().operator, "*");
    }

    #[test]
    fn test_function_with_filter_and_over() {
        let mut f = FunctionValue {
            name: "count".into(),
            args: ValueCollection::new(vec![Value::column("*")]),
            filter: Some(Value::column("x").chain(">", Value::literal("0"))),
            over: Some(WindowReference::Definition(WindowDefinition {
                partition_by: Some(ValueCollection::new(vec![Value::column("dept")])),
                order_by: None,
            })),
        };
        let v = Value::new(ValueKind::Function(Box::new(f.clone())));
        assert_eq!(
            v.to_text(),
            "count(*) filter (where x > 0) over (partition by dept)"
        );
        f.filter = None;
        f.over = Some(WindowReference::Name("w".into()));
        let v = Value::new(ValueKind::Function(Box::new(f)));
        assert_eq!(v.to_text(), "count(*) over w");
    }

    #[test]
    fn test_case_expression() {
        let case = CaseExpression {
            condition: None,
            branches: vec![WhenBranch {
                when: Value::column("x").chain("=", Value::literal("1")),
                then: Value::literal("'one'"),
            }],
            else_value: Some(Value::literal("'other'")),
        };
        let v = Value::new(ValueKind::Case(Box::new(case)));
        assert_eq!(v.to_text(), "case when x = 1 then 'one' else 'other' end");
    }

    #[test]
    fn test_cast_styles() {
        let double_colon = Value::new(ValueKind::Cast(Box::new(CastValue {
            value: Value::column("a"),
            type_name: TypeName::new("text"),
            style: CastStyle::DoubleColon,
        })));
        assert_eq!(double_colon.to_text(), "a::text");

        let function = Value::new(ValueKind::Cast(Box::new(CastValue {
            value: Value::column("a"),
            type_name: TypeName::new("integer"),
            style: CastStyle::Function,
        })));
        assert_eq!(function.to_text(), "cast(a as integer)");
    }

    #[test]
    fn test_bracket_parents_inner_tokens() {
        let v = Value::bracket(Value::column("a"));
        let tokens: Vec<_> = v.to_tokens(None).collect();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].parent().unwrap().text(), "(");
        assert_eq!(v.to_text(), "(a)");
    }

    #[test]
    fn test_between_and_in() {
        let between = Value::new(ValueKind::Between(Box::new(BetweenExpression {
            value: Value::column("x"),
            negated: true,
            lower: Value::literal("1"),
            upper: Value::literal("9"),
        })));
        assert_eq!(between.to_text(), "x not between 1 and 9");

        let in_list = Value::new(ValueKind::In(Box::new(InExpression {
            value: Value::column("x"),
            negated: false,
            argument: Value::bracket(Value::collection(vec![
                Value::literal("1"),
                Value::literal("2"),
            ])),
        })));
        assert_eq!(in_list.to_text(), "x in (1, 2)");
    }

    #[test]
    fn test_array_constructor() {
        let v = Value::new(ValueKind::Array(ValueCollection::new(vec![
            Value::literal("1"),
            Value::literal("2"),
        ])));
        assert_eq!(v.to_text(), "array[1, 2]");
    }

    #[test]
    fn test_type_name_with_args_and_zone() {
        let t = TypeName {
            name: "numeric".into(),
            args: vec![Value::literal("10"), Value::literal("2")],
            zone: None,
        };
        let v = Value::new(ValueKind::Cast(Box::new(CastValue {
            value: Value::column("a"),
            type_name: t,
            style: CastStyle::DoubleColon,
        })));
        assert_eq!(v.to_text(), "a::numeric(10, 2)");

        let t = TypeName {
            name: "timestamp".into(),
            args: Vec::new(),
            zone: Some("without time zone".into()),
        };
        assert_eq!(
            crate::tokens::join_tokens(t.to_tokens(None)),
            "timestamp without time zone"
        );
    }
}
