//! requel-sql - SQL parsing and round-trippable AST library
//!
//! This library parses SQL text into a structured, editable abstract
//! syntax tree and serializes that tree back to SQL.
//!
//! # Architecture
//!
//! The library follows a pipeline architecture:
//! 1. **Scanner** - Character cursor with lookahead and position tracking
//! 2. **Lexer** - Groups characters into lexemes, discards comments
//! 3. **Token reader** - Merges multi-word keywords, tracks bracket depth
//!    and statement termination
//! 4. **Parsers** - One recursive-descent function per grammar production
//! 5. **Token emission** - Every AST node emits a lazy token sequence that
//!    regenerates SQL text
//!
//! Parsing is text-faithful rather than semantic: binary operators are
//! kept as a flat, order-preserving chain with no precedence resolution,
//! so re-serialization reproduces the operator order of the input.
//!
//! # Example
//!
//! ```
//! use requel_sql::{Parser, ToTokens, Value};
//!
//! let mut query = Parser::parse_select("select id from users").unwrap();
//! query.and_where(Value::column("active"));
//! assert_eq!(query.to_text(), "select id from users where active");
//! ```

pub mod clauses;
pub mod ddl;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod queries;
pub mod reader;
pub mod scanner;
pub mod table;
pub mod tokens;
pub mod values;

pub use clauses::{
    CommonTable, Distinct, FromClause, GroupClause, HavingClause, JoinKind, LimitClause,
    Materialization, NamedWindow, NullsPlacement, OrderClause, Relation, ReturningClause,
    SelectClause, SelectableItem, SetClause, SetItem, SortDirection, SortableItem,
    UsingClause, WhereClause, WindowClause, WithClause,
};
pub use ddl::{
    AlterCommand, AlterTableQuery, ColumnConstraint, ColumnDefinition, CreateIndexQuery,
    CreateTableQuery, TableConstraint, TableConstraintKind, TableDefinitionClause,
    TableDefinitionItem,
};
pub use error::{Error, Result};
pub use parser::Parser;
pub use queries::{
    DeleteQuery, InsertQuery, Query, QueryOperation, ReadQuery, SelectQuery, SetOperator,
    UpdateQuery, ValuesQuery,
};
pub use reader::{BracketScope, StatementReader, TokenReader, TokenSource};
pub use table::{
    FunctionTable, LateralTable, PhysicalTable, SelectableTable, Table, VirtualTable,
};
pub use tokens::{join_tokens, ToTokens, Token, TokenIter};
pub use values::{
    BetweenExpression, CaseExpression, CastStyle, CastValue, ColumnValue, ExistsExpression,
    FunctionValue, InExpression, LikeExpression, LiteralValue, OperatedValue,
    ParameterValue, TypeName, Value, ValueCollection, ValueKind, WhenBranch,
    WindowDefinition, WindowReference,
};

/// Parse a single SQL statement of any supported kind.
pub fn parse(sql: &str) -> Result<Query> {
    Parser::parse(sql)
}

/// Parse a `;`-separated script into its statements, in order.
pub fn parse_statements(sql: &str) -> Result<Vec<Query>> {
    Parser::parse_statements(sql)
}
