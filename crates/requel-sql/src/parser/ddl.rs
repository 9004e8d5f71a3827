//! CREATE TABLE, CREATE INDEX, and ALTER TABLE parsing
//!
//! The definition list of a CREATE TABLE mixes column definitions and
//! table constraints; each comma-separated item is classified against the
//! constraint keyword set before falling back to column parsing. `unique`
//! is the ambiguous entry: `unique (a, b)` opens a table constraint while
//! a column definition can begin with any name, so classification needs a
//! second token of lookahead through the reader's rollback slot.

use crate::ddl::{
    AlterCommand, AlterTableQuery, ColumnConstraint, ColumnDefinition, CreateIndexQuery,
    CreateTableQuery, TableConstraint, TableConstraintKind, TableDefinitionClause,
    TableDefinitionItem,
};
use crate::error::{Error, Result};
use crate::parser::select::{
    identifier, parse_name_list, parse_physical_table, parse_select_query,
    parse_where_clause,
};
use crate::parser::value::{parse_sortable_item, parse_type_name, parse_value};
use crate::queries::Query;
use crate::reader::{BracketScope, TokenSource};

/// Dispatch CREATE TABLE vs CREATE INDEX after the shared `create` word.
pub(crate) fn parse_create_query(reader: &mut dyn TokenSource) -> Result<Query> {
    reader.expect("create")?;
    let temporary = reader.read_if("temporary")?.is_some();
    let unique = if temporary {
        false
    } else {
        reader.read_if("unique")?.is_some()
    };
    let Some(next) = reader.peek()? else {
        return Err(Error::end_of_input("table or index"));
    };
    match next.to_ascii_lowercase().as_str() {
        "table" if !unique => Ok(Query::CreateTable(parse_create_table_tail(
            reader, temporary,
        )?)),
        "index" if !temporary => Ok(Query::CreateIndex(parse_create_index_tail(
            reader, unique,
        )?)),
        _ => Err(Error::syntax("table or index", next)),
    }
}

fn parse_create_table_tail(
    reader: &mut dyn TokenSource,
    temporary: bool,
) -> Result<CreateTableQuery> {
    reader.expect("table")?;
    let if_not_exists = parse_if_not_exists(reader)?;
    let table = parse_physical_table(reader)?;
    if reader.read_if("as")?.is_some() {
        let query = parse_select_query(reader, None)?;
        return Ok(CreateTableQuery {
            temporary,
            if_not_exists,
            table,
            definition: None,
            query: Some(Box::new(query)),
        });
    }
    let definition = parse_table_definition(reader)?;
    Ok(CreateTableQuery {
        temporary,
        if_not_exists,
        table,
        definition: Some(definition),
        query: None,
    })
}

fn parse_if_not_exists(reader: &mut dyn TokenSource) -> Result<bool> {
    if reader.read_if("if")?.is_none() {
        return Ok(false);
    }
    reader.expect("not")?;
    reader.expect("exists")?;
    Ok(true)
}

fn parse_table_definition(reader: &mut dyn TokenSource) -> Result<TableDefinitionClause> {
    let mut scope = BracketScope::open(reader)?;
    let mut items = vec![parse_definition_item(&mut scope)?];
    while scope.read_if(",")?.is_some() {
        items.push(parse_definition_item(&mut scope)?);
    }
    scope.close()?;
    Ok(TableDefinitionClause { items })
}

fn parse_definition_item(reader: &mut dyn TokenSource) -> Result<TableDefinitionItem> {
    if starts_table_constraint(reader)? {
        Ok(TableDefinitionItem::Constraint(parse_table_constraint(
            reader,
        )?))
    } else {
        Ok(TableDefinitionItem::Column(parse_column_definition(
            reader,
        )?))
    }
}

fn starts_table_constraint(reader: &mut dyn TokenSource) -> Result<bool> {
    let Some(next) = reader.peek()? else {
        return Ok(false);
    };
    match next.to_ascii_lowercase().as_str() {
        "primary" | "foreign" | "check" | "constraint" => Ok(true),
        "unique" => {
            reader.read()?;
            let opens_column_list = reader.peek_is("(")?;
            reader.rollback()?;
            Ok(opens_column_list)
        }
        _ => Ok(false),
    }
}

fn parse_table_constraint(reader: &mut dyn TokenSource) -> Result<TableConstraint> {
    let name = if reader.read_if("constraint")?.is_some() {
        Some(identifier(reader, "constraint name")?)
    } else {
        None
    };
    let Some(next) = reader.peek()? else {
        return Err(Error::end_of_input("constraint"));
    };
    let kind = match next.to_ascii_lowercase().as_str() {
        "primary" => {
            reader.read()?;
            reader.expect("key")?;
            TableConstraintKind::PrimaryKey {
                columns: parse_name_list(reader)?,
            }
        }
        "unique" => {
            reader.read()?;
            TableConstraintKind::Unique {
                columns: parse_name_list(reader)?,
            }
        }
        "foreign" => {
            reader.read()?;
            reader.expect("key")?;
            let columns = parse_name_list(reader)?;
            reader.expect("references")?;
            let ref_table = identifier(reader, "referenced table")?;
            let ref_columns = if reader.peek_is("(")? {
                parse_name_list(reader)?
            } else {
                Vec::new()
            };
            TableConstraintKind::ForeignKey {
                columns,
                ref_table,
                ref_columns,
            }
        }
        "check" => {
            reader.read()?;
            let mut scope = BracketScope::open(reader)?;
            let value = parse_value(&mut scope)?;
            scope.close()?;
            TableConstraintKind::Check(value)
        }
        _ => return Err(Error::syntax("constraint", next)),
    };
    Ok(TableConstraint { name, kind })
}

fn parse_column_definition(reader: &mut dyn TokenSource) -> Result<ColumnDefinition> {
    let name = identifier(reader, "column name")?;
    let type_name = parse_type_name(reader)?;
    let mut constraints = Vec::new();
    loop {
        let Some(next) = reader.peek()? else {
            break;
        };
        let constraint = match next.to_ascii_lowercase().as_str() {
            "not" => {
                reader.read()?;
                reader.expect("null")?;
                ColumnConstraint::NotNull
            }
            "primary" => {
                reader.read()?;
                reader.expect("key")?;
                ColumnConstraint::PrimaryKey
            }
            "unique" => {
                reader.read()?;
                ColumnConstraint::Unique
            }
            "default" => {
                reader.read()?;
                ColumnConstraint::Default(parse_value(reader)?)
            }
            "check" => {
                reader.read()?;
                let mut scope = BracketScope::open(reader)?;
                let value = parse_value(&mut scope)?;
                scope.close()?;
                ColumnConstraint::Check(value)
            }
            "references" => {
                reader.read()?;
                let table = identifier(reader, "referenced table")?;
                let columns = if reader.peek_is("(")? {
                    parse_name_list(reader)?
                } else {
                    Vec::new()
                };
                ColumnConstraint::References { table, columns }
            }
            _ => break,
        };
        constraints.push(constraint);
    }
    Ok(ColumnDefinition {
        name,
        type_name,
        constraints,
    })
}

fn parse_create_index_tail(
    reader: &mut dyn TokenSource,
    unique: bool,
) -> Result<CreateIndexQuery> {
    reader.expect("index")?;
    let if_not_exists = parse_if_not_exists(reader)?;
    let name = if reader.peek()?.is_some_and(crate::parser::can_be_identifier) {
        Some(reader.require("index name")?)
    } else {
        None
    };
    reader.expect("on")?;
    let on = parse_physical_table(reader)?;
    let using = if reader.read_if("using")?.is_some() {
        Some(identifier(reader, "index method")?)
    } else {
        None
    };
    let mut scope = BracketScope::open(reader)?;
    let mut columns = vec![parse_sortable_item(&mut scope)?];
    while scope.read_if(",")?.is_some() {
        columns.push(parse_sortable_item(&mut scope)?);
    }
    scope.close()?;
    let where_clause = parse_where_clause(reader)?;
    Ok(CreateIndexQuery {
        unique,
        if_not_exists,
        name,
        on,
        using,
        columns,
        where_clause,
    })
}

pub(crate) fn parse_alter_table_query(
    reader: &mut dyn TokenSource,
) -> Result<AlterTableQuery> {
    reader.expect("alter")?;
    reader.expect("table")?;
    let table = parse_physical_table(reader)?;
    let mut commands = vec![parse_alter_command(reader)?];
    while reader.read_if(",")?.is_some() {
        commands.push(parse_alter_command(reader)?);
    }
    Ok(AlterTableQuery { table, commands })
}

fn parse_alter_command(reader: &mut dyn TokenSource) -> Result<AlterCommand> {
    let Some(next) = reader.peek()? else {
        return Err(Error::end_of_input("alter command"));
    };
    match next.to_ascii_lowercase().as_str() {
        "add" => {
            reader.read()?;
            if reader.read_if("column")?.is_some() {
                return Ok(AlterCommand::AddColumn(parse_column_definition(reader)?));
            }
            if starts_table_constraint(reader)? {
                return Ok(AlterCommand::AddConstraint(parse_table_constraint(
                    reader,
                )?));
            }
            Ok(AlterCommand::AddColumn(parse_column_definition(reader)?))
        }
        "drop" => {
            reader.read()?;
            if reader.read_if("constraint")?.is_some() {
                return Ok(AlterCommand::DropConstraint {
                    name: identifier(reader, "constraint name")?,
                });
            }
            reader.read_if("column")?;
            Ok(AlterCommand::DropColumn {
                name: identifier(reader, "column name")?,
            })
        }
        "alter" => {
            reader.read()?;
            reader.read_if("column")?;
            let column = identifier(reader, "column name")?;
            parse_alter_column_action(reader, column)
        }
        "rename" => {
            reader.read()?;
            if reader.read_if("to")?.is_some() {
                return Ok(AlterCommand::RenameTable {
                    to: identifier(reader, "table name")?,
                });
            }
            reader.read_if("column")?;
            let from = identifier(reader, "column name")?;
            reader.expect("to")?;
            Ok(AlterCommand::RenameColumn {
                from,
                to: identifier(reader, "column name")?,
            })
        }
        _ => Err(Error::syntax("add, drop, alter or rename", next)),
    }
}

fn parse_alter_column_action(
    reader: &mut dyn TokenSource,
    column: String,
) -> Result<AlterCommand> {
    let Some(action) = reader.peek()?.map(str::to_ascii_lowercase) else {
        return Err(Error::end_of_input("set, drop or type"));
    };
    match action.as_str() {
        "set" => {
            reader.read()?;
            if reader.read_if("default")?.is_some() {
                return Ok(AlterCommand::SetDefault {
                    column,
                    value: parse_value(reader)?,
                });
            }
            reader.expect("not")?;
            reader.expect("null")?;
            Ok(AlterCommand::SetNotNull { column })
        }
        "drop" => {
            reader.read()?;
            if reader.read_if("default")?.is_some() {
                return Ok(AlterCommand::DropDefault { column });
            }
            reader.expect("not")?;
            reader.expect("null")?;
            Ok(AlterCommand::DropNotNull { column })
        }
        "type" => {
            reader.read()?;
            Ok(AlterCommand::ChangeColumnType {
                column,
                type_name: parse_type_name(reader)?,
            })
        }
        _ => Err(Error::syntax("set, drop or type", action)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::tokens::ToTokens;
    use crate::values::ValueKind;

    #[test]
    fn test_create_table_columns_and_constraints() {
        let q = Parser::parse_create_table(
            "create table orders (id integer primary key, user_id integer not null \
             references users (id), total numeric(10, 2) default 0 not null, \
             constraint uq_order unique (id, user_id), check (total >= 0))",
        )
        .unwrap();
        let definition = q.definition.unwrap();
        assert_eq!(definition.columns().count(), 3);
        assert_eq!(definition.items.len(), 5);
        let total = definition.find_column("total").unwrap();
        assert_eq!(total.constraints.len(), 2);
        assert!(matches!(
            total.constraints[0],
            ColumnConstraint::Default(_)
        ));
    }

    #[test]
    fn test_unique_disambiguation_needs_rollback() {
        // Table-level `unique (...)` vs a column constraint on a column.
        let q = Parser::parse_create_table(
            "create table t (a integer unique, unique (a))",
        )
        .unwrap();
        let definition = q.definition.unwrap();
        assert!(matches!(
            definition.items[0],
            TableDefinitionItem::Column(_)
        ));
        assert!(matches!(
            definition.items[1],
            TableDefinitionItem::Constraint(_)
        ));
    }

    #[test]
    fn test_create_temporary_table_as_select() {
        let q = Parser::parse_create_table(
            "create temporary table t as select id from users",
        )
        .unwrap();
        assert!(q.temporary);
        assert!(q.definition.is_none());
        assert!(q.query.is_some());
        assert_eq!(
            q.to_text(),
            "create temporary table t as select id from users"
        );
    }

    #[test]
    fn test_create_table_if_not_exists() {
        let q = Parser::parse_create_table(
            "create table if not exists t (id integer)",
        )
        .unwrap();
        assert!(q.if_not_exists);
    }

    #[test]
    fn test_foreign_key_constraint() {
        let q = Parser::parse_create_table(
            "create table t (a integer, foreign key (a) references u (id))",
        )
        .unwrap();
        let definition = q.definition.unwrap();
        let TableDefinitionItem::Constraint(c) = &definition.items[1] else {
            panic!("expected constraint");
        };
        assert!(matches!(c.kind, TableConstraintKind::ForeignKey { .. }));
    }

    #[test]
    fn test_create_index_full_form() {
        let q = Parser::parse_create_index(
            "create unique index if not exists ix_users_name on public.users \
             using btree (name desc nulls last, id) where deleted = false",
        )
        .unwrap();
        assert!(q.unique);
        assert!(q.if_not_exists);
        assert_eq!(q.name.as_deref(), Some("ix_users_name"));
        assert_eq!(q.on.schema.as_deref(), Some("public"));
        assert_eq!(q.columns.len(), 2);
        assert!(q.where_clause.is_some());
    }

    #[test]
    fn test_create_index_without_name() {
        let q = Parser::parse_create_index("create index on t (id)").unwrap();
        assert!(q.name.is_none());
    }

    #[test]
    fn test_alter_table_command_list() {
        let q = Parser::parse_alter_table(
            "alter table t add column x integer, drop column y, \
             alter column z set default 0, alter column z drop not null, \
             alter column z type text, rename column a to b, rename to t2",
        )
        .unwrap();
        assert_eq!(q.commands.len(), 7);
        assert!(matches!(q.commands[0], AlterCommand::AddColumn(_)));
        assert!(matches!(q.commands[2], AlterCommand::SetDefault { .. }));
        assert!(matches!(q.commands[4], AlterCommand::ChangeColumnType { .. }));
        assert!(matches!(q.commands[6], AlterCommand::RenameTable { .. }));
    }

    #[test]
    fn test_alter_add_constraint() {
        let q = Parser::parse_alter_table(
            "alter table t add constraint pk primary key (id), add unique (x)",
        )
        .unwrap();
        assert!(matches!(q.commands[0], AlterCommand::AddConstraint(_)));
        assert!(matches!(q.commands[1], AlterCommand::AddConstraint(_)));
    }

    #[test]
    fn test_alter_add_without_column_keyword() {
        let q = Parser::parse_alter_table("alter table t add x integer").unwrap();
        assert!(matches!(q.commands[0], AlterCommand::AddColumn(_)));
    }

    #[test]
    fn test_default_expression_stops_before_next_constraint() {
        let q = Parser::parse_create_table(
            "create table t (ts timestamp with time zone default now() not null)",
        )
        .unwrap();
        let definition = q.definition.unwrap();
        let ts = definition.find_column("ts").unwrap();
        assert_eq!(ts.type_name.zone.as_deref(), Some("with time zone"));
        let ColumnConstraint::Default(v) = &ts.constraints[0] else {
            panic!("expected default");
        };
        assert!(matches!(v.kind, ValueKind::Function(_)));
        assert!(matches!(ts.constraints[1], ColumnConstraint::NotNull));
    }

    #[test]
    fn test_create_unique_table_is_rejected() {
        assert!(Parser::parse("create unique table t (a integer)").is_err());
    }
}
