use std::collections::HashSet;

use folio_common::tables::{Column, Index, Table};

use crate::domain::persistence::Persistence;

pub trait MigrationStep {
    fn ctx(&self) -> &'static str;
    fn ddls(self) -> Vec<String>;
}

#[derive(Debug)]
pub struct CreateTableStep {
    ddls: Vec<String>,
}

impl CreateTableStep {
    fn new(database_schema: &str, table: &Table) -> Self {
        let ddls = create_table_ddl(database_schema, table);
        Self { ddls }
    }
}

impl MigrationStep for CreateTableStep {
    fn ctx(&self) -> &'static str {
        "CREATE TABLE"
    }

    fn ddls(self) -> Vec<String> {
        self.ddls
    }
}

pub struct Migration<P: Persistence> {
    tables: Vec<Table>,
    persistence: P,
}

impl<P: Persistence> Migration<P> {
    pub fn new(tables: Vec<Table>, persistence: P) -> Self {
        Self {
            tables,
            persistence,
        }
    }

    /// Creates every missing table. Returns how many were created.
    pub async fn migrate(&self) -> Result<usize, anyhow::Error> {
        let existing = self.persistence.load().await?;
        let steps = migration_steps(self.persistence.database_schema(), &self.tables, &existing);
        let count = steps.len();
        for table in self.tables.iter().filter(|t| !existing.contains(&t.name)) {
            tracing::info!(table = %table.name, "creating table");
        }
        self.persistence.apply_migration_steps(steps).await?;
        Ok(count)
    }
}

pub fn migration_steps(
    database_schema: &str,
    needed: &[Table],
    existing: &HashSet<String>,
) -> Vec<CreateTableStep> {
    needed
        .iter()
        .filter(|table| !existing.contains(&table.name))
        .map(|table| CreateTableStep::new(database_schema, table))
        .collect()
}

fn create_table_ddl(schema: &str, table: &Table) -> Vec<String> {
    let columns_sql = table
        .columns
        .iter()
        .map(column_ddl)
        .collect::<Vec<_>>()
        .join(",\n    ");
    let pk_columns_sql = table
        .primary_key_columns()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ");

    let table_ddl = format!(
        "CREATE TABLE \"{}\".\"{}\" (\n    {},\n    PRIMARY KEY({})\n)",
        schema, table.name, columns_sql, pk_columns_sql
    );

    let mut ddls = vec![table_ddl];
    for index in table.indexes.iter() {
        ddls.push(create_index_ddl(schema, index));
    }

    ddls
}

fn column_ddl(column: &Column) -> String {
    let mut sql = format!("\"{}\" {}", column.name, column.column_type);
    if column.not_null {
        sql.push_str(" NOT NULL");
    }
    if let Some(default_value) = &column.default_value {
        sql.push_str(&format!(" DEFAULT {}", default_value));
    }
    sql
}

fn create_index_ddl(schema: &str, index: &Index) -> String {
    let columns_sql = index
        .columns
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "CREATE {}INDEX \"{}_{}_idx\" ON \"{}\".\"{}\" ({})",
        if index.unique { "UNIQUE " } else { "" },
        index.table_name,
        index.columns.join("_"),
        schema,
        index.table_name,
        columns_sql
    )
}
