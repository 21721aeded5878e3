use std::borrow::Cow;

use folio_common::Database;

// Represents a table in database
#[derive(Debug, Clone)]
pub struct Table {
    /// schema-qualified and quoted
    pub name: String,
    pub alias: &'static str,
}

impl Table {
    pub fn new(database: &Database, name: &str, alias: &'static str) -> Self {
        Self {
            name: database.table(name),
            alias,
        }
    }

    /// Get qualified table name with alias
    pub fn qualified(&self) -> String {
        format!("{} AS \"{}\"", self.name, self.alias)
    }

    pub fn column<'a>(&self, name: &'a str) -> ColumnRef<'a> {
        Cow::Owned(Column {
            qualifier: self.alias,
            name,
        })
    }

    pub fn columns<'a>(&self, names: &[&'a str]) -> Vec<ColumnRef<'a>> {
        names.iter().map(|name| self.column(name)).collect()
    }
}

/// Represents one column in the database table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column<'a> {
    pub qualifier: &'static str,
    pub name: &'a str,
}

impl Column<'_> {
    /// Get qualified column name
    pub fn qualified(&self) -> String {
        format!("\"{}\".\"{}\"", self.qualifier, self.name)
    }
}

/// Column reference which can be either borrowed or owned
pub type ColumnRef<'a> = Cow<'a, Column<'a>>;
