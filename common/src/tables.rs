use std::fmt;

use crate::{
    ACQUIRED_FIELD_NAME, ACTIVITY_NOTES_FIELD_NAME, ARTICLE_ID_FIELD_NAME, ARTICLE_LOGS_TABLE,
    ARTICLE_TITLE_FIELD_NAME, LOGGED_FIELD_NAME, ARTICLE_NUMBER_FIELD_NAME,
    BODY_ATTRIBUTES_FIELD_NAME, CATALOG_TABLE, CONTENT_FIELD_NAME, COUNTER_KEY_FIELD_NAME,
    COUNTER_VALUE_FIELD_NAME, COUNTERS_TABLE, CREATED_FIELD_NAME, EDITOR_KIND_FIELD_NAME,
    EXPIRES_FIELD_NAME, FILE_PATH_FIELD_NAME, FOOTER_CONTENT_FIELD_NAME, FOOTER_SCRIPT_FIELD_NAME,
    HEAD_FIELD_NAME, HEADER_SCRIPT_FIELD_NAME, HTML_HEADER_FIELD_NAME, ID_FIELD_NAME,
    IS_DEFAULT_FIELD_NAME, LAYOUT_NAME_FIELD_NAME, LAYOUTS_TABLE, LOCKS_TABLE,
    PUBLISHED_FIELD_NAME, ROLE_LIST_FIELD_NAME, SESSION_ID_FIELD_NAME, STATUS_FIELD_NAME,
    TITLE_FIELD_NAME, UPDATED_FIELD_NAME, URL_PATH_FIELD_NAME, USER_IDENTITY_FIELD_NAME,
    VERSION_NUMBER_FIELD_NAME, VERSIONS_TABLE,
};

/// Represents table in a database, used for ddl generation
#[derive(Debug)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub indexes: Vec<Index>,
}

/// Represents one column in the database table
#[derive(Debug)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub not_null: bool,
    pub primary_key: bool,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Uuid,
    Text,
    Integer,
    TimestampTZ,
    Boolean,
}

/// Represents an index in the database table
#[derive(Debug)]
pub struct Index {
    pub table_name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sql = match self {
            ColumnType::Uuid => "UUID",
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::TimestampTZ => "TIMESTAMPTZ",
            ColumnType::Boolean => "BOOLEAN",
        };
        f.write_str(sql)
    }
}

impl Table {
    pub fn new<T: Into<String>>(name: T, columns: Vec<Column>, indexes: Vec<Index>) -> Self {
        Self {
            name: name.into(),
            columns,
            indexes,
        }
    }

    pub fn primary_key_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
    }
}

impl Column {
    pub fn new<T: Into<String>>(name: T, column_type: ColumnType, not_null: bool) -> Self {
        Self {
            name: name.into(),
            column_type,
            not_null,
            primary_key: false,
            default_value: None,
        }
    }

    pub fn primary_key<T: Into<String>>(name: T, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            not_null: true,
            primary_key: true,
            default_value: None,
        }
    }

    pub fn with_default<T: Into<String>>(mut self, default_value: T) -> Self {
        self.default_value = Some(default_value.into());
        self
    }
}

impl Index {
    pub fn new(table_name: &str, columns: &[&str], unique: bool) -> Self {
        Self {
            table_name: table_name.to_owned(),
            columns: columns.iter().map(|c| (*c).to_owned()).collect(),
            unique,
        }
    }
}

/// Every table the content core persists to.
pub fn content_tables() -> Vec<Table> {
    vec![
        counters_table(),
        versions_table(),
        catalog_table(),
        locks_table(),
        layouts_table(),
        article_logs_table(),
    ]
}

fn counters_table() -> Table {
    Table::new(
        COUNTERS_TABLE,
        vec![
            Column::primary_key(COUNTER_KEY_FIELD_NAME, ColumnType::Text),
            Column::new(COUNTER_VALUE_FIELD_NAME, ColumnType::Integer, true),
            Column::new(UPDATED_FIELD_NAME, ColumnType::TimestampTZ, true).with_default("now()"),
        ],
        Vec::new(),
    )
}

fn versions_table() -> Table {
    Table::new(
        VERSIONS_TABLE,
        vec![
            Column::primary_key(ID_FIELD_NAME, ColumnType::Uuid),
            Column::new(ARTICLE_NUMBER_FIELD_NAME, ColumnType::Integer, true),
            Column::new(VERSION_NUMBER_FIELD_NAME, ColumnType::Integer, true),
            Column::new(URL_PATH_FIELD_NAME, ColumnType::Text, true),
            Column::new(TITLE_FIELD_NAME, ColumnType::Text, true),
            Column::new(CONTENT_FIELD_NAME, ColumnType::Text, true),
            Column::new(HEADER_SCRIPT_FIELD_NAME, ColumnType::Text, false),
            Column::new(FOOTER_SCRIPT_FIELD_NAME, ColumnType::Text, false),
            Column::new(STATUS_FIELD_NAME, ColumnType::Text, true),
            Column::new(ROLE_LIST_FIELD_NAME, ColumnType::Text, false),
            Column::new(PUBLISHED_FIELD_NAME, ColumnType::TimestampTZ, false),
            Column::new(EXPIRES_FIELD_NAME, ColumnType::TimestampTZ, false),
            Column::new(CREATED_FIELD_NAME, ColumnType::TimestampTZ, true).with_default("now()"),
            Column::new(UPDATED_FIELD_NAME, ColumnType::TimestampTZ, true).with_default("now()"),
        ],
        vec![
            Index::new(
                VERSIONS_TABLE,
                &[ARTICLE_NUMBER_FIELD_NAME, VERSION_NUMBER_FIELD_NAME],
                true,
            ),
            Index::new(VERSIONS_TABLE, &[URL_PATH_FIELD_NAME], false),
        ],
    )
}

fn catalog_table() -> Table {
    Table::new(
        CATALOG_TABLE,
        vec![
            Column::primary_key(ARTICLE_NUMBER_FIELD_NAME, ColumnType::Integer),
            Column::new(TITLE_FIELD_NAME, ColumnType::Text, true),
            Column::new(STATUS_FIELD_NAME, ColumnType::Text, true),
            Column::new(UPDATED_FIELD_NAME, ColumnType::TimestampTZ, true),
            Column::new(PUBLISHED_FIELD_NAME, ColumnType::TimestampTZ, false),
            Column::new(URL_PATH_FIELD_NAME, ColumnType::Text, true),
        ],
        vec![Index::new(CATALOG_TABLE, &[URL_PATH_FIELD_NAME], false)],
    )
}

fn locks_table() -> Table {
    Table::new(
        LOCKS_TABLE,
        vec![
            Column::primary_key(ID_FIELD_NAME, ColumnType::Uuid),
            Column::new(ARTICLE_ID_FIELD_NAME, ColumnType::Uuid, true),
            Column::new(SESSION_ID_FIELD_NAME, ColumnType::Text, true),
            Column::new(USER_IDENTITY_FIELD_NAME, ColumnType::Text, true),
            Column::new(ACQUIRED_FIELD_NAME, ColumnType::TimestampTZ, true),
            Column::new(EDITOR_KIND_FIELD_NAME, ColumnType::Text, true),
            Column::new(FILE_PATH_FIELD_NAME, ColumnType::Text, false),
        ],
        vec![Index::new(LOCKS_TABLE, &[ARTICLE_ID_FIELD_NAME], true)],
    )
}

fn layouts_table() -> Table {
    Table::new(
        LAYOUTS_TABLE,
        vec![
            Column::primary_key(ID_FIELD_NAME, ColumnType::Uuid),
            Column::new(IS_DEFAULT_FIELD_NAME, ColumnType::Boolean, true).with_default("false"),
            Column::new(LAYOUT_NAME_FIELD_NAME, ColumnType::Text, true),
            Column::new(HEAD_FIELD_NAME, ColumnType::Text, false),
            Column::new(BODY_ATTRIBUTES_FIELD_NAME, ColumnType::Text, false),
            Column::new(HTML_HEADER_FIELD_NAME, ColumnType::Text, false),
            Column::new(FOOTER_CONTENT_FIELD_NAME, ColumnType::Text, false),
        ],
        Vec::new(),
    )
}

fn article_logs_table() -> Table {
    Table::new(
        ARTICLE_LOGS_TABLE,
        vec![
            Column::primary_key(ID_FIELD_NAME, ColumnType::Uuid),
            Column::new(USER_IDENTITY_FIELD_NAME, ColumnType::Text, true),
            Column::new(ARTICLE_ID_FIELD_NAME, ColumnType::Uuid, true),
            Column::new(ARTICLE_TITLE_FIELD_NAME, ColumnType::Text, false),
            Column::new(ACTIVITY_NOTES_FIELD_NAME, ColumnType::Text, true),
            Column::new(LOGGED_FIELD_NAME, ColumnType::TimestampTZ, true).with_default("now()"),
        ],
        vec![Index::new(ARTICLE_LOGS_TABLE, &[ARTICLE_ID_FIELD_NAME], false)],
    )
}
