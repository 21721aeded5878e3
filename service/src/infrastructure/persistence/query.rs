use chrono::{DateTime, Utc};
use sqlx::{Postgres, postgres::PgArguments, query::Query};
use uuid::Uuid;

use crate::infrastructure::persistence::schema::{ColumnRef, Table};

/// Composable SELECT builder. Values always travel as bound parameters.
#[derive(Debug, Clone)]
pub struct QueryBuilder<'a> {
    from_table: Table,
    distinct_on: Vec<ColumnRef<'a>>,
    select: Vec<ColumnRef<'a>>,
    where_conditions: Vec<Condition<'a>>,
    order_by: Vec<OrderBy<'a>>,
    limit: Option<i64>,
    offset: Option<i64>,
}

/// A where condition that will be AND'ed together
#[derive(Debug, Clone)]
pub enum Condition<'a> {
    /// field = value
    Equals {
        column: ColumnRef<'a>,
        value: SqlParameter,
    },

    /// field > value
    GreaterThan {
        column: ColumnRef<'a>,
        value: SqlParameter,
    },

    /// field <= value
    LessThanOrEqual {
        column: ColumnRef<'a>,
        value: SqlParameter,
    },

    /// field ILIKE '%value%'
    Contains { column: ColumnRef<'a>, value: String },

    /// field LIKE 'value%'
    StartsWith { column: ColumnRef<'a>, value: String },

    /// field IS NULL
    IsNull { column: ColumnRef<'a> },

    /// field IS NOT NULL
    IsNotNull { column: ColumnRef<'a> },

    /// Combine two conditions with OR
    Or(Box<Condition<'a>>, Box<Condition<'a>>),
}

#[derive(Debug, Clone)]
pub struct OrderBy<'a> {
    pub column: ColumnRef<'a>,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl From<Table> for QueryBuilder<'_> {
    fn from(value: Table) -> Self {
        QueryBuilder {
            from_table: value,
            distinct_on: vec![],
            select: vec![],
            where_conditions: vec![],
            order_by: vec![],
            limit: None,
            offset: None,
        }
    }
}

impl<'a> QueryBuilder<'a> {
    /// Select specified columns
    pub fn select(mut self, columns: Vec<ColumnRef<'a>>) -> Self {
        self.select = columns;
        self
    }

    /// Keep only the first row, in ORDER BY order, of each group of `columns`.
    /// The ORDER BY must start with the same columns.
    pub fn distinct_on(mut self, columns: Vec<ColumnRef<'a>>) -> Self {
        self.distinct_on = columns;
        self
    }

    /// Add where condition
    pub fn where_condition(mut self, condition: Condition<'a>) -> Self {
        self.where_conditions.push(condition);
        self
    }

    pub fn order_by(mut self, column: ColumnRef<'a>, direction: SortDirection) -> Self {
        self.order_by.push(OrderBy { column, direction });
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Build the SQL query string
    pub fn build(&self) -> (String, Vec<SqlParameter>) {
        let mut params = Vec::new();
        let mut param_counter = 1;

        let columns: Vec<String> = self.select.iter().map(|c| c.qualified()).collect();
        let distinct = if self.distinct_on.is_empty() {
            String::new()
        } else {
            let keys: Vec<String> = self.distinct_on.iter().map(|c| c.qualified()).collect();
            format!("DISTINCT ON ({}) ", keys.join(", "))
        };
        let mut sql = format!(
            "SELECT {distinct}{}\nFROM {}",
            columns.join(", "),
            self.from_table.qualified()
        );

        self.push_where(&mut sql, &mut params, &mut param_counter);

        if !self.order_by.is_empty() {
            let order_clauses: Vec<String> = self
                .order_by
                .iter()
                .map(|ob| {
                    let direction = match ob.direction {
                        SortDirection::Ascending => "ASC",
                        SortDirection::Descending => "DESC",
                    };
                    format!("{} {}", ob.column.qualified(), direction)
                })
                .collect();
            sql.push_str(&format!("\nORDER BY {}", order_clauses.join(", ")));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!("\nLIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!("\nOFFSET {offset}"));
        }

        (sql, params)
    }

    /// Same FROM and WHERE as `build`, counting rows instead of selecting them
    pub fn build_count(&self) -> (String, Vec<SqlParameter>) {
        let mut params = Vec::new();
        let mut param_counter = 1;
        let mut sql = format!("SELECT COUNT(*)\nFROM {}", self.from_table.qualified());
        self.push_where(&mut sql, &mut params, &mut param_counter);
        (sql, params)
    }

    fn push_where(&self, sql: &mut String, params: &mut Vec<SqlParameter>, counter: &mut usize) {
        if self.where_conditions.is_empty() {
            return;
        }
        let clauses: Vec<String> = self
            .where_conditions
            .iter()
            .map(|condition| {
                let (clause, condition_params) = condition.to_sql(counter);
                params.extend(condition_params);
                clause
            })
            .collect();
        sql.push_str(&format!("\nWHERE {}", clauses.join(" AND ")));
    }
}

impl Condition<'_> {
    pub fn to_sql(&self, param_counter: &mut usize) -> (String, Vec<SqlParameter>) {
        let mut placeholder = || {
            let placeholder = format!("${param_counter}");
            *param_counter += 1;
            placeholder
        };

        match self {
            Condition::Equals { column, value } => (
                format!("{} = {}", column.qualified(), placeholder()),
                vec![value.clone()],
            ),

            Condition::GreaterThan { column, value } => (
                format!("{} > {}", column.qualified(), placeholder()),
                vec![value.clone()],
            ),

            Condition::LessThanOrEqual { column, value } => (
                format!("{} <= {}", column.qualified(), placeholder()),
                vec![value.clone()],
            ),

            Condition::Contains { column, value } => (
                format!("{} ILIKE {}", column.qualified(), placeholder()),
                vec![SqlParameter::Text(format!("%{}%", escape_like(value)))],
            ),

            Condition::StartsWith { column, value } => (
                format!("{} LIKE {}", column.qualified(), placeholder()),
                vec![SqlParameter::Text(format!("{}%", escape_like(value)))],
            ),

            Condition::IsNull { column } => (format!("{} IS NULL", column.qualified()), vec![]),

            Condition::IsNotNull { column } => {
                (format!("{} IS NOT NULL", column.qualified()), vec![])
            }

            Condition::Or(left, right) => {
                let (left_sql, mut left_params) = left.to_sql(param_counter);
                let (right_sql, right_params) = right.to_sql(param_counter);
                left_params.extend(right_params);
                (format!("({left_sql} OR {right_sql})"), left_params)
            }
        }
    }
}

/// Paths contain `_`, which LIKE would otherwise treat as a wildcard
pub(crate) fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

// SQL parameter that will be bound to query
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParameter {
    Text(String),
    Integer(i32),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    Null,
}

impl SqlParameter {
    /// Bind to sqlx query
    pub fn bind_to_query<'q>(
        self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        match self {
            SqlParameter::Text(s) => query.bind(s),
            SqlParameter::Integer(i) => query.bind(i),
            SqlParameter::Boolean(b) => query.bind(b),
            SqlParameter::Timestamp(t) => query.bind(t),
            SqlParameter::Uuid(u) => query.bind(u),
            SqlParameter::Null => query.bind::<Option<String>>(None),
        }
    }
}

/// Binds every parameter in order
pub fn bind_all<'q>(sql: &'q str, params: Vec<SqlParameter>) -> Query<'q, Postgres, PgArguments> {
    params
        .into_iter()
        .fold(sqlx::query(sql), |query, param| param.bind_to_query(query))
}
