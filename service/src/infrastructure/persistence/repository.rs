use chrono::{DateTime, Utc};
use folio_common::{
    ACQUIRED_FIELD_NAME, ACTIVITY_NOTES_FIELD_NAME, ARTICLE_ID_FIELD_NAME, ARTICLE_LOGS_TABLE,
    ARTICLE_NUMBER_FIELD_NAME, ARTICLE_TITLE_FIELD_NAME, BODY_ATTRIBUTES_FIELD_NAME, CATALOG_TABLE,
    CONTENT_FIELD_NAME, COUNTERS_TABLE, COUNTER_KEY_FIELD_NAME, COUNTER_VALUE_FIELD_NAME,
    CREATED_FIELD_NAME, Database, EDITOR_KIND_FIELD_NAME, EXPIRES_FIELD_NAME, FILE_PATH_FIELD_NAME,
    FOOTER_CONTENT_FIELD_NAME, FOOTER_SCRIPT_FIELD_NAME, HEADER_SCRIPT_FIELD_NAME, HEAD_FIELD_NAME,
    HTML_HEADER_FIELD_NAME, ID_FIELD_NAME, IS_DEFAULT_FIELD_NAME, LAYOUTS_TABLE,
    LAYOUT_NAME_FIELD_NAME, LOCKS_TABLE, LOGGED_FIELD_NAME, PUBLISHED_FIELD_NAME,
    ROLE_LIST_FIELD_NAME, SESSION_ID_FIELD_NAME, STATUS_FIELD_NAME, TITLE_FIELD_NAME,
    UPDATED_FIELD_NAME, URL_PATH_FIELD_NAME, USER_IDENTITY_FIELD_NAME, VERSIONS_TABLE,
    VERSION_NUMBER_FIELD_NAME,
};
use sqlx::{Postgres, postgres::PgArguments, query::Query};
use uuid::Uuid;

use crate::{
    domain::{
        activity::ActivityEntry,
        article::{
            Version, VersionStatus,
            path::{PathPrefix, UrlPath},
        },
        catalog::CatalogEntry,
        locks::EditLock,
        repository::{
            CatalogRepository, CounterRepository, LayoutRepository, LockRepository,
            LogRepository, PublishedPath, RepositoryError, VersionRepository,
            query::{CatalogFilter, CatalogQuery, CatalogSortField, SortDirection as CatalogOrder},
        },
        resolver::ResolvedLayout,
    },
    infrastructure::persistence::{
        query::{Condition, QueryBuilder, SortDirection, SqlParameter, bind_all, escape_like},
        result::{
            row_to_activity, row_to_catalog_entry, row_to_layout, row_to_lock,
            row_to_published_path, row_to_version,
        },
        schema::Table,
    },
};

const VERSION_COLUMNS: [&str; 14] = [
    ID_FIELD_NAME,
    ARTICLE_NUMBER_FIELD_NAME,
    VERSION_NUMBER_FIELD_NAME,
    URL_PATH_FIELD_NAME,
    TITLE_FIELD_NAME,
    CONTENT_FIELD_NAME,
    HEADER_SCRIPT_FIELD_NAME,
    FOOTER_SCRIPT_FIELD_NAME,
    STATUS_FIELD_NAME,
    ROLE_LIST_FIELD_NAME,
    PUBLISHED_FIELD_NAME,
    EXPIRES_FIELD_NAME,
    CREATED_FIELD_NAME,
    UPDATED_FIELD_NAME,
];

const CATALOG_COLUMNS: [&str; 6] = [
    ARTICLE_NUMBER_FIELD_NAME,
    TITLE_FIELD_NAME,
    STATUS_FIELD_NAME,
    UPDATED_FIELD_NAME,
    PUBLISHED_FIELD_NAME,
    URL_PATH_FIELD_NAME,
];

const LOCK_COLUMNS: [&str; 7] = [
    ID_FIELD_NAME,
    ARTICLE_ID_FIELD_NAME,
    SESSION_ID_FIELD_NAME,
    USER_IDENTITY_FIELD_NAME,
    ACQUIRED_FIELD_NAME,
    EDITOR_KIND_FIELD_NAME,
    FILE_PATH_FIELD_NAME,
];

const ACTIVITY_COLUMNS: [&str; 6] = [
    ID_FIELD_NAME,
    USER_IDENTITY_FIELD_NAME,
    ARTICLE_ID_FIELD_NAME,
    ARTICLE_TITLE_FIELD_NAME,
    ACTIVITY_NOTES_FIELD_NAME,
    LOGGED_FIELD_NAME,
];

const LAYOUT_COLUMNS: [&str; 6] = [
    ID_FIELD_NAME,
    LAYOUT_NAME_FIELD_NAME,
    HEAD_FIELD_NAME,
    BODY_ATTRIBUTES_FIELD_NAME,
    HTML_HEADER_FIELD_NAME,
    FOOTER_CONTENT_FIELD_NAME,
];

/// `$1, $2, ... $count`
fn placeholders(count: usize) -> String {
    (1..=count).map(|i| format!("${i}")).collect::<Vec<_>>().join(", ")
}

/// Every content port on top of one Postgres schema.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    database: &'static Database,
}

impl PostgresRepository {
    pub fn new(database: &'static Database) -> Self {
        Self { database }
    }

    fn versions(&self) -> Table {
        Table::new(self.database, VERSIONS_TABLE, "v")
    }

    fn catalog(&self) -> Table {
        Table::new(self.database, CATALOG_TABLE, "c")
    }

    /// All version columns, restricted to versions visible at `at`
    fn visible_versions<'a>(&self, columns: &[&'a str], at: DateTime<Utc>) -> QueryBuilder<'a> {
        let table = self.versions();
        let builder = QueryBuilder::from(table.clone()).select(table.columns(columns));
        builder
            .where_condition(Condition::Equals {
                column: table.column(STATUS_FIELD_NAME),
                value: SqlParameter::Text(VersionStatus::Active.as_str().to_owned()),
            })
            .where_condition(Condition::LessThanOrEqual {
                column: table.column(PUBLISHED_FIELD_NAME),
                value: SqlParameter::Timestamp(at),
            })
            .where_condition(Condition::Or(
                Box::new(Condition::IsNull {
                    column: table.column(EXPIRES_FIELD_NAME),
                }),
                Box::new(Condition::GreaterThan {
                    column: table.column(EXPIRES_FIELD_NAME),
                    value: SqlParameter::Timestamp(at),
                }),
            ))
    }

    async fn fetch_versions(&self, builder: QueryBuilder<'_>) -> Result<Vec<Version>, RepositoryError> {
        let (sql, params) = builder.build();
        tracing::debug!(%sql, "version query");
        let rows = bind_all(&sql, params)
            .fetch_all(self.database.database_pool())
            .await?;
        rows.iter().map(row_to_version).collect()
    }
}

impl CounterRepository for PostgresRepository {
    async fn current(&self, key: &str) -> Result<Option<i32>, RepositoryError> {
        let sql = format!(
            "SELECT {COUNTER_VALUE_FIELD_NAME} FROM {} WHERE {COUNTER_KEY_FIELD_NAME} = $1",
            self.database.table(COUNTERS_TABLE)
        );
        let value = sqlx::query_scalar::<_, i32>(&sql)
            .bind(key)
            .fetch_optional(self.database.database_pool())
            .await?;
        Ok(value)
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<i32>,
        value: i32,
    ) -> Result<bool, RepositoryError> {
        let sql = counter_sql(&self.database.table(COUNTERS_TABLE), expected);
        let result = bind_counter(&sql, key, expected, value)
            .execute(self.database.database_pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// `$1` key, `$2` new value, `$3` expected value when there is one
fn counter_sql(table: &str, expected: Option<i32>) -> String {
    match expected {
        None => format!(
            "INSERT INTO {table} ({COUNTER_KEY_FIELD_NAME}, {COUNTER_VALUE_FIELD_NAME}) \
             VALUES ($1, $2) ON CONFLICT ({COUNTER_KEY_FIELD_NAME}) DO NOTHING"
        ),
        Some(_) => format!(
            "UPDATE {table} SET {COUNTER_VALUE_FIELD_NAME} = $2, {UPDATED_FIELD_NAME} = NOW() \
             WHERE {COUNTER_KEY_FIELD_NAME} = $1 AND {COUNTER_VALUE_FIELD_NAME} = $3"
        ),
    }
}

fn bind_counter<'q>(
    sql: &'q str,
    key: &'q str,
    expected: Option<i32>,
    value: i32,
) -> Query<'q, Postgres, PgArguments> {
    let query = sqlx::query(sql).bind(key).bind(value);
    match expected {
        Some(expected) => query.bind(expected),
        None => query,
    }
}

fn insert_version_sql(table: &str) -> String {
    format!(
        "INSERT INTO {table} ({}) VALUES ({})",
        VERSION_COLUMNS.join(", "),
        placeholders(VERSION_COLUMNS.len())
    )
}

fn bind_version<'q>(sql: &'q str, version: &'q Version) -> Query<'q, Postgres, PgArguments> {
    sqlx::query(sql)
        .bind(version.id.0)
        .bind(version.article_number)
        .bind(version.version_number)
        .bind(version.url_path.as_ref())
        .bind(&version.title)
        .bind(&version.content)
        .bind(version.header_script.as_deref())
        .bind(version.footer_script.as_deref())
        .bind(version.status.as_str())
        .bind(&version.role_list)
        .bind(version.window.published)
        .bind(version.window.expires)
        .bind(version.created)
        .bind(version.updated)
}

impl VersionRepository for PostgresRepository {
    async fn append(
        &self,
        counter: &str,
        expected: Option<i32>,
        version: &Version,
    ) -> Result<bool, RepositoryError> {
        let move_counter = counter_sql(&self.database.table(COUNTERS_TABLE), expected);
        let insert_version = insert_version_sql(&self.database.table(VERSIONS_TABLE));

        let mut tx = self.database.database_pool().begin().await?;
        let moved = bind_counter(&move_counter, counter, expected, version.version_number)
            .execute(&mut *tx)
            .await?;
        if moved.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }
        bind_version(&insert_version, version).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn find_published(
        &self,
        url_path: &UrlPath,
        at: DateTime<Utc>,
    ) -> Result<Option<Version>, RepositoryError> {
        let table = self.versions();
        let builder = self
            .visible_versions(&VERSION_COLUMNS, at)
            .where_condition(Condition::Equals {
                column: table.column(URL_PATH_FIELD_NAME),
                value: SqlParameter::Text(url_path.to_string()),
            })
            .order_by(table.column(VERSION_NUMBER_FIELD_NAME), SortDirection::Descending)
            .order_by(table.column(ARTICLE_NUMBER_FIELD_NAME), SortDirection::Descending)
            .limit(1);
        Ok(self.fetch_versions(builder).await?.into_iter().next())
    }

    async fn find_latest(&self, url_path: &UrlPath) -> Result<Option<Version>, RepositoryError> {
        let table = self.versions();
        let builder = QueryBuilder::from(table.clone())
            .select(table.columns(&VERSION_COLUMNS))
            .where_condition(Condition::Equals {
                column: table.column(URL_PATH_FIELD_NAME),
                value: SqlParameter::Text(url_path.to_string()),
            })
            .order_by(table.column(VERSION_NUMBER_FIELD_NAME), SortDirection::Descending)
            .order_by(table.column(ARTICLE_NUMBER_FIELD_NAME), SortDirection::Descending)
            .limit(1);
        Ok(self.fetch_versions(builder).await?.into_iter().next())
    }

    async fn list_by_article(&self, article_number: i32) -> Result<Vec<Version>, RepositoryError> {
        let table = self.versions();
        let builder = QueryBuilder::from(table.clone())
            .select(table.columns(&VERSION_COLUMNS))
            .where_condition(Condition::Equals {
                column: table.column(ARTICLE_NUMBER_FIELD_NAME),
                value: SqlParameter::Integer(article_number),
            })
            .order_by(table.column(VERSION_NUMBER_FIELD_NAME), SortDirection::Ascending);
        self.fetch_versions(builder).await
    }

    async fn article_numbers(&self) -> Result<Vec<i32>, RepositoryError> {
        let sql = format!(
            "SELECT DISTINCT {ARTICLE_NUMBER_FIELD_NAME} FROM {} ORDER BY {ARTICLE_NUMBER_FIELD_NAME}",
            self.database.table(VERSIONS_TABLE)
        );
        let numbers = sqlx::query_scalar::<_, i32>(&sql)
            .fetch_all(self.database.database_pool())
            .await?;
        Ok(numbers)
    }

    async fn visible_under(
        &self,
        prefix: &PathPrefix,
        at: DateTime<Utc>,
    ) -> Result<Vec<PublishedPath>, RepositoryError> {
        let table = self.versions();
        let columns = [
            ARTICLE_NUMBER_FIELD_NAME,
            VERSION_NUMBER_FIELD_NAME,
            URL_PATH_FIELD_NAME,
            TITLE_FIELD_NAME,
            PUBLISHED_FIELD_NAME,
            UPDATED_FIELD_NAME,
        ];
        // newest visible version per article first, the path test comes after
        let builder = self
            .visible_versions(&columns, at)
            .distinct_on(vec![table.column(ARTICLE_NUMBER_FIELD_NAME)])
            .order_by(
                table.column(ARTICLE_NUMBER_FIELD_NAME),
                SortDirection::Ascending,
            )
            .order_by(
                table.column(VERSION_NUMBER_FIELD_NAME),
                SortDirection::Descending,
            );

        let (current, mut params) = builder.build();
        let sql = if prefix.is_root() {
            current
        } else {
            params.push(SqlParameter::Text(format!(
                "{}%",
                escape_like(&prefix.descendant_start())
            )));
            format!(
                "SELECT * FROM ({current}) AS current\nWHERE current.{URL_PATH_FIELD_NAME} LIKE ${}",
                params.len()
            )
        };

        tracing::debug!(%sql, prefix = prefix.as_str(), "toc query");
        let rows = bind_all(&sql, params)
            .fetch_all(self.database.database_pool())
            .await?;
        rows.iter().map(row_to_published_path).collect()
    }
}

fn filter_conditions<'a>(table: &Table, filter: &CatalogFilter, out: &mut Vec<Condition<'a>>) {
    match filter {
        CatalogFilter::All => {}
        CatalogFilter::TitleContains(text) => out.push(Condition::Contains {
            column: table.column(TITLE_FIELD_NAME),
            value: text.clone(),
        }),
        CatalogFilter::StatusIs(status) => out.push(Condition::Equals {
            column: table.column(STATUS_FIELD_NAME),
            value: SqlParameter::Text(status.as_str().to_owned()),
        }),
        CatalogFilter::PathStartsWith(start) => out.push(Condition::StartsWith {
            column: table.column(URL_PATH_FIELD_NAME),
            value: start.clone(),
        }),
        CatalogFilter::And(left, right) => {
            filter_conditions(table, left, out);
            filter_conditions(table, right, out);
        }
    }
}

fn sort_column(field: CatalogSortField) -> &'static str {
    match field {
        CatalogSortField::Title => TITLE_FIELD_NAME,
        CatalogSortField::Updated => UPDATED_FIELD_NAME,
        CatalogSortField::Published => PUBLISHED_FIELD_NAME,
        CatalogSortField::ArticleNumber => ARTICLE_NUMBER_FIELD_NAME,
    }
}

impl CatalogRepository for PostgresRepository {
    async fn upsert(&self, entry: &CatalogEntry) -> Result<(), RepositoryError> {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT ({ARTICLE_NUMBER_FIELD_NAME}) DO UPDATE SET \
             {TITLE_FIELD_NAME} = EXCLUDED.{TITLE_FIELD_NAME}, \
             {STATUS_FIELD_NAME} = EXCLUDED.{STATUS_FIELD_NAME}, \
             {UPDATED_FIELD_NAME} = EXCLUDED.{UPDATED_FIELD_NAME}, \
             {PUBLISHED_FIELD_NAME} = EXCLUDED.{PUBLISHED_FIELD_NAME}, \
             {URL_PATH_FIELD_NAME} = EXCLUDED.{URL_PATH_FIELD_NAME}",
            self.database.table(CATALOG_TABLE),
            CATALOG_COLUMNS.join(", "),
        );
        sqlx::query(&sql)
            .bind(entry.article_number)
            .bind(&entry.title)
            .bind(entry.status.as_str())
            .bind(entry.updated)
            .bind(entry.published)
            .bind(entry.url_path.as_ref())
            .execute(self.database.database_pool())
            .await?;
        Ok(())
    }

    async fn find(&self, article_number: i32) -> Result<Option<CatalogEntry>, RepositoryError> {
        let table = self.catalog();
        let (sql, params) = QueryBuilder::from(table.clone())
            .select(table.columns(&CATALOG_COLUMNS))
            .where_condition(Condition::Equals {
                column: table.column(ARTICLE_NUMBER_FIELD_NAME),
                value: SqlParameter::Integer(article_number),
            })
            .build();
        let row = bind_all(&sql, params)
            .fetch_optional(self.database.database_pool())
            .await?;
        row.as_ref().map(row_to_catalog_entry).transpose()
    }

    async fn list(
        &self,
        query: &CatalogQuery,
    ) -> Result<(Vec<CatalogEntry>, u64), RepositoryError> {
        let table = self.catalog();
        let mut conditions = Vec::new();
        filter_conditions(&table, &query.filter, &mut conditions);

        let mut builder = QueryBuilder::from(table.clone()).select(table.columns(&CATALOG_COLUMNS));
        for condition in conditions {
            builder = builder.where_condition(condition);
        }
        for (field, direction) in &query.sort {
            let direction = match direction {
                CatalogOrder::Ascending => SortDirection::Ascending,
                CatalogOrder::Descending => SortDirection::Descending,
            };
            builder = builder.order_by(table.column(sort_column(*field)), direction);
        }
        // stable paging
        let builder = builder
            .order_by(table.column(ARTICLE_NUMBER_FIELD_NAME), SortDirection::Ascending)
            .limit(query.limit())
            .offset(query.offset());

        let (count_sql, count_params) = builder.build_count();
        let total: i64 = bind_all(&count_sql, count_params)
            .fetch_one(self.database.database_pool())
            .await
            .and_then(|row| sqlx::Row::try_get(&row, 0))?;

        let (sql, params) = builder.build();
        tracing::debug!(%sql, "catalog query");
        let rows = bind_all(&sql, params)
            .fetch_all(self.database.database_pool())
            .await?;
        let entries = rows
            .iter()
            .map(row_to_catalog_entry)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((entries, total.max(0) as u64))
    }
}

impl LockRepository for PostgresRepository {
    async fn find(&self, article_id: Uuid) -> Result<Option<EditLock>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {ARTICLE_ID_FIELD_NAME} = $1",
            LOCK_COLUMNS.join(", "),
            self.database.table(LOCKS_TABLE)
        );
        let row = sqlx::query(&sql)
            .bind(article_id)
            .fetch_optional(self.database.database_pool())
            .await?;
        row.as_ref().map(row_to_lock).transpose()
    }

    async fn insert_if_absent(&self, lock: &EditLock) -> Result<bool, RepositoryError> {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({ARTICLE_ID_FIELD_NAME}) DO NOTHING",
            self.database.table(LOCKS_TABLE),
            LOCK_COLUMNS.join(", "),
            placeholders(LOCK_COLUMNS.len())
        );
        let result = sqlx::query(&sql)
            .bind(lock.id)
            .bind(lock.article_id)
            .bind(&lock.session_id)
            .bind(&lock.user_identity)
            .bind(lock.acquired_at)
            .bind(&lock.editor_kind)
            .bind(lock.file_path.as_deref())
            .execute(self.database.database_pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn replace_if(&self, observed: &EditLock, lock: &EditLock) -> Result<bool, RepositoryError> {
        let sql = format!(
            "UPDATE {} SET {ID_FIELD_NAME} = $1, {SESSION_ID_FIELD_NAME} = $2, \
             {USER_IDENTITY_FIELD_NAME} = $3, {ACQUIRED_FIELD_NAME} = $4, \
             {EDITOR_KIND_FIELD_NAME} = $5, {FILE_PATH_FIELD_NAME} = $6 \
             WHERE {ARTICLE_ID_FIELD_NAME} = $7 AND {ID_FIELD_NAME} = $8 AND {ACQUIRED_FIELD_NAME} = $9",
            self.database.table(LOCKS_TABLE)
        );
        let result = sqlx::query(&sql)
            .bind(lock.id)
            .bind(&lock.session_id)
            .bind(&lock.user_identity)
            .bind(lock.acquired_at)
            .bind(&lock.editor_kind)
            .bind(lock.file_path.as_deref())
            .bind(observed.article_id)
            .bind(observed.id)
            .bind(observed.acquired_at)
            .execute(self.database.database_pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_owned(&self, article_id: Uuid, session_id: &str) -> Result<bool, RepositoryError> {
        let sql = format!(
            "DELETE FROM {} WHERE {ARTICLE_ID_FIELD_NAME} = $1 AND {SESSION_ID_FIELD_NAME} = $2",
            self.database.table(LOCKS_TABLE)
        );
        let result = sqlx::query(&sql)
            .bind(article_id)
            .bind(session_id)
            .execute(self.database.database_pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_if_unchanged(
        &self,
        article_id: Uuid,
        observed_acquired_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let sql = format!(
            "DELETE FROM {} WHERE {ARTICLE_ID_FIELD_NAME} = $1 AND {ACQUIRED_FIELD_NAME} = $2",
            self.database.table(LOCKS_TABLE)
        );
        let result = sqlx::query(&sql)
            .bind(article_id)
            .bind(observed_acquired_at)
            .execute(self.database.database_pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_acquired_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<EditLock>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {ACQUIRED_FIELD_NAME} < $1",
            LOCK_COLUMNS.join(", "),
            self.database.table(LOCKS_TABLE)
        );
        let rows = sqlx::query(&sql)
            .bind(cutoff)
            .fetch_all(self.database.database_pool())
            .await?;
        rows.iter().map(row_to_lock).collect()
    }
}

impl LayoutRepository for PostgresRepository {
    async fn default_layout(&self) -> Result<Option<ResolvedLayout>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {IS_DEFAULT_FIELD_NAME} = true \
             ORDER BY {LAYOUT_NAME_FIELD_NAME} LIMIT 1",
            LAYOUT_COLUMNS.join(", "),
            self.database.table(LAYOUTS_TABLE)
        );
        let row = sqlx::query(&sql)
            .fetch_optional(self.database.database_pool())
            .await?;
        row.as_ref().map(row_to_layout).transpose()
    }
}

impl LogRepository for PostgresRepository {
    async fn append_log(&self, entry: &ActivityEntry) -> Result<(), RepositoryError> {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.database.table(ARTICLE_LOGS_TABLE),
            ACTIVITY_COLUMNS.join(", "),
            placeholders(ACTIVITY_COLUMNS.len())
        );
        sqlx::query(&sql)
            .bind(entry.id)
            .bind(&entry.user_identity)
            .bind(entry.article_id)
            .bind(entry.article_title.as_deref())
            .bind(&entry.notes)
            .bind(entry.logged_at)
            .execute(self.database.database_pool())
            .await?;
        Ok(())
    }

    async fn list_for_article(&self, article_id: Uuid) -> Result<Vec<ActivityEntry>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {ARTICLE_ID_FIELD_NAME} = $1 ORDER BY {LOGGED_FIELD_NAME} DESC",
            ACTIVITY_COLUMNS.join(", "),
            self.database.table(ARTICLE_LOGS_TABLE)
        );
        let rows = sqlx::query(&sql)
            .bind(article_id)
            .fetch_all(self.database.database_pool())
            .await?;
        rows.iter().map(row_to_activity).collect()
    }
}
